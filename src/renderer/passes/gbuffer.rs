//! G-Buffer Pass
//!
//! Renders the scene once with the G-buffer material override into:
//!
//! | Target      | Format        | Content                          |
//! |-------------|---------------|----------------------------------|
//! | `texture1`  | `Rgba16Float` | view-space normal + roughness    |
//! | `texture2`  | `Depth24Plus` | scene depth (depth attachment)   |
//! | `texture3`  | `Rgba8Unorm`  | albedo + metalness (optional)    |
//!
//! SSAO, SSR and edge detection all read these targets. The pass remembers
//! the frame number and view it last rendered so that several consumers
//! within one frame share a single scene draw. Frame numbers restart at 0
//! whenever accumulation restarts, so a changed view always redraws, and
//! [`GBuffer::invalidate`] forces the next update to redraw.

use glam::Mat4;

use crate::renderer::backend::{RenderBackend, SceneDraw, TextureDesc, TextureHandle};
use crate::scene::camera::RenderCamera;

pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;
pub const TEXTURE3_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

#[derive(Debug)]
pub struct GBuffer {
    normal: Option<TextureHandle>,
    depth: Option<TextureHandle>,
    texture3: Option<TextureHandle>,
    width: u32,
    height: u32,
    last_frame: Option<u64>,
    /// Frame and view of the current content; `None` once stale.
    drawn: Option<(u64, Mat4)>,
    draw_count: u64,
}

impl GBuffer {
    /// Allocates the targets at `width × height` physical pixels.
    pub fn new<B: RenderBackend + ?Sized>(
        backend: &mut B,
        width: u32,
        height: u32,
        enable_texture3: bool,
    ) -> Self {
        let mut create = |label: &str, format| {
            backend.create_texture(&TextureDesc::render_target(label, width, height, format))
        };
        let normal = create("gbuffer_normal", NORMAL_FORMAT);
        let depth = create("gbuffer_depth", DEPTH_FORMAT);
        let texture3 = enable_texture3.then(|| create("gbuffer_texture3", TEXTURE3_FORMAT));

        Self {
            normal: Some(normal),
            depth: Some(depth),
            texture3,
            width,
            height,
            last_frame: None,
            drawn: None,
            draw_count: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn normal_texture(&self) -> Option<TextureHandle> {
        self.normal
    }

    #[inline]
    #[must_use]
    pub fn depth_texture(&self) -> Option<TextureHandle> {
        self.depth
    }

    #[inline]
    #[must_use]
    pub fn texture3(&self) -> Option<TextureHandle> {
        self.texture3
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Frame number of the last scene draw.
    #[inline]
    #[must_use]
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    /// Number of scene draws issued since construction.
    #[inline]
    #[must_use]
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// `true` while the content matches `frame` seen through `camera`.
    #[must_use]
    pub fn is_current(&self, camera: &RenderCamera, frame: u64) -> bool {
        self.drawn == Some((frame, camera.view_projection()))
    }

    /// Marks the content stale; the next [`update`](Self::update) redraws.
    #[inline]
    pub fn invalidate(&mut self) {
        self.drawn = None;
    }

    /// Draws the scene for `frame` unless the same frame was already drawn
    /// from the same view since the last invalidation.
    ///
    /// Returns whether a draw was issued.
    pub fn update<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        camera: &RenderCamera,
        frame: u64,
    ) -> bool {
        if self.is_current(camera, frame) {
            return false;
        }
        let (Some(normal), Some(depth)) = (self.normal, self.depth) else {
            log::warn!("G-buffer used after dispose");
            return false;
        };

        let mut color_targets = vec![normal];
        color_targets.extend(self.texture3);
        backend.draw_scene(&SceneDraw {
            label: "gbuffer",
            camera,
            color_targets: &color_targets,
            depth_attachment: depth,
            width: self.width,
            height: self.height,
        });
        self.last_frame = Some(frame);
        self.drawn = Some((frame, camera.view_projection()));
        self.draw_count += 1;
        true
    }

    pub fn resize<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, width: u32, height: u32) {
        if (self.width, self.height) == (width, height) {
            return;
        }
        self.width = width;
        self.height = height;
        for texture in [self.normal, self.depth, self.texture3].into_iter().flatten() {
            backend.resize_texture(texture, width, height);
        }
        // Content is stale at the new size.
        self.invalidate();
    }

    pub fn dispose<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        for texture in [self.normal.take(), self.depth.take(), self.texture3.take()]
            .into_iter()
            .flatten()
        {
            backend.release_texture(texture);
        }
        self.last_frame = None;
        self.invalidate();
    }
}
