//! Edge Detection Pass
//!
//! Outlines geometry by detecting normal and depth discontinuities in the
//! G-buffer and drawing `edgeColor` over the source color.

use glam::{Vec2, Vec3};

use super::gbuffer::GBuffer;
use super::screen_space::ScreenSpacePass;
use crate::renderer::backend::{RenderBackend, TextureHandle};
use crate::scene::camera::RenderCamera;

const EDGE_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[derive(Debug)]
pub struct EdgePass {
    pass: ScreenSpacePass,
    edge_color: Vec3,
}

impl EdgePass {
    #[must_use]
    pub fn new(size: (u32, u32)) -> Self {
        let mut edge = Self {
            pass: ScreenSpacePass::new("edge", "edge", EDGE_TEXTURE_FORMAT, size),
            edge_color: Vec3::ZERO,
        };
        edge.set_edge_color(Vec3::ZERO);
        edge
    }

    pub fn set_edge_color(&mut self, color: Vec3) {
        self.edge_color = color;
        self.pass.set_parameter("edgeColor", color);
    }

    #[inline]
    #[must_use]
    pub fn edge_color(&self) -> Vec3 {
        self.edge_color
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> Option<TextureHandle> {
        self.pass.target()
    }

    pub fn update<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        camera: &RenderCamera,
        gbuffer: &GBuffer,
        source: TextureHandle,
        _frame: u64,
    ) -> Option<TextureHandle> {
        let (Some(normal), Some(depth)) = (gbuffer.normal_texture(), gbuffer.depth_texture())
        else {
            return None;
        };
        let (width, height) = self.pass.size();
        self.pass.set_parameter("projectionInv", camera.inverse_projection());
        self.pass.set_parameter("textureSize", Vec2::new(width as f32, height as f32));
        Some(self.pass.render(
            backend,
            &[
                ("texture", source),
                ("normalTexture", normal),
                ("depthTexture", depth),
            ],
        ))
    }

    pub fn resize<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, width: u32, height: u32) {
        self.pass.resize(backend, width, height);
    }

    pub fn dispose<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        self.pass.dispose(backend);
    }
}
