//! GPU Capability Surface
//!
//! The compositor never talks to a graphics API directly. Everything it needs
//! from the renderer collaborator is expressed by the [`RenderBackend`] trait:
//!
//! - texture allocation, resizing and release
//! - framebuffer assembly (color + optional depth attachment)
//! - fullscreen shader pass execution ([`PassCommand`])
//! - scene drawing with a G-buffer material override ([`SceneDraw`])
//! - the current viewport and device pixel ratio
//!
//! Handles are opaque `u64` values minted by the backend. The compositor owns
//! every handle it allocates and releases each of them exactly once.

use crate::renderer::graph::node::{ParameterBag, ShaderDefines};
use crate::scene::camera::RenderCamera;

// ============================================================================
// Handles
// ============================================================================

/// Opaque handle to a backend texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Wraps a backend-defined identifier.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque handle to a backend framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferHandle(u64);

impl FramebufferHandle {
    /// Wraps a backend-defined identifier.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Destination of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The default framebuffer (swap chain).
    Screen,
    /// A caller-supplied framebuffer.
    Framebuffer(FramebufferHandle),
    /// A single color texture.
    Texture(TextureHandle),
}

// ============================================================================
// Viewport
// ============================================================================

/// Logical viewport size plus device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Size in physical pixels (`logical × dpr`).
    #[inline]
    #[must_use]
    pub fn physical_size(&self) -> (u32, u32) {
        physical_extent(self.width, self.height, self.device_pixel_ratio)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1, 1, 1.0)
    }
}

/// Converts a logical size to physical pixels, never returning a zero extent.
#[must_use]
pub fn physical_extent(width: u32, height: u32, device_pixel_ratio: f32) -> (u32, u32) {
    let dpr = if device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let scale = |v: u32| ((v as f32 * dpr).round() as u32).max(1);
    (scale(width), scale(height))
}

// ============================================================================
// Descriptors & Commands
// ============================================================================

/// Descriptor for a 2D texture allocated by the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
}

impl TextureDesc {
    /// A texture that is both rendered to and sampled afterwards.
    #[must_use]
    pub fn render_target(
        label: impl Into<String>,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        }
    }
}

/// One fullscreen shader pass.
///
/// `inputs` are the resolved texture bindings in slot order. The backend is
/// expected to compile (and cache) the program identified by `shader` and
/// `defines`, bind `inputs` and `parameters`, and draw into `target`.
#[derive(Debug, Clone, Copy)]
pub struct PassCommand<'a> {
    pub node: &'a str,
    pub shader: &'a str,
    pub defines: &'a ShaderDefines,
    pub inputs: &'a [(&'a str, TextureHandle)],
    pub parameters: &'a ParameterBag,
    pub target: RenderTarget,
    pub width: u32,
    pub height: u32,
}

impl PassCommand<'_> {
    /// Looks up the texture bound to `slot`.
    #[must_use]
    pub fn input(&self, slot: &str) -> Option<TextureHandle> {
        self.inputs
            .iter()
            .find_map(|(name, texture)| (*name == slot).then_some(*texture))
    }
}

/// A scene draw with the G-buffer material override.
///
/// `color_targets` are written in order (normal, depth-as-color, optional
/// third channel); `depth_attachment` is the depth buffer used for testing.
#[derive(Debug, Clone, Copy)]
pub struct SceneDraw<'a> {
    pub label: &'static str,
    pub camera: &'a RenderCamera,
    pub color_targets: &'a [TextureHandle],
    pub depth_attachment: TextureHandle,
    pub width: u32,
    pub height: u32,
}

// ============================================================================
// RenderBackend
// ============================================================================

/// The renderer capability surface consumed by the compositor.
pub trait RenderBackend {
    /// Current viewport of the output surface.
    fn viewport(&self) -> Viewport;

    fn create_texture(&mut self, desc: &TextureDesc) -> TextureHandle;

    /// Reallocates the storage of `texture` at a new size, keeping its handle.
    fn resize_texture(&mut self, texture: TextureHandle, width: u32, height: u32);

    fn release_texture(&mut self, texture: TextureHandle);

    fn create_framebuffer(
        &mut self,
        color: TextureHandle,
        depth: Option<TextureHandle>,
    ) -> FramebufferHandle;

    fn release_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Executes a fullscreen shader pass.
    fn execute_pass(&mut self, pass: &PassCommand<'_>);

    /// Draws the current scene with the G-buffer material.
    fn draw_scene(&mut self, draw: &SceneDraw<'_>);

    /// Releases the cached program(s) compiled for `shader`.
    fn release_program(&mut self, _shader: &str) {}
}
