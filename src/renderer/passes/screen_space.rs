//! Fullscreen Pass With Owned Output
//!
//! Shared building block of the auxiliary passes (SSAO, SSR, edge). A
//! `ScreenSpacePass` owns one output texture, a parameter bag and a set of
//! shader defines, and renders one fullscreen shader into its output.
//!
//! The output texture is allocated on first use at the pass's current size
//! and resized in place afterwards; [`dispose`](ScreenSpacePass::dispose)
//! releases it and can be called any number of times.

use crate::renderer::backend::{PassCommand, RenderBackend, RenderTarget, TextureDesc, TextureHandle};
use crate::renderer::graph::node::{ParamValue, ParameterBag, ShaderDefines};

#[derive(Debug)]
pub struct ScreenSpacePass {
    label: &'static str,
    shader: &'static str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    target: Option<TextureHandle>,
    parameters: ParameterBag,
    defines: ShaderDefines,
    /// Whether the backend has compiled the program at least once.
    program_used: bool,
}

impl ScreenSpacePass {
    #[must_use]
    pub fn new(
        label: &'static str,
        shader: &'static str,
        format: wgpu::TextureFormat,
        (width, height): (u32, u32),
    ) -> Self {
        Self {
            label,
            shader,
            format,
            width,
            height,
            target: None,
            parameters: ParameterBag::default(),
            defines: ShaderDefines::default(),
            program_used: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn set_parameter(&mut self, key: &str, value: impl Into<ParamValue>) {
        self.parameters.insert(key.to_owned(), value.into());
    }

    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &ParameterBag {
        &self.parameters
    }

    pub fn set_define(&mut self, key: &str, value: impl Into<String>) {
        self.defines.set(key, value);
    }

    #[inline]
    #[must_use]
    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    /// The output texture, once allocated.
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<TextureHandle> {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sets the output size, resizing the texture if it is allocated.
    pub fn resize<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, width: u32, height: u32) {
        if (self.width, self.height) == (width, height) {
            return;
        }
        self.width = width;
        self.height = height;
        if let Some(texture) = self.target {
            backend.resize_texture(texture, width, height);
        }
    }

    fn ensure_target<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> TextureHandle {
        if let Some(texture) = self.target {
            return texture;
        }
        let desc = TextureDesc::render_target(self.label, self.width, self.height, self.format);
        let texture = backend.create_texture(&desc);
        self.target = Some(texture);
        texture
    }

    /// Renders the pass and returns its output texture.
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        inputs: &[(&str, TextureHandle)],
    ) -> TextureHandle {
        let texture = self.ensure_target(backend);
        self.program_used = true;
        log::trace!("Screen-space pass `{}` ({})", self.label, self.shader);
        backend.execute_pass(&PassCommand {
            node: self.label,
            shader: self.shader,
            defines: &self.defines,
            inputs,
            parameters: &self.parameters,
            target: RenderTarget::Texture(texture),
            width: self.width,
            height: self.height,
        });
        texture
    }

    /// Releases the output texture and the compiled program.
    pub fn dispose<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(texture) = self.target.take() {
            backend.release_texture(texture);
        }
        if std::mem::take(&mut self.program_used) {
            backend.release_program(self.shader);
        }
    }
}
