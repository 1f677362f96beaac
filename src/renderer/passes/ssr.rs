//! Screen Space Reflection (SSR) Pass
//!
//! Ray-marches the G-buffer depth in screen space and blends the hit color
//! from the running source texture. The march is bounded by
//! `MAX_ITERATION` steps of `pixelStride` pixels; surfaces rougher than
//! `1 - minGlossiness` are skipped.

use glam::Vec2;

use super::gbuffer::GBuffer;
use super::screen_space::ScreenSpacePass;
use crate::renderer::backend::{RenderBackend, TextureHandle};
use crate::renderer::settings::Quality;
use crate::scene::camera::RenderCamera;

const SSR_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[derive(Debug)]
pub struct SsrPass {
    pass: ScreenSpacePass,
    max_iteration: u32,
    pixel_stride: u32,
    min_glossiness: f32,
}

impl SsrPass {
    #[must_use]
    pub fn new(size: (u32, u32)) -> Self {
        let mut ssr = Self {
            pass: ScreenSpacePass::new("ssr", "ssr", SSR_TEXTURE_FORMAT, size),
            max_iteration: 0,
            pixel_stride: 0,
            min_glossiness: 0.0,
        };
        ssr.set_quality(Quality::default());
        ssr.set_max_roughness(0.8);
        ssr
    }

    /// Applies a tier's iteration count and pixel stride.
    pub fn set_quality(&mut self, quality: Quality) {
        self.set_max_iteration(quality.ssr_max_iteration());
        self.set_pixel_stride(quality.ssr_pixel_stride());
    }

    pub fn set_max_iteration(&mut self, max_iteration: u32) {
        self.max_iteration = max_iteration;
        self.pass.set_define("MAX_ITERATION", max_iteration.to_string());
        self.pass.set_parameter("maxIteration", max_iteration as i32);
    }

    pub fn set_pixel_stride(&mut self, pixel_stride: u32) {
        self.pixel_stride = pixel_stride;
        self.pass.set_parameter("pixelStride", pixel_stride as i32);
    }

    /// `minGlossiness = clamp(1 - maxRoughness, 0, 1)`.
    pub fn set_max_roughness(&mut self, max_roughness: f32) {
        self.min_glossiness = (1.0 - max_roughness).clamp(0.0, 1.0);
        self.pass.set_parameter("minGlossiness", self.min_glossiness);
    }

    #[inline]
    #[must_use]
    pub fn max_iteration(&self) -> u32 {
        self.max_iteration
    }

    #[inline]
    #[must_use]
    pub fn pixel_stride(&self) -> u32 {
        self.pixel_stride
    }

    #[inline]
    #[must_use]
    pub fn min_glossiness(&self) -> f32 {
        self.min_glossiness
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> Option<TextureHandle> {
        self.pass.target()
    }

    /// Renders reflections over `source`; returns the reflected color.
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
        self.pass.set_parameter("projection", camera.projection);
        self.pass.set_parameter("projectionInv", camera.inverse_projection());
        self.pass.set_parameter("viewportSize", Vec2::new(width as f32, height as f32));
        self.pass.set_parameter("zNear", camera.near);
        self.pass.set_parameter("zFar", camera.far);
        Some(self.pass.render(
            backend,
            &[
                ("colorTex", source),
                ("gBufferTexture1", normal),
                ("gBufferTexture2", depth),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roughness_maps_to_clamped_glossiness() {
        let mut ssr = SsrPass::new((8, 8));
        ssr.set_max_roughness(0.25);
        assert!((ssr.min_glossiness() - 0.75).abs() < 1e-6);
        ssr.set_max_roughness(1.5);
        assert_eq!(ssr.min_glossiness(), 0.0);
        ssr.set_max_roughness(-0.5);
        assert_eq!(ssr.min_glossiness(), 1.0);
    }

    #[test]
    fn quality_sets_iteration_and_stride() {
        let mut ssr = SsrPass::new((8, 8));
        ssr.set_quality(Quality::Ultra);
        assert_eq!((ssr.max_iteration(), ssr.pixel_stride()), (80, 4));
        ssr.set_quality(Quality::Low);
        assert_eq!((ssr.max_iteration(), ssr.pixel_stride()), (10, 32));
    }
}
