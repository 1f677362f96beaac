//! Screen Space Ambient Occlusion (SSAO) Pass
//!
//! Two sub-passes over the G-buffer:
//!
//! 1. **Raw SSAO**: hemisphere occlusion sampling using the depth + normal
//!    targets and a sample kernel of `kernelSize` points.
//! 2. **Blur**: a depth-aware filter that smooths the raw estimate.
//!
//! ```text
//!  GBuffer normal ──┬──► ssao_raw ──► ssao_blur ──► R8Unorm AO texture
//!  GBuffer depth  ──┘                    ▲
//!                  └─────────────────────┘
//! ```
//!
//! The kernel is regenerated (fixed seed, so identical across sessions) only
//! when the kernel size changes. `bias` follows `radius / 50`.

use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use super::gbuffer::GBuffer;
use super::screen_space::ScreenSpacePass;
use crate::renderer::backend::{RenderBackend, TextureHandle};
use crate::renderer::settings::Quality;
use crate::scene::camera::RenderCamera;

/// The SSAO output texture format: single-channel unsigned normalized.
const SSAO_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// Kernel seed, shared by every kernel size.
const KERNEL_SEED: u64 = 42;

#[derive(Debug)]
pub struct SsaoPass {
    raw: ScreenSpacePass,
    blur: ScreenSpacePass,
    kernel: Vec<Vec4>,
    kernel_size: u32,
    radius: f32,
    intensity: f32,
}

impl SsaoPass {
    pub const DEFAULT_RADIUS: f32 = 1.5;

    #[must_use]
    pub fn new(size: (u32, u32)) -> Self {
        let mut pass = Self {
            raw: ScreenSpacePass::new("ssao_raw", "ssao", SSAO_TEXTURE_FORMAT, size),
            blur: ScreenSpacePass::new("ssao_blur", "ssao_blur", SSAO_TEXTURE_FORMAT, size),
            kernel: Vec::new(),
            kernel_size: 0,
            radius: 0.0,
            intensity: 0.0,
        };
        pass.set_kernel_size(Quality::default().ssao_kernel_size());
        pass.set_radius(Self::DEFAULT_RADIUS);
        pass.set_intensity(1.0);
        pass
    }

    /// Sets the number of hemisphere samples, regenerating the kernel when
    /// the count changes.
    pub fn set_kernel_size(&mut self, size: u32) {
        let size = size.max(1);
        if size == self.kernel_size {
            return;
        }
        self.kernel_size = size;
        self.kernel = generate_ssao_kernel(size);
        self.raw.set_define("KERNEL_SIZE", size.to_string());
        self.raw.set_parameter("kernelSize", size as i32);
        self.raw.set_parameter(
            "kernel",
            bytemuck::cast_slice::<Vec4, f32>(&self.kernel).to_vec(),
        );
    }

    /// Sets the sampling radius in view-space units; the depth bias follows.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
        let bias = self.bias();
        self.raw.set_parameter("radius", radius);
        self.raw.set_parameter("bias", bias);
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
        self.raw.set_parameter("intensity", intensity);
    }

    #[inline]
    #[must_use]
    pub fn kernel_size(&self) -> u32 {
        self.kernel_size
    }

    #[inline]
    #[must_use]
    pub fn kernel(&self) -> &[Vec4] {
        &self.kernel
    }

    #[inline]
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    #[must_use]
    pub fn bias(&self) -> f32 {
        self.radius / 50.0
    }

    #[inline]
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Parameters of the raw sub-pass, as sent to the shader.
    #[must_use]
    pub fn raw_pass(&self) -> &ScreenSpacePass {
        &self.raw
    }

    /// The blurred AO texture, once rendered.
    #[inline]
    #[must_use]
    pub fn texture(&self) -> Option<TextureHandle> {
        self.blur.target()
    }

    /// Renders both sub-passes from the G-buffer targets.
    pub fn update<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        camera: &RenderCamera,
        gbuffer: &GBuffer,
        frame: u64,
    ) -> Option<TextureHandle> {
        let (Some(normal), Some(depth)) = (gbuffer.normal_texture(), gbuffer.depth_texture())
        else {
            return None;
        };
        let (width, height) = self.raw.size();

        self.raw.set_parameter("projection", camera.projection);
        self.raw.set_parameter("projectionInv", camera.inverse_projection());
        self.raw.set_parameter("viewportSize", glam::Vec2::new(width as f32, height as f32));
        self.raw.set_parameter("frame", frame as f32);
        let raw = self
            .raw
            .render(backend, &[("gBufferTexture1", normal), ("gBufferTexture2", depth)]);

        self.blur.set_parameter("textureSize", glam::Vec2::new(width as f32, height as f32));
        Some(
            self.blur
                .render(backend, &[("ssaoTexture", raw), ("gBufferTexture2", depth)]),
        )
    }

    pub fn resize<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, width: u32, height: u32) {
        self.raw.resize(backend, width, height);
        self.blur.resize(backend, width, height);
    }

    pub fn dispose<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        self.raw.dispose(backend);
        self.blur.dispose(backend);
    }
}

/// Generates a hemisphere sample kernel with importance-weighted distribution.
///
/// Uses a fixed seed for deterministic results across frames and sessions.
/// Samples are concentrated near the origin via a quadratic fall-off curve.
#[must_use]
pub fn generate_ssao_kernel(samples: u32) -> Vec<Vec4> {
    let mut rng = StdRng::seed_from_u64(KERNEL_SEED);
    (0..samples)
        .map(|i| {
            // Upper hemisphere (Z > 0)
            let direction = Vec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(0.01..1.0),
            )
            .normalize();
            let magnitude: f32 = rng.random_range(0.0..1.0);

            let t = i as f32 / samples as f32;
            let sample = direction * magnitude * lerp(0.1, 1.0, t * t);
            sample.extend(0.0)
        })
        .collect()
}

fn lerp(a: f32, b: f32, f: f32) -> f32 {
    a + f * (b - a)
}
