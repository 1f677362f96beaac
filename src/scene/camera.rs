use glam::{Mat4, Vec3};

/// Camera data consumed by the compositor.
///
/// Only the clip planes and matrices matter here: the G-buffer pass draws
/// with `view`/`projection`, SSAO and SSR reconstruct view-space positions
/// from depth with the inverse projection, and the circle-of-confusion pass
/// linearizes depth with `near`/`far`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCamera {
    pub near: f32,
    pub far: f32,
    pub view: Mat4,
    pub projection: Mat4,
}

impl RenderCamera {
    /// Perspective camera at the origin looking down -Z. `fov` is vertical,
    /// in degrees.
    #[must_use]
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            near,
            far,
            view: Mat4::IDENTITY,
            // glam's `perspective_rh` targets the 0..1 depth range of WGPU.
            projection: Mat4::perspective_rh(fov.to_radians(), aspect, near, far),
        }
    }

    /// Places the camera at `eye`, looking at `target`.
    #[must_use]
    pub fn looking_at(mut self, eye: Vec3, target: Vec3, up: Vec3) -> Self {
        self.view = Mat4::look_at_rh(eye, target, up);
        self
    }

    #[inline]
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    #[inline]
    #[must_use]
    pub fn inverse_projection(&self) -> Mat4 {
        self.projection.inverse()
    }
}

impl Default for RenderCamera {
    fn default() -> Self {
        Self::perspective(45.0, 1.0, 0.1, 1000.0)
    }
}
