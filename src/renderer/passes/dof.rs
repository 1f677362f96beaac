//! Depth of Field Temporal Kernel
//!
//! The DOF blur nodes sample `S` Poisson offsets per pixel. Instead of one
//! fixed kernel, each frame takes the next window of `S` points from the
//! precomputed sequence, so progressive accumulation converges to a much
//! larger effective kernel:
//!
//! ```text
//! sequence:  [ w0 | w1 | w2 | ... | w(n-1) ]     n = frameWindowCount
//! frame f  → window f mod n
//! ```
//!
//! `frameWindowCount = floor(len / 2 / S)`, so the kernel for frame `f` equals
//! the kernel for frame `f + frameWindowCount`.

use super::poisson::poisson_kernel;
use crate::renderer::settings::Quality;

/// Blur nodes that receive the kernel.
pub const DOF_BLUR_NODES: [&str; 3] = ["dof_far_blur", "dof_near_blur", "dof_coc_blur"];

/// Frame count over which the blur fades in (`percent = frame / 30`).
pub const DOF_FADE_FRAMES: f32 = 30.0;

#[derive(Debug, Clone)]
pub struct DofKernel {
    sequence: &'static [f32],
    quality: Quality,
    kernel_size: usize,
    kernel: Vec<f32>,
    window_index: usize,
    percent: f32,
}

impl Default for DofKernel {
    fn default() -> Self {
        Self::new(Quality::default())
    }
}

impl DofKernel {
    #[must_use]
    pub fn new(quality: Quality) -> Self {
        Self::with_sequence(poisson_kernel(), quality)
    }

    /// Uses `sequence` (interleaved `x, y` pairs) instead of the builtin one.
    #[must_use]
    pub fn with_sequence(sequence: &'static [f32], quality: Quality) -> Self {
        let mut kernel = Self {
            sequence,
            quality,
            kernel_size: 0,
            kernel: Vec::new(),
            window_index: 0,
            percent: 0.0,
        };
        kernel.set_quality(quality);
        kernel
    }

    /// Sets the sample count from a tier and reallocates the kernel buffer to
    /// `2 × S` floats.
    pub fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
        self.kernel_size = quality.dof_kernel_size();
        self.kernel = vec![0.0; self.kernel_size * 2];
        self.window_index = 0;
    }

    #[inline]
    #[must_use]
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Sample count `S`.
    #[inline]
    #[must_use]
    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    #[must_use]
    pub fn frame_window_count(&self) -> usize {
        self.sequence.len() / 2 / self.kernel_size
    }

    /// The sequence window selected for `frame`. Empty when the sequence is
    /// shorter than one window.
    #[must_use]
    pub fn window(&self, frame: u64) -> &'static [f32] {
        let count = self.frame_window_count();
        if count == 0 {
            return &[];
        }
        let len = self.kernel_size * 2;
        let start = (frame % count as u64) as usize * len;
        &self.sequence[start..start + len]
    }

    /// Selects the window for `frame` into the kernel buffer and updates the
    /// fade-in percentage.
    pub fn update(&mut self, frame: u64) -> &[f32] {
        let count = self.frame_window_count();
        if count > 0 {
            self.window_index = (frame % count as u64) as usize;
            let window = self.window(frame);
            self.kernel.copy_from_slice(window);
        }
        self.percent = frame as f32 / DOF_FADE_FRAMES;
        &self.kernel
    }

    /// The active kernel buffer (`2 × S` floats).
    #[inline]
    #[must_use]
    pub fn kernel(&self) -> &[f32] {
        &self.kernel
    }

    #[inline]
    #[must_use]
    pub fn window_index(&self) -> usize {
        self.window_index
    }

    #[inline]
    #[must_use]
    pub fn percent(&self) -> f32 {
        self.percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_count_per_tier() {
        let mut kernel = DofKernel::default();
        assert_eq!(kernel.kernel_size(), 8);
        assert_eq!(kernel.frame_window_count(), 128);
        kernel.set_quality(Quality::Ultra);
        assert_eq!(kernel.kernel().len(), 64);
        assert_eq!(kernel.frame_window_count(), 32);
    }

    #[test]
    fn windows_repeat_after_window_count() {
        let mut kernel = DofKernel::new(Quality::High);
        let count = kernel.frame_window_count() as u64;
        for frame in 0..count {
            let first = kernel.update(frame).to_vec();
            let again = kernel.update(frame + count).to_vec();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn short_sequence_leaves_kernel_zeroed() {
        static SHORT: [f32; 4] = [0.1, 0.2, 0.3, 0.4];
        let mut kernel = DofKernel::with_sequence(&SHORT, Quality::Low);
        assert_eq!(kernel.frame_window_count(), 0);
        assert!(kernel.update(3).iter().all(|v| *v == 0.0));
        assert!((kernel.percent() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn update_selects_window_slice() {
        static SEQ: [f32; 24] = [
            0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0,
            15.0, 16.0, 17.0, 18.0, 19.0, 20.0, 21.0, 22.0, 23.0,
        ];
        let mut kernel = DofKernel::with_sequence(&SEQ, Quality::Low);
        // 12 points / 4 per window
        assert_eq!(kernel.frame_window_count(), 3);
        assert_eq!(kernel.update(1), &SEQ[8..16]);
        assert_eq!(kernel.window_index(), 1);
        assert_eq!(kernel.update(5), &SEQ[16..24]);
    }
}
