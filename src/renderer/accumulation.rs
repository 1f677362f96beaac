//! Progressive Accumulation
//!
//! Temporal effects (the DOF kernel rotation, SSAO) refine the image over
//! several frames after the scene stops changing. The accumulator hands out
//! the frame numbers `0..max_frames` that drive them, and restarts whenever
//! the scene is refreshed.
//!
//! ```rust,ignore
//! accumulator.restart();               // camera moved
//! while let Some(frame) = accumulator.next_frame() {
//!     compositor.composite(&mut backend, &camera, target, frame)?;
//! }
//! ```

/// Default number of accumulated frames. Matches the DOF fade-in length.
pub const DEFAULT_ACCUMULATION_FRAMES: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accumulator {
    frame: u64,
    max_frames: u64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new(DEFAULT_ACCUMULATION_FRAMES)
    }
}

impl Accumulator {
    #[must_use]
    pub const fn new(max_frames: u64) -> Self {
        Self {
            frame: 0,
            max_frames,
        }
    }

    /// Starts over from frame 0.
    pub fn restart(&mut self) {
        self.frame = 0;
    }

    /// Frames handed out since the last restart.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    #[must_use]
    pub fn max_frames(&self) -> u64 {
        self.max_frames
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.frame >= self.max_frames
    }

    /// The next frame number, or `None` once accumulation has finished.
    pub fn next_frame(&mut self) -> Option<u64> {
        if self.is_finished() {
            return None;
        }
        let frame = self.frame;
        self.frame += 1;
        Some(frame)
    }
}
