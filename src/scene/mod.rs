//! Scene-side data consumed by the compositor.
//!
//! - RenderCamera: clip planes and matrices of the active camera

pub mod camera;

pub use camera::RenderCamera;
