//! Compositor-Owned Passes
//!
//! Passes that run outside the render graph, driven procedurally by the
//! compositor each frame:
//!
//! - [`GBuffer`]: normal/depth targets shared by the screen-space passes
//! - [`SsaoPass`], [`SsrPass`], [`EdgePass`]: screen-space effects
//! - [`DofKernel`]: per-frame Poisson window for the DOF blur nodes

pub mod dof;
pub mod edge;
pub mod gbuffer;
pub mod poisson;
pub mod screen_space;
pub mod ssao;
pub mod ssr;

pub use dof::{DOF_BLUR_NODES, DofKernel};
pub use edge::EdgePass;
pub use gbuffer::GBuffer;
pub use poisson::{poisson_kernel, poisson_points};
pub use screen_space::ScreenSpacePass;
pub use ssao::{SsaoPass, generate_ssao_kernel};
pub use ssr::SsrPass;
