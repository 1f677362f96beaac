//! Post-Processing Renderer
//!
//! Provides:
//! - [`RenderBackend`]: the GPU capability surface consumed by everything here
//! - [`HeadlessBackend`]: recording backend for tests and inspection
//! - [`RenderGraph`]: generic render graph with name-based edges
//! - [`EffectCompositor`]: the viewer's post-processing pipeline
//! - [`PostEffectSettings`]: serde configuration of the post effects
//! - [`Accumulator`]: progressive refinement frame counter

pub mod accumulation;
pub mod backend;
pub mod compositor;
pub mod graph;
pub mod headless;
pub mod passes;
pub mod settings;

pub use accumulation::Accumulator;
pub use backend::{
    FramebufferHandle, PassCommand, RenderBackend, RenderTarget, SceneDraw, TextureDesc,
    TextureHandle, Viewport,
};
pub use compositor::{Effect, EffectCompositor, EnabledEffects};
pub use graph::{EffectDescription, RenderGraph};
pub use headless::HeadlessBackend;
pub use settings::{EffectValue, PostEffectSettings, Quality};
