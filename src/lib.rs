#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! # Clay
//!
//! Post-processing compositor of a glTF model viewer: a render graph of
//! fullscreen passes (depth of field, bloom, tone mapping, FXAA) plus the
//! G-buffer driven screen-space effects (SSAO, SSR, edge detection), wired
//! and reconfigured at runtime.
//!
//! The GPU is reached only through [`RenderBackend`]; [`HeadlessBackend`]
//! records the calls instead of executing them.
//!
//! ```rust,ignore
//! use clay::{EffectCompositor, HeadlessBackend, RenderCamera, RenderTarget, Viewport};
//!
//! let mut backend = HeadlessBackend::new(Viewport::new(1280, 720, 2.0));
//! let mut compositor = EffectCompositor::with_builtin_effects(&mut backend)?;
//! compositor.enable_bloom();
//! compositor.set_dof_parameter("quality", Some("high".into()));
//! compositor.composite(&mut backend, &RenderCamera::default(), RenderTarget::Screen, 0)?;
//! ```

pub mod errors;
pub mod renderer;
pub mod scene;

pub use errors::{ClayError, Result};
pub use renderer::{
    Accumulator, Effect, EffectCompositor, EffectDescription, EffectValue, EnabledEffects,
    HeadlessBackend, PostEffectSettings, Quality, RenderBackend, RenderGraph, RenderTarget,
    TextureHandle, Viewport,
};
pub use scene::RenderCamera;
