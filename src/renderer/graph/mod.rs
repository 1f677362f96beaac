//! Render Graph
//!
//! Provides:
//! - [`PassNode`]: texture or filter node with named input slots
//! - [`RenderGraph`]: mutable DAG with lazy, deterministic scheduling
//! - [`Resolution`]: outcome of resolving a name-based edge
//! - [`EffectDescription`]: JSON description of an effect graph
//! - [`TerminalChain`]: the fixed `composite → FXAA` chain with splicing

pub mod chain;
pub mod description;
pub mod graph;
pub mod node;
pub mod resolve;

pub use chain::{CHAIN_INPUT_SLOT, TerminalChain};
pub use description::{EffectDescription, NodeDescription};
pub use graph::{NodeKey, RenderGraph};
pub use node::{
    InputBinding, NodeKind, OutputSpec, ParamValue, ParameterBag, PassNode, PixelFormat,
    ShaderDefines, SizeSpec,
};
pub use resolve::Resolution;
