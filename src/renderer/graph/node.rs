//! Render Graph Nodes
//!
//! A [`PassNode`] is one named unit of GPU work. There are two kinds:
//!
//! - **Texture nodes** wrap an externally supplied texture (the rendered scene
//!   color, for example). They are never executed; consumers simply read the
//!   wrapped texture.
//! - **Filter nodes** reference a shader program and render into either an
//!   offscreen target owned by the graph or, when `outputs` is `None`, into the
//!   caller-supplied target (the terminal node).
//!
//! Edges are expressed by name: an input slot bound to
//! [`InputBinding::Node`] is resolved against the graph at schedule time, which
//! is what allows effects to be rewired at runtime.

use std::collections::BTreeMap;

use glam::{Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::renderer::backend::{TextureHandle, Viewport};

// ============================================================================
// Parameters
// ============================================================================

/// A single shader parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    FloatArray(Vec<f32>),
    Texture(TextureHandle),
}

impl ParamValue {
    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float_array(&self) -> Option<&[f32]> {
        match self {
            Self::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_texture(&self) -> Option<TextureHandle> {
        match self {
            Self::Texture(t) => Some(*t),
            _ => None,
        }
    }
}

macro_rules! impl_param_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_param_from!(
    f32 => Float,
    i32 => Int,
    bool => Bool,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat4 => Mat4,
    Vec<f32> => FloatArray,
    TextureHandle => Texture,
);

impl From<&[f32]> for ParamValue {
    fn from(value: &[f32]) -> Self {
        Self::FloatArray(value.to_vec())
    }
}

/// Name → value map consumed by the shader at execution time.
pub type ParameterBag = FxHashMap<String, ParamValue>;

// ============================================================================
// Shader Defines
// ============================================================================

/// Compile-time shader defines of a node.
///
/// Stored sorted so that `(shader, defines)` forms a stable program key.
/// Flag-style defines carry an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderDefines {
    entries: BTreeMap<String, String>,
}

impl ShaderDefines {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// One output dimension: fixed pixels or a fraction of the viewport.
///
/// Deserializes from either a bare number (`512`) or `{ "scale": 0.5 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeSpec {
    Fixed(u32),
    Viewport { scale: f32 },
}

impl SizeSpec {
    /// Full viewport size.
    pub const VIEWPORT: Self = Self::Viewport { scale: 1.0 };

    /// Resolves against a physical viewport extent; never returns zero.
    #[must_use]
    pub fn resolve(self, extent: u32) -> u32 {
        match self {
            Self::Fixed(px) => px.max(1),
            Self::Viewport { scale } => ((extent as f32 * scale).round() as u32).max(1),
        }
    }
}

/// Pixel format of a node output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    #[default]
    Rgba8Unorm,
    Rgba16Float,
    R8Unorm,
    R16Float,
}

impl PixelFormat {
    #[must_use]
    pub const fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            Self::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            Self::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
            Self::R8Unorm => wgpu::TextureFormat::R8Unorm,
            Self::R16Float => wgpu::TextureFormat::R16Float,
        }
    }
}

/// Output texture specification of a non-terminal filter node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub width: SizeSpec,
    pub height: SizeSpec,
    #[serde(default)]
    pub format: PixelFormat,
}

impl OutputSpec {
    /// Viewport-sized output.
    #[must_use]
    pub const fn viewport(format: PixelFormat) -> Self {
        Self {
            width: SizeSpec::VIEWPORT,
            height: SizeSpec::VIEWPORT,
            format,
        }
    }

    /// Output scaled relative to the viewport.
    #[must_use]
    pub const fn scaled(scale: f32, format: PixelFormat) -> Self {
        Self {
            width: SizeSpec::Viewport { scale },
            height: SizeSpec::Viewport { scale },
            format,
        }
    }

    /// Resolves to physical pixels.
    #[must_use]
    pub fn resolve(&self, viewport: Viewport) -> (u32, u32) {
        let (w, h) = viewport.physical_size();
        (self.width.resolve(w), self.height.resolve(h))
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// What an input slot is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputBinding {
    /// Another node's output, resolved by name.
    Node(String),
    /// An external texture supplied directly.
    Texture(TextureHandle),
}

impl From<&str> for InputBinding {
    fn from(name: &str) -> Self {
        Self::Node(name.to_owned())
    }
}

impl From<String> for InputBinding {
    fn from(name: String) -> Self {
        Self::Node(name)
    }
}

impl From<TextureHandle> for InputBinding {
    fn from(texture: TextureHandle) -> Self {
        Self::Texture(texture)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct InputSlot {
    name: String,
    binding: Option<InputBinding>,
}

// ============================================================================
// PassNode
// ============================================================================

/// Node kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Wraps an external texture; never executed.
    Texture(Option<TextureHandle>),
    /// Runs the referenced shader program.
    Filter { shader: String },
}

/// A named unit of GPU work.
#[derive(Debug, Clone, PartialEq)]
pub struct PassNode {
    name: String,
    kind: NodeKind,
    inputs: SmallVec<[InputSlot; 4]>,
    outputs: Option<OutputSpec>,
    parameters: ParameterBag,
    defines: ShaderDefines,
}

impl PassNode {
    /// Creates a filter node. Without [`with_outputs`](Self::with_outputs)
    /// the node is terminal.
    #[must_use]
    pub fn filter(name: impl Into<String>, shader: impl Into<String>) -> Self {
        Self::with_kind(
            name.into(),
            NodeKind::Filter {
                shader: shader.into(),
            },
        )
    }

    /// Creates a texture node with no texture attached yet.
    #[must_use]
    pub fn texture(name: impl Into<String>) -> Self {
        Self::with_kind(name.into(), NodeKind::Texture(None))
    }

    fn with_kind(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            inputs: SmallVec::new(),
            outputs: None,
            parameters: ParameterBag::default(),
            defines: ShaderDefines::default(),
        }
    }

    #[must_use]
    pub fn with_input(mut self, slot: &str, binding: impl Into<InputBinding>) -> Self {
        self.set_input(slot, Some(binding.into()));
        self
    }

    /// Declares a slot without binding it.
    #[must_use]
    pub fn with_unbound_input(mut self, slot: &str) -> Self {
        self.set_input(slot, None);
        self
    }

    #[must_use]
    pub fn with_outputs(mut self, outputs: OutputSpec) -> Self {
        self.outputs = Some(outputs);
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.set(key, value);
        self
    }

    // === Accessors ===

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn shader(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Filter { shader } => Some(shader),
            NodeKind::Texture(_) => None,
        }
    }

    /// The wrapped texture of a texture node.
    #[must_use]
    pub fn texture_handle(&self) -> Option<TextureHandle> {
        match &self.kind {
            NodeKind::Texture(texture) => *texture,
            NodeKind::Filter { .. } => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_filter(&self) -> bool {
        matches!(self.kind, NodeKind::Filter { .. })
    }

    /// A filter node without outputs renders into the caller's target.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_filter() && self.outputs.is_none()
    }

    #[inline]
    #[must_use]
    pub fn outputs(&self) -> Option<&OutputSpec> {
        self.outputs.as_ref()
    }

    /// The binding of `slot`, if the slot exists and is bound.
    #[must_use]
    pub fn input(&self, slot: &str) -> Option<&InputBinding> {
        self.inputs
            .iter()
            .find(|s| s.name == slot)
            .and_then(|s| s.binding.as_ref())
    }

    /// All declared slots in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = (&str, Option<&InputBinding>)> {
        self.inputs
            .iter()
            .map(|s| (s.name.as_str(), s.binding.as_ref()))
    }

    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &ParameterBag {
        &self.parameters
    }

    #[inline]
    #[must_use]
    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    // === Mutation (graph-internal) ===

    pub(crate) fn set_input(&mut self, slot: &str, binding: Option<InputBinding>) {
        if let Some(existing) = self.inputs.iter_mut().find(|s| s.name == slot) {
            existing.binding = binding;
        } else {
            self.inputs.push(InputSlot {
                name: slot.to_owned(),
                binding,
            });
        }
    }

    pub(crate) fn set_outputs(&mut self, outputs: Option<OutputSpec>) {
        self.outputs = outputs;
    }

    pub(crate) fn set_parameter(&mut self, key: &str, value: ParamValue) {
        if let Some(existing) = self.parameters.get_mut(key) {
            *existing = value;
        } else {
            self.parameters.insert(key.to_owned(), value);
        }
    }

    pub(crate) fn remove_parameter(&mut self, key: &str) -> Option<ParamValue> {
        self.parameters.remove(key)
    }

    pub(crate) fn defines_mut(&mut self) -> &mut ShaderDefines {
        &mut self.defines
    }

    /// Returns `false` for filter nodes.
    pub(crate) fn set_texture(&mut self, texture: Option<TextureHandle>) -> bool {
        match &mut self.kind {
            NodeKind::Texture(slot) => {
                *slot = texture;
                true
            }
            NodeKind::Filter { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_input_keeps_declaration_order() {
        let mut node = PassNode::filter("composite", "composite")
            .with_input("texture", "source")
            .with_unbound_input("bloom");

        node.set_input("bloom", Some("bloom_composite".into()));
        node.set_input("texture", Some("dof_composite".into()));

        let slots: Vec<_> = node.inputs().map(|(name, _)| name).collect();
        assert_eq!(slots, ["texture", "bloom"]);
        assert_eq!(
            node.input("texture"),
            Some(&InputBinding::Node("dof_composite".into()))
        );
    }

    #[test]
    fn terminal_only_for_filters_without_outputs() {
        let source = PassNode::texture("source");
        let fxaa = PassNode::filter("FXAA", "fxaa");
        let composite = PassNode::filter("composite", "composite")
            .with_outputs(OutputSpec::viewport(PixelFormat::Rgba8Unorm));

        assert!(!source.is_terminal());
        assert!(fxaa.is_terminal());
        assert!(!composite.is_terminal());
    }

    #[test]
    fn size_spec_never_zero() {
        assert_eq!(SizeSpec::Viewport { scale: 0.01 }.resolve(10), 1);
        assert_eq!(SizeSpec::Fixed(0).resolve(100), 1);
        assert_eq!(SizeSpec::Viewport { scale: 0.5 }.resolve(801), 401);
    }

    #[test]
    fn size_spec_deserializes_both_forms() {
        let fixed: SizeSpec = serde_json::from_str("256").unwrap();
        let scaled: SizeSpec = serde_json::from_str(r#"{ "scale": 0.25 }"#).unwrap();
        assert_eq!(fixed, SizeSpec::Fixed(256));
        assert_eq!(scaled, SizeSpec::Viewport { scale: 0.25 });
    }
}
