//! Effect Graph Description
//!
//! The compositor topology is authored as data: a JSON document listing the
//! nodes, their default input bindings, outputs, parameters and shader
//! defines. It is parsed once at construction and turned into a
//! [`RenderGraph`]; nothing is re-parsed at runtime.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "name": "source" },
//!     {
//!       "name": "composite",
//!       "shader": "composite",
//!       "inputs": { "texture": "source", "bloom": null },
//!       "outputs": { "width": { "scale": 1.0 }, "height": { "scale": 1.0 }, "format": "rgba8unorm" },
//!       "parameters": { "exposure": 1.0 },
//!       "defines": { "TONEMAPPING": true }
//!     },
//!     { "name": "FXAA", "shader": "fxaa", "inputs": { "texture": "composite" }, "outputs": null }
//!   ]
//! }
//! ```
//!
//! A node without `shader` is a texture node. A filter node whose `outputs`
//! is `null` (or missing) is terminal.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::graph::RenderGraph;
use super::node::{OutputSpec, ParamValue, PassNode};
use crate::errors::{ClayError, Result};

/// The builtin effect graph shipped with the viewer.
const BUILTIN_EFFECTS: &str = include_str!("effects.json");

/// Description of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    #[serde(default)]
    pub shader: Option<String>,
    /// Slot → producer node name; `null` declares an unbound slot.
    #[serde(default)]
    pub inputs: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub outputs: Option<OutputSpec>,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    #[serde(default)]
    pub defines: BTreeMap<String, Value>,
}

/// A complete effect graph description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDescription {
    pub nodes: Vec<NodeDescription>,
}

impl EffectDescription {
    /// Parses a description from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The builtin description (bloom, depth of field, tone-mapping
    /// composite and FXAA).
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_EFFECTS)
    }

    #[must_use]
    pub fn node(&self, name: &str) -> Option<&NodeDescription> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Builds the render graph. Duplicate node names are fatal.
    pub fn build(&self) -> Result<RenderGraph> {
        let mut graph = RenderGraph::new();
        for description in &self.nodes {
            graph.add_node(description.to_node()?)?;
        }
        Ok(graph)
    }
}

impl NodeDescription {
    /// Converts the description into a graph node.
    pub fn to_node(&self) -> Result<PassNode> {
        let mut node = match &self.shader {
            Some(shader) => PassNode::filter(&self.name, shader),
            None => {
                if self.outputs.is_some() {
                    return Err(ClayError::Description(format!(
                        "texture node `{}` cannot declare outputs",
                        self.name
                    )));
                }
                PassNode::texture(&self.name)
            }
        };

        for (slot, producer) in &self.inputs {
            node = match producer {
                Some(producer) => node.with_input(slot, producer.as_str()),
                None => node.with_unbound_input(slot),
            };
        }
        if let Some(outputs) = self.outputs {
            node = node.with_outputs(outputs);
        }
        for (key, value) in &self.parameters {
            let value = param_from_json(value).ok_or_else(|| {
                ClayError::Description(format!(
                    "unsupported value for parameter `{key}` of `{}`: {value}",
                    self.name
                ))
            })?;
            node = node.with_parameter(key.as_str(), value);
        }
        for (key, value) in &self.defines {
            node = match define_from_json(value) {
                Some(value) => node.with_define(key.as_str(), value),
                None => node,
            };
        }
        Ok(node)
    }
}

/// Numbers become floats, booleans stay booleans, arrays of 2–4 numbers
/// become vectors and longer numeric arrays become float arrays.
fn param_from_json(value: &Value) -> Option<ParamValue> {
    match value {
        Value::Bool(b) => Some(ParamValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(|v| ParamValue::Float(v as f32)),
        Value::Array(items) => {
            let floats: Vec<f32> = items
                .iter()
                .map(|item| item.as_f64().map(|v| v as f32))
                .collect::<Option<_>>()?;
            Some(match floats.as_slice() {
                [x, y] => ParamValue::Vec2(Vec2::new(*x, *y)),
                [x, y, z] => ParamValue::Vec3(Vec3::new(*x, *y, *z)),
                [x, y, z, w] => ParamValue::Vec4(Vec4::new(*x, *y, *z, *w)),
                _ => ParamValue::FloatArray(floats),
            })
        }
        _ => None,
    }
}

/// `false`/`null` drop the define, `true` sets a flag, anything else is
/// stringified.
fn define_from_json(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::graph::node::InputBinding;

    #[test]
    fn builtin_description_builds() {
        let description = EffectDescription::builtin().unwrap();
        let graph = description.build().unwrap();

        for name in [
            "source",
            "coc",
            "dof_far_blur",
            "dof_near_blur",
            "dof_coc_blur",
            "dof_composite",
            "bloom_composite",
            "composite",
            "FXAA",
        ] {
            assert!(graph.contains(name), "missing builtin node `{name}`");
        }
        assert_eq!(graph.terminals(), ["FXAA"]);
        assert_eq!(
            graph.node("composite").unwrap().input("texture"),
            Some(&InputBinding::Node("source".into()))
        );
        assert_eq!(graph.node("composite").unwrap().input("bloom"), None);
    }

    #[test]
    fn duplicate_names_are_fatal() {
        let json = r#"{ "nodes": [
            { "name": "source" },
            { "name": "source" }
        ] }"#;
        let description = EffectDescription::from_json(json).unwrap();
        assert!(matches!(
            description.build(),
            Err(ClayError::DuplicateName(name)) if name == "source"
        ));
    }

    #[test]
    fn parameters_map_to_typed_values() {
        assert_eq!(param_from_json(&serde_json::json!(2.0)), Some(ParamValue::Float(2.0)));
        assert_eq!(
            param_from_json(&serde_json::json!([1.0, 0.5, 0.0])),
            Some(ParamValue::Vec3(Vec3::new(1.0, 0.5, 0.0)))
        );
        assert_eq!(param_from_json(&serde_json::json!("text")), None);
        assert_eq!(define_from_json(&serde_json::json!(16)), Some("16".to_owned()));
        assert_eq!(define_from_json(&serde_json::json!(false)), None);
    }

    #[test]
    fn texture_nodes_reject_outputs() {
        let json = r#"{ "nodes": [
            { "name": "source", "outputs": { "width": 4, "height": 4 } }
        ] }"#;
        let description = EffectDescription::from_json(json).unwrap();
        assert!(matches!(description.build(), Err(ClayError::Description(_))));
    }
}
