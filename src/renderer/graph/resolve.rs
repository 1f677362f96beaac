//! Input Resolution
//!
//! Edges in the render graph are late-bound names. Resolution turns a slot
//! binding into one of three outcomes:
//!
//! | Binding                     | Graph state            | Result                 |
//! |-----------------------------|------------------------|------------------------|
//! | `InputBinding::Texture(h)`  | any                    | `External(h)`          |
//! | `InputBinding::Node(name)`  | node `name` present    | `Producer(key)`        |
//! | `InputBinding::Node(name)`  | node `name` absent     | `Unresolved`           |
//!
//! Only `Producer` results are edges. An unresolved name is treated as an
//! optional feature that is not present in this graph variant; the slot is
//! left unbound for that frame.

use rustc_hash::FxHashMap;

use super::graph::NodeKey;
use super::node::InputBinding;
use crate::renderer::backend::TextureHandle;

/// Outcome of resolving one input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Reads another node's output.
    Producer(NodeKey),
    /// Reads a texture supplied directly by the caller.
    External(TextureHandle),
    /// Names a node that is not in the graph.
    Unresolved,
}

impl Resolution {
    #[inline]
    #[must_use]
    pub fn producer(self) -> Option<NodeKey> {
        match self {
            Self::Producer(key) => Some(key),
            _ => None,
        }
    }
}

/// Resolves `binding` against the graph's name index.
#[must_use]
pub fn resolve_binding(binding: &InputBinding, names: &FxHashMap<String, NodeKey>) -> Resolution {
    match binding {
        InputBinding::Texture(texture) => Resolution::External(*texture),
        InputBinding::Node(name) => names
            .get(name)
            .map_or(Resolution::Unresolved, |key| Resolution::Producer(*key)),
    }
}
