//! Fixed Terminal Chain
//!
//! The last stages of the compositor form a fixed, ordered chain of nodes
//! (`composite → FXAA` in the builtin graph). Optional members can be spliced
//! out of the chain and back in without breaking connectivity:
//!
//! ```text
//! composite ──► FXAA ──► target        (FXAA present)
//! composite ──────────► target        (FXAA spliced out)
//! ```
//!
//! Invariant: among the members currently present in the graph, exactly one is
//! terminal (`outputs = None`) and it is the last one. The first member is the
//! anchor of the chain and is never spliced.
//!
//! Neighbour lookups skip any number of absent members in both directions, so
//! splicing stays correct when several optional members are out at once.

use rustc_hash::FxHashMap;

use super::graph::RenderGraph;
use super::node::{InputBinding, OutputSpec, PassNode};
use crate::errors::Result;

/// Input slot that carries the chained color texture.
pub const CHAIN_INPUT_SLOT: &str = "texture";

/// Ordered list of chain members plus the members currently spliced out.
#[derive(Debug, Clone)]
pub struct TerminalChain {
    order: Vec<String>,
    /// Outputs given to a member that feeds the next member.
    link_outputs: OutputSpec,
    detached: FxHashMap<String, PassNode>,
}

impl TerminalChain {
    #[must_use]
    pub fn new<I, S>(members: I, link_outputs: OutputSpec) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: members.into_iter().map(Into::into).collect(),
            link_outputs,
            detached: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn link_outputs(&self) -> OutputSpec {
        self.link_outputs
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|member| member == name)
    }

    /// Nearest present member before `name`.
    #[must_use]
    pub fn predecessor<'a>(&'a self, graph: &RenderGraph, name: &str) -> Option<&'a str> {
        let index = self.position(name)?;
        self.order[..index]
            .iter()
            .rev()
            .find(|member| graph.contains(member))
            .map(String::as_str)
    }

    /// Nearest present member after `name`.
    #[must_use]
    pub fn successor<'a>(&'a self, graph: &RenderGraph, name: &str) -> Option<&'a str> {
        let index = self.position(name)?;
        self.order[index + 1..]
            .iter()
            .find(|member| graph.contains(member))
            .map(String::as_str)
    }

    /// The member currently rendering to the final target.
    #[must_use]
    pub fn terminal<'a>(&'a self, graph: &RenderGraph) -> Option<&'a str> {
        self.order
            .iter()
            .rev()
            .find(|member| graph.contains(member))
            .map(String::as_str)
    }

    /// Takes ownership of a member node that is not in the graph, so it can
    /// be spliced in later.
    pub fn detach(&mut self, node: PassNode) {
        self.detached.insert(node.name().to_owned(), node);
    }

    #[must_use]
    pub fn is_detached(&self, name: &str) -> bool {
        self.detached.contains_key(name)
    }

    /// Splices a detached member back into the graph.
    ///
    /// Returns `Ok(false)` without touching the graph when the member is
    /// already present, unknown, or has no present predecessor.
    pub fn insert(&mut self, graph: &mut RenderGraph, name: &str) -> Result<bool> {
        if graph.contains(name) {
            return Ok(false);
        }
        if !self.detached.contains_key(name) {
            log::warn!("Chain node `{name}` is not available for splicing");
            return Ok(false);
        }
        let Some(prev) = self.predecessor(graph, name).map(str::to_owned) else {
            log::warn!("Chain node `{name}` has no predecessor; not spliced");
            return Ok(false);
        };
        let next = self.successor(graph, name).map(str::to_owned);
        let Some(mut node) = self.detached.remove(name) else {
            return Ok(false);
        };

        graph.set_outputs(&prev, Some(self.link_outputs));
        node.set_input(CHAIN_INPUT_SLOT, Some(InputBinding::Node(prev.clone())));
        if let Some(next) = &next {
            node.set_outputs(Some(self.link_outputs));
            graph.set_input(next, CHAIN_INPUT_SLOT, Some(InputBinding::Node(name.to_owned())));
        } else {
            node.set_outputs(None);
        }
        graph.add_node(node)?;

        log::debug!(
            "Spliced `{name}` into chain between `{prev}` and `{}`",
            next.as_deref().unwrap_or("<target>")
        );
        Ok(true)
    }

    /// Splices a member out of the graph, keeping it detached.
    ///
    /// Returns `false` when the member is absent or is the chain anchor.
    pub fn remove(&mut self, graph: &mut RenderGraph, name: &str) -> bool {
        if !graph.contains(name) {
            return false;
        }
        let Some(prev) = self.predecessor(graph, name).map(str::to_owned) else {
            log::warn!("Chain node `{name}` has no predecessor; not removed");
            return false;
        };
        let next = self.successor(graph, name).map(str::to_owned);

        if let Some(next) = &next {
            graph.set_outputs(&prev, Some(self.link_outputs));
            graph.set_input(next, CHAIN_INPUT_SLOT, Some(InputBinding::Node(prev.clone())));
        } else {
            graph.set_outputs(&prev, None);
        }
        if let Some(node) = graph.remove_node(name) {
            self.detach(node);
        }

        log::debug!("Spliced `{name}` out of chain after `{prev}`");
        true
    }

    /// Checks the chain invariant: the last present member is the only
    /// terminal member, and every present member reads from its predecessor.
    #[must_use]
    pub fn is_consistent(&self, graph: &RenderGraph) -> bool {
        let present: Vec<&str> = self
            .order
            .iter()
            .filter(|member| graph.contains(member))
            .map(String::as_str)
            .collect();
        let Some((last, rest)) = present.split_last() else {
            return false;
        };

        let terminal_ok = graph.node(last).is_some_and(PassNode::is_terminal)
            && rest
                .iter()
                .all(|member| graph.node(member).is_some_and(|n| !n.is_terminal()));
        let links_ok = present.windows(2).all(|pair| {
            graph
                .node(pair[1])
                .and_then(|node| node.input(CHAIN_INPUT_SLOT))
                .is_some_and(|binding| *binding == InputBinding::Node(pair[0].to_owned()))
        });
        terminal_ok && links_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::graph::node::PixelFormat;

    const LINK: OutputSpec = OutputSpec::viewport(PixelFormat::Rgba8Unorm);

    fn chain_graph(members: &[&str]) -> (RenderGraph, TerminalChain) {
        let mut graph = RenderGraph::new();
        graph.add_node(PassNode::texture("source")).unwrap();
        let mut prev = "source".to_owned();
        for (i, name) in members.iter().enumerate() {
            let mut node = PassNode::filter(*name, *name).with_input(CHAIN_INPUT_SLOT, prev.as_str());
            if i + 1 < members.len() {
                node = node.with_outputs(LINK);
            }
            graph.add_node(node).unwrap();
            prev = (*name).to_owned();
        }
        (graph, TerminalChain::new(members.iter().copied(), LINK))
    }

    #[test]
    fn remove_last_member_makes_predecessor_terminal() {
        let (mut graph, mut chain) = chain_graph(&["composite", "FXAA"]);
        assert!(chain.remove(&mut graph, "FXAA"));
        assert!(graph.node("composite").unwrap().is_terminal());
        assert_eq!(chain.terminal(&graph), Some("composite"));
        assert!(chain.is_consistent(&graph));
    }

    #[test]
    fn anchor_is_never_removed() {
        let (mut graph, mut chain) = chain_graph(&["composite", "FXAA"]);
        assert!(!chain.remove(&mut graph, "composite"));
        assert!(graph.contains("composite"));
    }

    #[test]
    fn insert_skips_multiple_absent_neighbours() {
        let (mut graph, mut chain) = chain_graph(&["composite", "a", "b", "c", "d"]);
        assert!(chain.remove(&mut graph, "b"));
        assert!(chain.remove(&mut graph, "c"));
        assert!(chain.remove(&mut graph, "a"));
        assert!(chain.is_consistent(&graph));
        assert_eq!(
            graph.node("d").unwrap().input(CHAIN_INPUT_SLOT),
            Some(&InputBinding::Node("composite".into()))
        );

        // `c` sits between two absent members on the left and `d` on the right.
        assert!(chain.insert(&mut graph, "c").unwrap());
        assert!(chain.is_consistent(&graph));
        assert_eq!(chain.predecessor(&graph, "c"), Some("composite"));
        assert_eq!(chain.successor(&graph, "c"), Some("d"));

        assert!(chain.insert(&mut graph, "a").unwrap());
        assert!(chain.insert(&mut graph, "b").unwrap());
        assert!(chain.is_consistent(&graph));
        assert_eq!(chain.terminal(&graph), Some("d"));
    }

    #[test]
    fn insert_is_idempotent() {
        let (mut graph, mut chain) = chain_graph(&["composite", "FXAA"]);
        assert!(!chain.insert(&mut graph, "FXAA").unwrap());
        assert!(chain.is_consistent(&graph));
    }
}
