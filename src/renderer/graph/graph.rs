//! Render Graph Executor
//!
//! `RenderGraph` stores named [`PassNode`]s and executes them in dependency
//! order. Edges are name references held by the nodes' input slots, so the
//! topology can be rewired at runtime through [`set_input`](RenderGraph::set_input)
//! and [`set_outputs`](RenderGraph::set_outputs).
//!
//! # Scheduling
//!
//! - Only nodes upstream of a terminal node (a filter node with no outputs)
//!   are executed; disconnected subgraphs cost nothing.
//! - The order is a topological sort with ties broken by insertion order, so
//!   repeated renders of the same topology issue identical command streams.
//! - The order is cached and recomputed only after the graph is dirtied.
//!
//! # Resources
//!
//! Every non-terminal filter node renders into an offscreen target owned by
//! the graph. Targets are created on first use, resized when the viewport
//! changes and released when the node is removed, becomes terminal, or the
//! graph is disposed.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use super::node::{InputBinding, NodeKind, OutputSpec, ParamValue, PassNode};
use super::resolve::{Resolution, resolve_binding};
use crate::errors::{ClayError, Result};
use crate::renderer::backend::{
    PassCommand, RenderBackend, RenderTarget, TextureDesc, TextureHandle, Viewport,
};

new_key_type! {
    /// Stable key of a node inside a [`RenderGraph`].
    pub struct NodeKey;
}

/// Offscreen target owned by the graph for one node.
#[derive(Debug)]
struct OwnedTarget {
    texture: TextureHandle,
    desc: TextureDesc,
}

#[derive(Debug)]
struct GraphEntry {
    node: PassNode,
    /// Insertion order, used as the topological tie-break.
    order: u64,
    target: Option<OwnedTarget>,
}

/// A mutable DAG of render passes.
#[derive(Debug, Default)]
pub struct RenderGraph {
    nodes: SlotMap<NodeKey, GraphEntry>,
    names: FxHashMap<String, NodeKey>,
    next_order: u64,
    schedule: Vec<NodeKey>,
    dirty: bool,
    /// Targets of removed nodes, released at the next render or dispose.
    pending_release: Vec<TextureHandle>,
    /// Shader programs used since the last dispose.
    programs: FxHashSet<String>,
    /// Overrides the backend viewport when sizing targets.
    viewport: Option<Viewport>,
}

impl RenderGraph {
    /// Creates an empty render graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Inserts a node.
    ///
    /// Fails with [`ClayError::DuplicateName`] when a node of the same name
    /// already exists.
    pub fn add_node(&mut self, node: PassNode) -> Result<NodeKey> {
        if self.names.contains_key(node.name()) {
            return Err(ClayError::DuplicateName(node.name().to_owned()));
        }
        let name = node.name().to_owned();
        let key = self.nodes.insert(GraphEntry {
            node,
            order: self.next_order,
            target: None,
        });
        self.next_order += 1;
        self.names.insert(name, key);
        self.dirty = true;
        Ok(key)
    }

    /// Removes a node and returns it. Absent names are ignored.
    ///
    /// Consumers keep their name reference to the removed node; it simply
    /// stops resolving until a node of that name is added again.
    pub fn remove_node(&mut self, name: &str) -> Option<PassNode> {
        let key = self.names.remove(name)?;
        let entry = self.nodes.remove(key)?;
        if let Some(target) = entry.target {
            self.pending_release.push(target.texture);
        }
        self.dirty = true;
        Some(entry.node)
    }

    /// Looks up a node. Callers routinely probe for optional nodes, so a
    /// missing name is not an error.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&PassNode> {
        self.names.get(name).map(|key| &self.nodes[*key].node)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    #[must_use]
    pub fn key(&self, name: &str) -> Option<NodeKey> {
        self.names.get(name).copied()
    }

    #[must_use]
    pub fn name_of(&self, key: NodeKey) -> Option<&str> {
        self.nodes.get(key).map(|entry| entry.node.name())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node names in insertion order.
    #[must_use]
    pub fn node_names(&self) -> Vec<&str> {
        let mut entries: Vec<&GraphEntry> = self.nodes.values().collect();
        entries.sort_by_key(|entry| entry.order);
        entries.into_iter().map(|entry| entry.node.name()).collect()
    }

    /// Terminal nodes in insertion order.
    #[must_use]
    pub fn terminals(&self) -> Vec<&str> {
        let mut entries: Vec<&GraphEntry> = self
            .nodes
            .values()
            .filter(|entry| entry.node.is_terminal())
            .collect();
        entries.sort_by_key(|entry| entry.order);
        entries.into_iter().map(|entry| entry.node.name()).collect()
    }

    /// Marks the execution order stale.
    #[inline]
    pub fn dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ========================================================================
    // Rewiring
    // ========================================================================

    /// Binds (or unbinds, with `None`) an input slot. Returns `false` when
    /// the node does not exist.
    pub fn set_input(&mut self, node: &str, slot: &str, binding: Option<InputBinding>) -> bool {
        let Some(&key) = self.names.get(node) else {
            return false;
        };
        self.nodes[key].node.set_input(slot, binding);
        self.dirty = true;
        true
    }

    /// Replaces the node outputs. `None` makes the node terminal and releases
    /// its offscreen target.
    pub fn set_outputs(&mut self, node: &str, outputs: Option<OutputSpec>) -> bool {
        let Some(&key) = self.names.get(node) else {
            return false;
        };
        let entry = &mut self.nodes[key];
        if outputs.is_none()
            && let Some(target) = entry.target.take()
        {
            self.pending_release.push(target.texture);
        }
        entry.node.set_outputs(outputs);
        self.dirty = true;
        true
    }

    /// Attaches the external texture of a texture node.
    ///
    /// Returns `false` when the node is missing or is a filter node.
    pub fn set_texture(&mut self, node: &str, texture: Option<TextureHandle>) -> bool {
        self.entry_mut(node)
            .is_some_and(|entry| entry.node.set_texture(texture))
    }

    // ========================================================================
    // Parameters & Defines
    // ========================================================================

    pub fn set_parameter(&mut self, node: &str, key: &str, value: impl Into<ParamValue>) -> bool {
        let Some(entry) = self.entry_mut(node) else {
            return false;
        };
        entry.node.set_parameter(key, value.into());
        true
    }

    pub fn remove_parameter(&mut self, node: &str, key: &str) -> Option<ParamValue> {
        self.entry_mut(node)?.node.remove_parameter(key)
    }

    pub fn set_define(&mut self, node: &str, key: &str, value: impl Into<String>) -> bool {
        let Some(entry) = self.entry_mut(node) else {
            return false;
        };
        entry.node.defines_mut().set(key, value);
        true
    }

    pub fn remove_define(&mut self, node: &str, key: &str) -> bool {
        self.entry_mut(node)
            .is_some_and(|entry| entry.node.defines_mut().remove(key).is_some())
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut GraphEntry> {
        let key = *self.names.get(name)?;
        self.nodes.get_mut(key)
    }

    // ========================================================================
    // Resolution & Scheduling
    // ========================================================================

    /// Resolves a binding against the current node set.
    #[must_use]
    pub fn resolve(&self, binding: &InputBinding) -> Resolution {
        resolve_binding(binding, &self.names)
    }

    /// Resolves `node.slot`. `None` when the node or slot binding is absent.
    #[must_use]
    pub fn resolve_input(&self, node: &str, slot: &str) -> Option<Resolution> {
        self.node(node)?.input(slot).map(|binding| self.resolve(binding))
    }

    /// Current execution order, recomputing it if the graph is dirty.
    pub fn execution_order(&mut self) -> Result<Vec<&str>> {
        self.ensure_schedule()?;
        Ok(self
            .schedule
            .iter()
            .map(|key| self.nodes[*key].node.name())
            .collect())
    }

    fn ensure_schedule(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.schedule = self.compute_schedule()?;
        self.dirty = false;
        log::debug!(
            "Render graph rescheduled: {} of {} nodes active",
            self.schedule.len(),
            self.nodes.len()
        );
        Ok(())
    }

    fn producers(&self, key: NodeKey) -> SmallVec<[NodeKey; 4]> {
        self.nodes[key]
            .node
            .inputs()
            .filter_map(|(_, binding)| binding)
            .filter_map(|binding| self.resolve(binding).producer())
            .collect()
    }

    /// Kahn's algorithm over every node upstream of a terminal, with the
    /// ready set ordered by insertion order.
    fn compute_schedule(&self) -> Result<Vec<NodeKey>> {
        let terminals: Vec<NodeKey> = self
            .nodes
            .iter()
            .filter(|(_, entry)| entry.node.is_terminal())
            .map(|(key, _)| key)
            .collect();
        if terminals.is_empty() {
            return Err(ClayError::MissingTerminal);
        }

        let mut members: FxHashSet<NodeKey> = FxHashSet::default();
        let mut stack = terminals;
        while let Some(key) = stack.pop() {
            if members.insert(key) {
                stack.extend(self.producers(key));
            }
        }

        let mut ordered: Vec<NodeKey> = members.into_iter().collect();
        ordered.sort_by_key(|key| self.nodes[*key].order);
        let index: FxHashMap<NodeKey, usize> =
            ordered.iter().enumerate().map(|(i, key)| (*key, i)).collect();

        let mut indegree = vec![0_usize; ordered.len()];
        let mut consumers: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); ordered.len()];
        for (i, key) in ordered.iter().enumerate() {
            for producer in self.producers(*key) {
                indegree[i] += 1;
                consumers[index[&producer]].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = indegree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| i)
            .collect();
        let mut schedule = Vec::with_capacity(ordered.len());
        while let Some(i) = ready.pop_first() {
            schedule.push(ordered[i]);
            for &consumer in &consumers[i] {
                indegree[consumer] -= 1;
                if indegree[consumer] == 0 {
                    ready.insert(consumer);
                }
            }
        }

        if schedule.len() != ordered.len() {
            let stuck = indegree
                .iter()
                .position(|degree| *degree > 0)
                .map(|i| self.nodes[ordered[i]].node.name().to_owned())
                .unwrap_or_default();
            return Err(ClayError::CyclicGraph(stuck));
        }
        Ok(schedule)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Sizes targets from `viewport` instead of the backend's viewport.
    /// `None` goes back to the backend.
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    #[inline]
    #[must_use]
    pub fn viewport_override(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Executes every connected node in dependency order.
    ///
    /// The terminal node renders into `target`; every other filter node
    /// renders into its own offscreen target.
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        target: RenderTarget,
    ) -> Result<()> {
        self.ensure_schedule()?;
        self.flush_releases(backend);

        let viewport = self.viewport.unwrap_or_else(|| backend.viewport());
        for i in 0..self.schedule.len() {
            let key = self.schedule[i];
            if !self.nodes[key].node.is_filter() {
                continue;
            }
            let (pass_target, width, height) = self.ensure_target(backend, key, viewport, target);
            if let Some(shader) = self.nodes[key].node.shader()
                && !self.programs.contains(shader)
            {
                self.programs.insert(shader.to_owned());
            }

            let inputs = self.gather_inputs(key);
            let node = &self.nodes[key].node;
            let Some(shader) = node.shader() else {
                continue;
            };
            log::trace!("Render graph pass `{}` ({shader})", node.name());
            backend.execute_pass(&PassCommand {
                node: node.name(),
                shader,
                defines: node.defines(),
                inputs: &inputs,
                parameters: node.parameters(),
                target: pass_target,
                width,
                height,
            });
        }
        Ok(())
    }

    /// Makes sure a non-terminal node has a correctly sized target.
    fn ensure_target<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        key: NodeKey,
        viewport: Viewport,
        final_target: RenderTarget,
    ) -> (RenderTarget, u32, u32) {
        let entry = &mut self.nodes[key];
        let Some(outputs) = entry.node.outputs() else {
            let (width, height) = viewport.physical_size();
            return (final_target, width, height);
        };
        let (width, height) = outputs.resolve(viewport);
        let format = outputs.format.texture_format();

        if let Some(owned) = entry.target.as_mut().filter(|t| t.desc.format == format) {
            if (owned.desc.width, owned.desc.height) != (width, height) {
                backend.resize_texture(owned.texture, width, height);
                owned.desc.width = width;
                owned.desc.height = height;
            }
            return (RenderTarget::Texture(owned.texture), width, height);
        }

        if let Some(stale) = entry.target.take() {
            backend.release_texture(stale.texture);
        }
        let desc = TextureDesc::render_target(entry.node.name(), width, height, format);
        let texture = backend.create_texture(&desc);
        entry.target = Some(OwnedTarget { texture, desc });
        (RenderTarget::Texture(texture), width, height)
    }

    fn gather_inputs(&self, key: NodeKey) -> SmallVec<[(&str, TextureHandle); 4]> {
        let node = &self.nodes[key].node;
        let mut inputs = SmallVec::new();
        for (slot, binding) in node.inputs() {
            let Some(binding) = binding else {
                continue;
            };
            let texture = match self.resolve(binding) {
                Resolution::External(texture) => Some(texture),
                Resolution::Producer(producer) => self.output_of(producer),
                Resolution::Unresolved => None,
            };
            match texture {
                Some(texture) => inputs.push((slot, texture)),
                None => log::debug!("Input `{slot}` of `{}` has no texture", node.name()),
            }
        }
        inputs
    }

    fn output_of(&self, key: NodeKey) -> Option<TextureHandle> {
        let entry = self.nodes.get(key)?;
        match entry.node.kind() {
            NodeKind::Texture(texture) => *texture,
            NodeKind::Filter { .. } => entry.target.as_ref().map(|t| t.texture),
        }
    }

    /// Output texture of a node: the wrapped texture for texture nodes, the
    /// owned target for filter nodes (once rendered).
    #[must_use]
    pub fn output_texture(&self, name: &str) -> Option<TextureHandle> {
        self.key(name).and_then(|key| self.output_of(key))
    }

    /// Size of a node's owned target, if allocated.
    #[must_use]
    pub fn output_size(&self, name: &str) -> Option<(u32, u32)> {
        let entry = &self.nodes[self.key(name)?];
        entry
            .target
            .as_ref()
            .map(|t| (t.desc.width, t.desc.height))
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    fn flush_releases<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        for texture in self.pending_release.drain(..) {
            backend.release_texture(texture);
        }
    }

    /// Releases every owned target and the shader programs used so far.
    ///
    /// Safe to call repeatedly; the graph can be rendered again afterwards.
    pub fn dispose<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        self.flush_releases(backend);
        for entry in self.nodes.values_mut() {
            if let Some(target) = entry.target.take() {
                backend.release_texture(target.texture);
            }
        }
        for shader in self.programs.drain() {
            backend.release_program(&shader);
        }
    }
}
