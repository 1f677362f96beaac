//! Headless Backend
//!
//! A [`RenderBackend`] that performs no GPU work and records every call
//! instead. It is the backend used by the test suite and the benches, and it
//! is handy for inspecting what a frame would submit:
//!
//! ```rust,ignore
//! let mut backend = HeadlessBackend::new(Viewport::new(800, 600, 2.0));
//! compositor.composite(&mut backend, &camera, RenderTarget::Screen, 0)?;
//! for pass in backend.passes() {
//!     println!("{} -> {:?}", pass.node, pass.target);
//! }
//! ```
//!
//! Releasing a handle that is not live is recorded in
//! [`invalid_releases`](HeadlessBackend::invalid_releases) rather than
//! panicking, so lifecycle tests can assert on it.

use rustc_hash::FxHashMap;

use super::backend::{
    FramebufferHandle, PassCommand, RenderBackend, RenderTarget, SceneDraw, TextureDesc,
    TextureHandle, Viewport,
};
use super::graph::node::{ParameterBag, ShaderDefines};

/// Owned copy of an executed [`PassCommand`].
#[derive(Debug, Clone)]
pub struct PassRecord {
    pub node: String,
    pub shader: String,
    pub defines: ShaderDefines,
    pub inputs: Vec<(String, TextureHandle)>,
    pub parameters: ParameterBag,
    pub target: RenderTarget,
    pub width: u32,
    pub height: u32,
}

impl PassRecord {
    #[must_use]
    pub fn input(&self, slot: &str) -> Option<TextureHandle> {
        self.inputs
            .iter()
            .find_map(|(name, texture)| (name == slot).then_some(*texture))
    }
}

/// Owned copy of a [`SceneDraw`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDrawRecord {
    pub label: &'static str,
    pub color_targets: Vec<TextureHandle>,
    pub depth_attachment: TextureHandle,
    pub width: u32,
    pub height: u32,
}

/// Something the backend was asked to release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    Texture(TextureHandle),
    Framebuffer(FramebufferHandle),
    Program(String),
}

/// Recording backend.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    viewport: Viewport,
    next_id: u64,
    textures: FxHashMap<TextureHandle, TextureDesc>,
    framebuffers: FxHashMap<FramebufferHandle, (TextureHandle, Option<TextureHandle>)>,
    passes: Vec<PassRecord>,
    scene_draws: Vec<SceneDrawRecord>,
    releases: Vec<Release>,
    invalid_releases: Vec<Release>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            next_id: 1,
            ..Self::default()
        }
    }

    /// Changes the reported viewport. Does not touch any texture.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn mint(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    // === Inspection ===

    /// Passes executed since the last [`clear_frame`](Self::clear_frame).
    #[must_use]
    pub fn passes(&self) -> &[PassRecord] {
        &self.passes
    }

    /// Node names of the recorded passes, in execution order.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.node.as_str()).collect()
    }

    #[must_use]
    pub fn pass(&self, node: &str) -> Option<&PassRecord> {
        self.passes.iter().find(|pass| pass.node == node)
    }

    #[must_use]
    pub fn scene_draws(&self) -> &[SceneDrawRecord] {
        &self.scene_draws
    }

    #[must_use]
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    #[must_use]
    pub fn invalid_releases(&self) -> &[Release] {
        &self.invalid_releases
    }

    #[must_use]
    pub fn texture(&self, texture: TextureHandle) -> Option<&TextureDesc> {
        self.textures.get(&texture)
    }

    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn live_framebuffers(&self) -> usize {
        self.framebuffers.len()
    }

    /// Forgets recorded passes and scene draws; live resources are kept.
    pub fn clear_frame(&mut self) {
        self.passes.clear();
        self.scene_draws.clear();
    }
}

impl RenderBackend for HeadlessBackend {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> TextureHandle {
        let handle = TextureHandle::from_raw(self.mint());
        self.textures.insert(handle, desc.clone());
        handle
    }

    fn resize_texture(&mut self, texture: TextureHandle, width: u32, height: u32) {
        match self.textures.get_mut(&texture) {
            Some(desc) => {
                desc.width = width;
                desc.height = height;
            }
            None => log::warn!("Resize of unknown texture {texture:?}"),
        }
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_some() {
            self.releases.push(Release::Texture(texture));
        } else {
            self.invalid_releases.push(Release::Texture(texture));
        }
    }

    fn create_framebuffer(
        &mut self,
        color: TextureHandle,
        depth: Option<TextureHandle>,
    ) -> FramebufferHandle {
        let handle = FramebufferHandle::from_raw(self.mint());
        self.framebuffers.insert(handle, (color, depth));
        handle
    }

    fn release_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if self.framebuffers.remove(&framebuffer).is_some() {
            self.releases.push(Release::Framebuffer(framebuffer));
        } else {
            self.invalid_releases.push(Release::Framebuffer(framebuffer));
        }
    }

    fn execute_pass(&mut self, pass: &PassCommand<'_>) {
        self.passes.push(PassRecord {
            node: pass.node.to_owned(),
            shader: pass.shader.to_owned(),
            defines: pass.defines.clone(),
            inputs: pass
                .inputs
                .iter()
                .map(|(slot, texture)| ((*slot).to_owned(), *texture))
                .collect(),
            parameters: pass.parameters.clone(),
            target: pass.target,
            width: pass.width,
            height: pass.height,
        });
    }

    fn draw_scene(&mut self, draw: &SceneDraw<'_>) {
        self.scene_draws.push(SceneDrawRecord {
            label: draw.label,
            color_targets: draw.color_targets.to_vec(),
            depth_attachment: draw.depth_attachment,
            width: draw.width,
            height: draw.height,
        });
    }

    fn release_program(&mut self, shader: &str) {
        self.releases.push(Release::Program(shader.to_owned()));
    }
}
