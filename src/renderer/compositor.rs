//! Effect Compositor
//!
//! `EffectCompositor` owns the post-processing pipeline of the viewer: the
//! source color/depth targets the scene is rendered into, the effect
//! [`RenderGraph`], the G-buffer and screen-space passes, and the DOF
//! temporal kernel. It exposes a flat enable/disable/parameter API and a
//! single per-frame entry point, [`composite`](EffectCompositor::composite).
//!
//! # Frame Flow
//!
//! ```text
//!  scene ──► source fb (color + depth)
//!                │
//!                ├─(SSAO|SSR|edge)─► G-buffer ──► edge ──► SSR
//!                │                                 │        │
//!                ▼                                 ▼        ▼
//!        graph `source` node  ◄──────── running source / target texture
//!                │
//!                ├─► coc ─► dof blurs ─► dof_composite ─┐
//!                ├─► bright ─► ... ─► bloom_composite ──┤
//!                ▼                                      ▼
//!            composite (tone map, bloom, grading) ──► FXAA ──► target
//! ```
//!
//! # Effect Wiring
//!
//! | Effect           | Enabling does                                          |
//! |------------------|--------------------------------------------------------|
//! | FXAA             | splices `FXAA` into the terminal chain                 |
//! | Bloom            | `composite.bloom = "bloom_composite"`                  |
//! | Depth of field   | `composite.texture = "dof_composite"`                  |
//! | Color correction | `COLOR_CORRECTION` define + lookup texture binding     |
//! | SSAO, SSR, edge  | flag only; consulted by `composite` and `update_ssao`  |

use bitflags::bitflags;
use glam::Vec3;

use super::backend::{
    FramebufferHandle, RenderBackend, RenderTarget, TextureDesc, TextureHandle, Viewport,
    physical_extent,
};
use super::graph::chain::TerminalChain;
use super::graph::description::EffectDescription;
use super::graph::graph::RenderGraph;
use super::graph::node::{InputBinding, OutputSpec, PassNode, PixelFormat};
use super::passes::dof::{DOF_BLUR_NODES, DofKernel};
use super::passes::edge::EdgePass;
use super::passes::gbuffer::GBuffer;
use super::passes::ssao::SsaoPass;
use super::passes::ssr::SsrPass;
use super::settings::{EffectValue, PostEffectSettings, Quality};
use crate::errors::{ClayError, Result};
use crate::scene::camera::RenderCamera;

pub const SOURCE_NODE: &str = "source";
pub const COC_NODE: &str = "coc";
pub const COMPOSITE_NODE: &str = "composite";
pub const FXAA_NODE: &str = "FXAA";
pub const BLOOM_NODE: &str = "bloom_composite";
pub const DOF_NODE: &str = "dof_composite";

/// Fixed order of the terminal chain.
pub const FINAL_NODES_CHAIN: [&str; 2] = [COMPOSITE_NODE, FXAA_NODE];

const COLOR_CORRECTION_DEFINE: &str = "COLOR_CORRECTION";
const LUT_SLOT: &str = "lut";

/// Scene color is rendered in HDR.
pub const SOURCE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const SOURCE_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EnabledEffects: u32 {
        const BLOOM            = 1 << 0;
        const DEPTH_OF_FIELD   = 1 << 1;
        const SSAO             = 1 << 2;
        const SSR              = 1 << 3;
        const EDGE             = 1 << 4;
        const FXAA             = 1 << 5;
        const COLOR_CORRECTION = 1 << 6;
    }
}

impl EnabledEffects {
    /// Effects that read the G-buffer.
    pub const NORMAL_PASS: Self = Self::SSAO.union(Self::SSR).union(Self::EDGE);
    /// Effects that refine over several frames.
    pub const TEMPORAL: Self = Self::DEPTH_OF_FIELD.union(Self::SSAO);
}

/// A toggleable post effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Bloom,
    DepthOfField,
    Ssao,
    Ssr,
    Edge,
    Fxaa,
    ColorCorrection,
}

impl Effect {
    pub const ALL: [Self; 7] = [
        Self::Bloom,
        Self::DepthOfField,
        Self::Ssao,
        Self::Ssr,
        Self::Edge,
        Self::Fxaa,
        Self::ColorCorrection,
    ];

    #[must_use]
    pub const fn flag(self) -> EnabledEffects {
        match self {
            Self::Bloom => EnabledEffects::BLOOM,
            Self::DepthOfField => EnabledEffects::DEPTH_OF_FIELD,
            Self::Ssao => EnabledEffects::SSAO,
            Self::Ssr => EnabledEffects::SSR,
            Self::Edge => EnabledEffects::EDGE,
            Self::Fxaa => EnabledEffects::FXAA,
            Self::ColorCorrection => EnabledEffects::COLOR_CORRECTION,
        }
    }
}

/// The post-processing compositor.
#[derive(Debug)]
pub struct EffectCompositor {
    // === Owned Targets ===
    source_texture: Option<TextureHandle>,
    depth_texture: Option<TextureHandle>,
    framebuffer: Option<FramebufferHandle>,
    size: (u32, u32),

    // === Graph ===
    graph: RenderGraph,
    chain: TerminalChain,

    // === Procedural Passes ===
    gbuffer: GBuffer,
    ssao: SsaoPass,
    ssr: SsrPass,
    edge: EdgePass,
    dof: DofKernel,

    // === State ===
    enabled: EnabledEffects,
    lookup_texture: Option<TextureHandle>,
    disposed: bool,
}

impl EffectCompositor {
    /// Builds the compositor from an effect description and allocates its
    /// targets at the backend's current viewport size.
    ///
    /// The description must contain the `source`, `coc` and `composite`
    /// nodes. Effects whose wiring is already present in the description
    /// (for example `FXAA` in the terminal chain) start enabled.
    pub fn new<B: RenderBackend + ?Sized>(
        backend: &mut B,
        description: &EffectDescription,
    ) -> Result<Self> {
        let mut graph = description.build()?;
        for required in [SOURCE_NODE, COC_NODE, COMPOSITE_NODE] {
            if !graph.contains(required) {
                return Err(ClayError::Description(format!(
                    "missing required node `{required}`"
                )));
            }
        }

        let link_outputs = graph
            .node(COMPOSITE_NODE)
            .and_then(PassNode::outputs)
            .copied()
            .unwrap_or(OutputSpec::viewport(PixelFormat::Rgba8Unorm));
        let chain = TerminalChain::new(FINAL_NODES_CHAIN, link_outputs);

        let (width, height) = backend.viewport().physical_size();
        let source = backend.create_texture(&TextureDesc::render_target(
            "compositor_source",
            width,
            height,
            SOURCE_FORMAT,
        ));
        let depth = backend.create_texture(&TextureDesc::render_target(
            "compositor_depth",
            width,
            height,
            SOURCE_DEPTH_FORMAT,
        ));
        let framebuffer = backend.create_framebuffer(source, Some(depth));
        graph.set_texture(SOURCE_NODE, Some(source));

        let enabled = Self::enabled_from_graph(&graph);
        let gbuffer = GBuffer::new(backend, width, height, false);

        let mut compositor = Self {
            source_texture: Some(source),
            depth_texture: Some(depth),
            framebuffer: Some(framebuffer),
            size: (width, height),
            graph,
            chain,
            gbuffer,
            ssao: SsaoPass::new((width, height)),
            ssr: SsrPass::new((width, height)),
            edge: EdgePass::new((width, height)),
            dof: DofKernel::default(),
            enabled,
            lookup_texture: None,
            disposed: false,
        };
        compositor.set_dof_quality(Quality::default());

        log::debug!(
            "Effect compositor created: {} nodes, {width}x{height}, enabled {:?}",
            compositor.graph.len(),
            compositor.enabled
        );
        Ok(compositor)
    }

    /// Builds the compositor from the builtin effect description.
    pub fn with_builtin_effects<B: RenderBackend + ?Sized>(backend: &mut B) -> Result<Self> {
        Self::new(backend, &EffectDescription::builtin()?)
    }

    fn enabled_from_graph(graph: &RenderGraph) -> EnabledEffects {
        let mut enabled = EnabledEffects::empty();
        let bound_to = |slot: &str, producer: &str| {
            graph
                .node(COMPOSITE_NODE)
                .and_then(|node| node.input(slot))
                .is_some_and(|binding| *binding == InputBinding::from(producer))
        };
        enabled.set(EnabledEffects::FXAA, graph.contains(FXAA_NODE));
        enabled.set(EnabledEffects::BLOOM, bound_to("bloom", BLOOM_NODE));
        enabled.set(EnabledEffects::DEPTH_OF_FIELD, bound_to("texture", DOF_NODE));
        enabled.set(
            EnabledEffects::COLOR_CORRECTION,
            graph
                .node(COMPOSITE_NODE)
                .is_some_and(|node| node.defines().contains(COLOR_CORRECTION_DEFINE)),
        );
        enabled
    }

    // ========================================================================
    // Enable / Disable
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn is_enabled(&self, effect: Effect) -> bool {
        self.enabled.contains(effect.flag())
    }

    #[inline]
    #[must_use]
    pub fn enabled(&self) -> EnabledEffects {
        self.enabled
    }

    pub fn enable(&mut self, effect: Effect) {
        self.set_enabled(effect, true);
    }

    pub fn disable(&mut self, effect: Effect) {
        self.set_enabled(effect, false);
    }

    /// Turns an effect on or off. Repeating the current state is a no-op.
    pub fn set_enabled(&mut self, effect: Effect, on: bool) {
        if self.is_enabled(effect) == on {
            return;
        }
        match effect {
            Effect::Fxaa => {
                let spliced = if on {
                    self.chain
                        .insert(&mut self.graph, FXAA_NODE)
                        .unwrap_or_else(|err| {
                            log::warn!("Failed to splice `{FXAA_NODE}`: {err}");
                            false
                        })
                } else {
                    self.chain.remove(&mut self.graph, FXAA_NODE)
                };
                if !spliced {
                    log::warn!("FXAA {} had no effect", if on { "enable" } else { "disable" });
                }
                self.enabled
                    .set(EnabledEffects::FXAA, self.graph.contains(FXAA_NODE));
                return;
            }
            Effect::Bloom => {
                let binding = on.then(|| InputBinding::from(BLOOM_NODE));
                self.graph.set_input(COMPOSITE_NODE, "bloom", binding);
            }
            Effect::DepthOfField => {
                let producer = if on { DOF_NODE } else { SOURCE_NODE };
                self.graph
                    .set_input(COMPOSITE_NODE, "texture", Some(InputBinding::from(producer)));
            }
            Effect::ColorCorrection => {
                if on {
                    self.graph
                        .set_define(COMPOSITE_NODE, COLOR_CORRECTION_DEFINE, "");
                } else {
                    self.graph
                        .remove_define(COMPOSITE_NODE, COLOR_CORRECTION_DEFINE);
                }
            }
            Effect::Ssao | Effect::Ssr | Effect::Edge => {}
        }
        self.enabled.set(effect.flag(), on);
        if effect == Effect::ColorCorrection {
            self.bind_lookup_texture();
        }
        log::debug!("{effect:?} {}", if on { "enabled" } else { "disabled" });
    }

    /// The lookup texture is bound only while color correction is enabled.
    fn bind_lookup_texture(&mut self) {
        let binding = self
            .lookup_texture
            .filter(|_| self.is_enabled(Effect::ColorCorrection))
            .map(InputBinding::Texture);
        self.graph.set_input(COMPOSITE_NODE, LUT_SLOT, binding);
    }

    /// `true` when any effect reads the G-buffer.
    #[inline]
    #[must_use]
    pub fn needs_normal_pass(&self) -> bool {
        self.enabled.intersects(EnabledEffects::NORMAL_PASS)
    }

    /// `true` when an enabled effect refines over several frames.
    #[inline]
    #[must_use]
    pub fn needs_accumulation(&self) -> bool {
        self.enabled.intersects(EnabledEffects::TEMPORAL)
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    pub fn set_bloom_intensity(&mut self, value: Option<f32>) {
        let Some(value) = value else { return };
        self.graph.set_parameter(COMPOSITE_NODE, "bloomIntensity", value);
    }

    /// SSAO parameters: `quality`, `radius`, `intensity`.
    pub fn set_ssao_parameter(&mut self, name: &str, value: Option<EffectValue>) {
        let Some(value) = value else { return };
        match name {
            "quality" => {
                if let Some(quality) = expect_quality("SSAO", &value) {
                    self.ssao.set_kernel_size(quality.ssao_kernel_size());
                }
            }
            "radius" => {
                if let Some(radius) = expect_number("SSAO", name, &value) {
                    self.ssao.set_radius(radius);
                }
            }
            "intensity" => {
                if let Some(intensity) = expect_number("SSAO", name, &value) {
                    self.ssao.set_intensity(intensity);
                }
            }
            _ => log::warn!("Unknown SSAO parameter `{name}`"),
        }
    }

    /// DOF parameters: `focalDistance`, `focalRange`, `fstop`, `blurRadius`,
    /// `quality`.
    pub fn set_dof_parameter(&mut self, name: &str, value: Option<EffectValue>) {
        let Some(value) = value else { return };
        match name {
            "focalDistance" | "focalRange" | "fstop" => {
                if let Some(v) = expect_number("DOF", name, &value) {
                    self.graph.set_parameter(COC_NODE, name, v);
                }
            }
            "blurRadius" => {
                if let Some(v) = expect_number("DOF", name, &value) {
                    for node in DOF_BLUR_NODES {
                        self.graph.set_parameter(node, "blurRadius", v);
                    }
                }
            }
            "quality" => {
                if let Some(quality) = expect_quality("DOF", &value) {
                    self.set_dof_quality(quality);
                }
            }
            _ => log::warn!("Unknown DOF parameter `{name}`"),
        }
    }

    fn set_dof_quality(&mut self, quality: Quality) {
        self.dof.set_quality(quality);
        let size = self.dof.kernel_size().to_string();
        for node in DOF_BLUR_NODES {
            self.graph.set_define(node, "POISSON_KERNEL_SIZE", size.as_str());
        }
    }

    /// SSR parameters: `quality`, `maxRoughness`.
    pub fn set_ssr_parameter(&mut self, name: &str, value: Option<EffectValue>) {
        let Some(value) = value else { return };
        match name {
            "quality" => {
                if let Some(quality) = expect_quality("SSR", &value) {
                    self.ssr.set_quality(quality);
                }
            }
            "maxRoughness" => {
                if let Some(v) = expect_number("SSR", name, &value) {
                    self.ssr.set_max_roughness(v);
                }
            }
            _ => log::warn!("Unknown SSR parameter `{name}`"),
        }
    }

    pub fn set_edge_color(&mut self, color: Option<Vec3>) {
        let Some(color) = color else { return };
        self.edge.set_edge_color(color);
    }

    /// Exposure in stops; the composite pass receives `2^value`.
    pub fn set_exposure(&mut self, value: Option<f32>) {
        let Some(value) = value else { return };
        self.graph
            .set_parameter(COMPOSITE_NODE, "exposure", value.exp2());
    }

    /// Sets (or clears) the color grading lookup texture.
    pub fn set_color_lookup_texture(&mut self, texture: Option<TextureHandle>) {
        self.lookup_texture = texture;
        self.bind_lookup_texture();
    }

    /// Color grading: `brightness`, `contrast`, `saturation`.
    pub fn set_color_correction(&mut self, name: &str, value: Option<f32>) {
        let Some(value) = value else { return };
        match name {
            "brightness" | "contrast" | "saturation" => {
                self.graph.set_parameter(COMPOSITE_NODE, name, value);
            }
            "exposure" => self.set_exposure(Some(value)),
            _ => log::warn!("Unknown color correction parameter `{name}`"),
        }
    }

    /// Applies a complete post-effect configuration.
    pub fn apply_settings(&mut self, settings: &PostEffectSettings) {
        let on = settings.enable;

        let bloom = &settings.bloom;
        self.set_enabled(Effect::Bloom, on && bloom.enable);
        self.set_bloom_intensity(bloom.intensity);

        let dof = &settings.depth_of_field;
        self.set_enabled(Effect::DepthOfField, on && dof.enable);
        for (name, value) in [
            ("focalDistance", dof.focal_distance),
            ("focalRange", dof.focal_range),
            ("fstop", dof.fstop),
            ("blurRadius", dof.blur_radius),
        ] {
            self.set_dof_parameter(name, value.map(EffectValue::Number));
        }
        self.set_dof_parameter("quality", dof.quality.map(EffectValue::from));

        let ssao = &settings.screen_space_ambient_occlusion;
        self.set_enabled(Effect::Ssao, on && ssao.enable);
        self.set_ssao_parameter("radius", ssao.radius.map(EffectValue::Number));
        self.set_ssao_parameter("intensity", ssao.intensity.map(EffectValue::Number));
        self.set_ssao_parameter("quality", ssao.quality.map(EffectValue::from));

        let ssr = &settings.screen_space_reflection;
        self.set_enabled(Effect::Ssr, on && ssr.enable);
        self.set_ssr_parameter("quality", ssr.quality.map(EffectValue::from));
        self.set_ssr_parameter("maxRoughness", ssr.max_roughness.map(EffectValue::Number));

        let cc = &settings.color_correction;
        self.set_enabled(Effect::ColorCorrection, on && cc.enable);
        self.set_exposure(cc.exposure);
        self.set_color_correction("brightness", cc.brightness);
        self.set_color_correction("contrast", cc.contrast);
        self.set_color_correction("saturation", cc.saturation);
        if cc.lookup_texture.is_some() {
            self.set_color_lookup_texture(cc.lookup_texture);
        }

        self.set_enabled(Effect::Edge, on && settings.edge.enable);
        self.set_edge_color(settings.edge.color.map(Vec3::from_array));

        self.set_enabled(Effect::Fxaa, on && settings.fxaa.enable);
    }

    // ========================================================================
    // Per-Frame
    // ========================================================================

    /// Renders the G-buffer for `frame` if any effect needs it.
    ///
    /// Returns whether a scene draw was issued. Calls between two composites
    /// with the same frame and camera share one draw.
    pub fn update_normal<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        camera: &RenderCamera,
        frame: u64,
    ) -> bool {
        if self.disposed || !self.needs_normal_pass() {
            return false;
        }
        self.gbuffer.update(backend, camera, frame)
    }

    /// Renders SSAO ahead of the scene pass that consumes it.
    ///
    /// Returns the AO texture, or `None` while SSAO is disabled.
    pub fn update_ssao<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        camera: &RenderCamera,
        frame: u64,
    ) -> Option<TextureHandle> {
        if self.disposed || !self.is_enabled(Effect::Ssao) {
            return None;
        }
        self.update_normal(backend, camera, frame);
        self.ssao.update(backend, camera, &self.gbuffer, frame)
    }

    /// Runs the post-processing pipeline for one frame into `target`.
    pub fn composite<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        camera: &RenderCamera,
        target: RenderTarget,
        frame: u64,
    ) -> Result<()> {
        if self.disposed {
            return Err(ClayError::Disposed);
        }
        let (Some(scene_color), Some(scene_depth)) = (self.source_texture, self.depth_texture)
        else {
            return Err(ClayError::Disposed);
        };

        self.update_normal(backend, camera, frame);

        let mut source = scene_color;
        let mut target_texture = scene_color;
        if self.is_enabled(Effect::Edge)
            && let Some(edge) = self
                .edge
                .update(backend, camera, &self.gbuffer, source, frame)
        {
            source = edge;
            target_texture = edge;
        }
        if self.is_enabled(Effect::Ssr)
            && let Some(reflected) = self
                .ssr
                .update(backend, camera, &self.gbuffer, source, frame)
        {
            target_texture = reflected;
        }
        self.graph.set_texture(SOURCE_NODE, Some(target_texture));
        self.graph.set_parameter(COC_NODE, "depth", scene_depth);

        self.update_dof(frame);
        self.graph.set_parameter(COC_NODE, "zNear", camera.near);
        self.graph.set_parameter(COC_NODE, "zFar", camera.far);

        let result = self.graph.render(backend, target);
        // The next frame may reuse this frame number after a restart.
        self.gbuffer.invalidate();
        result
    }

    fn update_dof(&mut self, frame: u64) {
        self.dof.update(frame);
        let kernel = self.dof.kernel();
        let percent = self.dof.percent();
        for node in DOF_BLUR_NODES {
            self.graph.set_parameter(node, "poissonKernel", kernel);
            self.graph.set_parameter(node, "percent", percent);
        }
    }

    // ========================================================================
    // Resize & Teardown
    // ========================================================================

    /// Resizes every owned target to `(width × dpr, height × dpr)`.
    ///
    /// Graph targets follow the same size from the next composite on,
    /// whatever the backend's own viewport reports.
    pub fn resize<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
    ) {
        let (w, h) = physical_extent(width, height, device_pixel_ratio);
        self.size = (w, h);
        for texture in [self.source_texture, self.depth_texture].into_iter().flatten() {
            backend.resize_texture(texture, w, h);
        }
        self.gbuffer.resize(backend, w, h);
        self.ssao.resize(backend, w, h);
        self.ssr.resize(backend, w, h);
        self.edge.resize(backend, w, h);
        self.graph
            .set_viewport(Some(Viewport::new(width, height, device_pixel_ratio)));
        log::debug!("Effect compositor resized to {w}x{h}");
    }

    /// Releases every GPU resource, in order: owned textures, framebuffer,
    /// graph, G-buffer, SSAO, SSR, edge. Calling it again does nothing.
    pub fn dispose<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.disposed {
            return;
        }
        for texture in [self.source_texture.take(), self.depth_texture.take()]
            .into_iter()
            .flatten()
        {
            backend.release_texture(texture);
        }
        if let Some(framebuffer) = self.framebuffer.take() {
            backend.release_framebuffer(framebuffer);
        }
        self.graph.dispose(backend);
        self.gbuffer.dispose(backend);
        self.ssao.dispose(backend);
        self.ssr.dispose(backend);
        self.edge.dispose(backend);
        self.disposed = true;
        log::debug!("Effect compositor disposed");
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Framebuffer the scene should be rendered into.
    #[inline]
    #[must_use]
    pub fn source_framebuffer(&self) -> Option<FramebufferHandle> {
        self.framebuffer
    }

    #[inline]
    #[must_use]
    pub fn source_texture(&self) -> Option<TextureHandle> {
        self.source_texture
    }

    #[inline]
    #[must_use]
    pub fn depth_texture(&self) -> Option<TextureHandle> {
        self.depth_texture
    }

    #[inline]
    #[must_use]
    pub fn ssao_texture(&self) -> Option<TextureHandle> {
        self.ssao.texture()
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[inline]
    #[must_use]
    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    #[inline]
    #[must_use]
    pub fn chain(&self) -> &TerminalChain {
        &self.chain
    }

    #[inline]
    #[must_use]
    pub fn gbuffer(&self) -> &GBuffer {
        &self.gbuffer
    }

    #[inline]
    #[must_use]
    pub fn ssao(&self) -> &SsaoPass {
        &self.ssao
    }

    #[inline]
    #[must_use]
    pub fn ssr(&self) -> &SsrPass {
        &self.ssr
    }

    #[inline]
    #[must_use]
    pub fn edge(&self) -> &EdgePass {
        &self.edge
    }

    #[inline]
    #[must_use]
    pub fn dof_kernel(&self) -> &DofKernel {
        &self.dof
    }

    #[inline]
    #[must_use]
    pub fn lookup_texture(&self) -> Option<TextureHandle> {
        self.lookup_texture
    }
}

macro_rules! effect_toggles {
    ($($effect:ident => $enable:ident, $disable:ident;)*) => {
        impl EffectCompositor {
            $(
                #[doc = concat!("Enables [`Effect::", stringify!($effect), "`].")]
                pub fn $enable(&mut self) {
                    self.enable(Effect::$effect);
                }

                #[doc = concat!("Disables [`Effect::", stringify!($effect), "`].")]
                pub fn $disable(&mut self) {
                    self.disable(Effect::$effect);
                }
            )*
        }
    };
}

effect_toggles! {
    Bloom => enable_bloom, disable_bloom;
    DepthOfField => enable_dof, disable_dof;
    Ssao => enable_ssao, disable_ssao;
    Ssr => enable_ssr, disable_ssr;
    Edge => enable_edge, disable_edge;
    Fxaa => enable_fxaa, disable_fxaa;
    ColorCorrection => enable_color_correction, disable_color_correction;
}

fn expect_number(effect: &str, name: &str, value: &EffectValue) -> Option<f32> {
    let number = value.as_number();
    if number.is_none() {
        log::warn!("{effect} parameter `{name}` expects a number, got {value:?}");
    }
    number
}

fn expect_quality(effect: &str, value: &EffectValue) -> Option<Quality> {
    match value.as_text() {
        Some(name) => Some(Quality::from_name_or_default(name)),
        None => {
            log::warn!("{effect} quality expects a tier name, got {value:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::HeadlessBackend;

    fn setup() -> (HeadlessBackend, EffectCompositor) {
        let mut backend = HeadlessBackend::new(Viewport::new(64, 32, 1.0));
        let compositor = EffectCompositor::with_builtin_effects(&mut backend).unwrap();
        (backend, compositor)
    }

    #[test]
    fn builtin_starts_with_fxaa_only() {
        let (_, compositor) = setup();
        assert_eq!(compositor.enabled(), EnabledEffects::FXAA);
        assert!(!compositor.needs_normal_pass());
        assert!(!compositor.needs_accumulation());
    }

    #[test]
    fn exposure_is_stored_in_stops() {
        let (_, mut compositor) = setup();
        compositor.set_exposure(Some(2.0));
        let exposure = compositor
            .graph()
            .node(COMPOSITE_NODE)
            .and_then(|n| n.parameter("exposure"))
            .and_then(|p| p.as_float());
        assert_eq!(exposure, Some(4.0));

        compositor.set_exposure(None);
        let unchanged = compositor
            .graph()
            .node(COMPOSITE_NODE)
            .and_then(|n| n.parameter("exposure"))
            .and_then(|p| p.as_float());
        assert_eq!(unchanged, Some(4.0));
    }

    #[test]
    fn lookup_texture_bound_only_with_color_correction() {
        let (_, mut compositor) = setup();
        let lut = TextureHandle::from_raw(9000);
        compositor.set_color_lookup_texture(Some(lut));
        let composite = |c: &EffectCompositor| c.graph().node(COMPOSITE_NODE).unwrap().clone();
        assert_eq!(composite(&compositor).input(LUT_SLOT), None);

        compositor.enable_color_correction();
        assert_eq!(
            composite(&compositor).input(LUT_SLOT),
            Some(&InputBinding::Texture(lut))
        );
        assert!(composite(&compositor).defines().contains(COLOR_CORRECTION_DEFINE));

        compositor.disable_color_correction();
        assert_eq!(composite(&compositor).input(LUT_SLOT), None);
        assert!(!composite(&compositor).defines().contains(COLOR_CORRECTION_DEFINE));
    }
}
