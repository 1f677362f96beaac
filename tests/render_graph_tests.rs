//! Render Graph tests
//!
//! Tests for:
//! - Stable topological scheduling and lazy rescheduling
//! - Name-based edges: unresolved names, removed producers
//! - Terminal/offscreen target routing and input binding
//! - Target lifecycle: creation, resize, recreation, release, dispose
//! - Authoring errors: duplicates, cycles, missing terminal

use clay::errors::ClayError;
use clay::renderer::backend::{RenderTarget, TextureHandle, Viewport};
use clay::renderer::graph::{
    EffectDescription, InputBinding, OutputSpec, PassNode, PixelFormat, RenderGraph, Resolution,
};
use clay::renderer::headless::{HeadlessBackend, Release};

// ============================================================================
// Helpers
// ============================================================================

const SCENE: TextureHandle = TextureHandle::from_raw(10_000);
const LINK: OutputSpec = OutputSpec::viewport(PixelFormat::Rgba8Unorm);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn backend() -> HeadlessBackend {
    HeadlessBackend::new(Viewport::new(320, 240, 1.0))
}

fn source_graph() -> RenderGraph {
    let mut graph = RenderGraph::new();
    graph.add_node(PassNode::texture("source")).unwrap();
    graph.set_texture("source", Some(SCENE));
    graph
}

fn intermediate(name: &str, inputs: &[(&str, &str)]) -> PassNode {
    inputs
        .iter()
        .fold(PassNode::filter(name, "blit"), |node, (slot, producer)| {
            node.with_input(slot, *producer)
        })
        .with_outputs(LINK)
}

// ============================================================================
// Scheduling
// ============================================================================

#[test]
fn order_is_topological_with_insertion_tie_break() {
    let mut graph = source_graph();
    graph.add_node(intermediate("b", &[("texture", "source")])).unwrap();
    graph.add_node(intermediate("a", &[("texture", "source")])).unwrap();
    graph
        .add_node(
            PassNode::filter("final", "blend")
                .with_input("texture1", "a")
                .with_input("texture2", "b")
                .with_input("texture3", "c"),
        )
        .unwrap();
    graph.add_node(intermediate("c", &[("texture", "source")])).unwrap();

    assert_eq!(
        graph.execution_order().unwrap(),
        ["source", "b", "a", "c", "final"]
    );
}

#[test]
fn only_nodes_upstream_of_terminal_execute() {
    init_logger();
    let mut graph = source_graph();
    graph.add_node(intermediate("orphan", &[("texture", "source")])).unwrap();
    graph
        .add_node(PassNode::filter("out", "fxaa").with_input("texture", "source"))
        .unwrap();

    let mut backend = backend();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();

    assert_eq!(backend.pass_names(), ["out"]);
    assert_eq!(graph.output_size("orphan"), None);
}

#[test]
fn schedule_is_cached_until_dirtied() {
    let mut graph = source_graph();
    graph
        .add_node(PassNode::filter("out", "fxaa").with_input("texture", "source"))
        .unwrap();
    assert!(graph.is_dirty());
    graph.execution_order().unwrap();
    assert!(!graph.is_dirty());

    // Parameters do not affect topology.
    graph.set_parameter("out", "exposure", 2.0_f32);
    assert!(!graph.is_dirty());

    graph.set_input("out", "bloom", None);
    assert!(graph.is_dirty());
    graph.execution_order().unwrap();
    graph.dirty();
    assert!(graph.is_dirty());
}

#[test]
fn repeated_renders_issue_identical_streams() {
    let mut graph = source_graph();
    graph.add_node(intermediate("a", &[("texture", "source")])).unwrap();
    graph
        .add_node(PassNode::filter("out", "fxaa").with_input("texture", "a"))
        .unwrap();

    let mut backend = backend();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    let first: Vec<_> = backend
        .passes()
        .iter()
        .map(|p| (p.node.clone(), p.inputs.clone(), p.target))
        .collect();
    backend.clear_frame();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    let second: Vec<_> = backend
        .passes()
        .iter()
        .map(|p| (p.node.clone(), p.inputs.clone(), p.target))
        .collect();

    assert_eq!(first, second);
}

// ============================================================================
// Resolution & Binding
// ============================================================================

#[test]
fn unresolved_inputs_are_skipped() {
    init_logger();
    let mut graph = source_graph();
    graph
        .add_node(
            PassNode::filter("out", "composite")
                .with_input("texture", "source")
                .with_input("bloom", "bloom_composite"),
        )
        .unwrap();

    assert_eq!(
        graph.resolve_input("out", "bloom"),
        Some(Resolution::Unresolved)
    );
    assert_eq!(
        graph.resolve(&InputBinding::Texture(SCENE)),
        Resolution::External(SCENE)
    );

    let mut backend = backend();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    let pass = backend.pass("out").unwrap();
    assert_eq!(pass.input("texture"), Some(SCENE));
    assert_eq!(pass.input("bloom"), None);
}

#[test]
fn consumers_read_producer_targets() {
    let mut graph = source_graph();
    graph.add_node(intermediate("a", &[("texture", "source")])).unwrap();
    let lut = TextureHandle::from_raw(20_000);
    graph
        .add_node(
            PassNode::filter("out", "fxaa")
                .with_input("texture", "a")
                .with_input("lut", lut),
        )
        .unwrap();

    let mut backend = backend();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();

    let a_target = graph.output_texture("a").unwrap();
    assert_eq!(backend.pass("a").unwrap().target, RenderTarget::Texture(a_target));
    assert_eq!(backend.pass("a").unwrap().input("texture"), Some(SCENE));

    let out = backend.pass("out").unwrap();
    assert_eq!(out.target, RenderTarget::Screen);
    assert_eq!(out.input("texture"), Some(a_target));
    assert_eq!(out.input("lut"), Some(lut));
    assert_eq!((out.width, out.height), (320, 240));
}

#[test]
fn removed_producer_stops_resolving_and_is_released() {
    let mut graph = source_graph();
    graph.add_node(intermediate("a", &[("texture", "source")])).unwrap();
    graph
        .add_node(PassNode::filter("out", "fxaa").with_input("texture", "a"))
        .unwrap();

    let mut backend = backend();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    let a_target = graph.output_texture("a").unwrap();

    let removed = graph.remove_node("a").unwrap();
    assert_eq!(removed.name(), "a");
    assert!(graph.remove_node("a").is_none());
    assert_eq!(
        graph.node("out").unwrap().input("texture"),
        Some(&InputBinding::Node("a".into()))
    );

    backend.clear_frame();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    assert!(backend.releases().contains(&Release::Texture(a_target)));
    assert_eq!(backend.pass("out").unwrap().input("texture"), None);
    assert!(backend.invalid_releases().is_empty());
}

// ============================================================================
// Targets
// ============================================================================

#[test]
fn targets_follow_output_spec_and_viewport() {
    let mut graph = source_graph();
    graph
        .add_node(
            PassNode::filter("half", "downsample")
                .with_input("texture", "source")
                .with_outputs(OutputSpec::scaled(0.5, PixelFormat::Rgba16Float)),
        )
        .unwrap();
    graph
        .add_node(PassNode::filter("out", "fxaa").with_input("texture", "half"))
        .unwrap();

    let mut backend = HeadlessBackend::new(Viewport::new(320, 240, 2.0));
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    let half = graph.output_texture("half").unwrap();
    assert_eq!(graph.output_size("half"), Some((320, 240)));
    assert_eq!(
        backend.texture(half).unwrap().format,
        wgpu::TextureFormat::Rgba16Float
    );

    // Resized in place on viewport change.
    backend.set_viewport(Viewport::new(100, 50, 1.0));
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    assert_eq!(graph.output_texture("half"), Some(half));
    assert_eq!(graph.output_size("half"), Some((50, 25)));
    let desc = backend.texture(half).unwrap();
    assert_eq!((desc.width, desc.height), (50, 25));

    // Recreated on format change.
    graph.set_outputs("half", Some(OutputSpec::scaled(0.5, PixelFormat::Rgba8Unorm)));
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    let recreated = graph.output_texture("half").unwrap();
    assert_ne!(recreated, half);
    assert!(backend.releases().contains(&Release::Texture(half)));
}

#[test]
fn viewport_override_sizes_targets_until_cleared() {
    let mut graph = source_graph();
    graph
        .add_node(
            PassNode::filter("half", "downsample")
                .with_input("texture", "source")
                .with_outputs(OutputSpec::scaled(0.5, PixelFormat::Rgba16Float)),
        )
        .unwrap();
    graph
        .add_node(PassNode::filter("out", "fxaa").with_input("texture", "half"))
        .unwrap();

    let mut backend = HeadlessBackend::new(Viewport::new(320, 240, 1.0));
    graph.set_viewport(Some(Viewport::new(100, 50, 2.0)));
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    assert_eq!(graph.output_size("half"), Some((100, 50)));
    assert_eq!(backend.pass("out").unwrap().width, 200);

    graph.set_viewport(None);
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    assert_eq!(graph.output_size("half"), Some((160, 120)));
}

#[test]
fn becoming_terminal_releases_target() {
    let mut graph = source_graph();
    graph.add_node(intermediate("composite", &[("texture", "source")])).unwrap();
    graph
        .add_node(PassNode::filter("FXAA", "fxaa").with_input("texture", "composite"))
        .unwrap();

    let mut backend = backend();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    let target = graph.output_texture("composite").unwrap();

    graph.remove_node("FXAA");
    graph.set_outputs("composite", None);
    assert_eq!(graph.terminals(), ["composite"]);

    backend.clear_frame();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    assert_eq!(backend.pass("composite").unwrap().target, RenderTarget::Screen);
    assert!(backend.releases().contains(&Release::Texture(target)));
}

#[test]
fn dispose_is_idempotent() {
    let mut graph = source_graph();
    graph.add_node(intermediate("a", &[("texture", "source")])).unwrap();
    graph.add_node(intermediate("b", &[("texture", "a")])).unwrap();
    graph
        .add_node(PassNode::filter("out", "fxaa").with_input("texture", "b"))
        .unwrap();

    let mut backend = backend();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();
    assert_eq!(backend.live_textures(), 2);

    graph.dispose(&mut backend);
    graph.dispose(&mut backend);

    assert_eq!(backend.live_textures(), 0);
    assert!(backend.invalid_releases().is_empty());
    let programs = backend
        .releases()
        .iter()
        .filter(|r| matches!(r, Release::Program(_)))
        .count();
    assert_eq!(programs, 2, "blit and fxaa released once each");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn duplicate_names_are_rejected() {
    let mut graph = source_graph();
    let err = graph.add_node(PassNode::texture("source")).unwrap_err();
    assert!(matches!(err, ClayError::DuplicateName(name) if name == "source"));
    assert_eq!(graph.len(), 1);
}

#[test]
fn cycles_are_reported() {
    let mut graph = source_graph();
    graph.add_node(intermediate("a", &[("texture", "b")])).unwrap();
    graph.add_node(intermediate("b", &[("texture", "a")])).unwrap();
    graph
        .add_node(PassNode::filter("out", "fxaa").with_input("texture", "a"))
        .unwrap();

    let mut backend = backend();
    let err = graph.render(&mut backend, RenderTarget::Screen).unwrap_err();
    assert!(matches!(err, ClayError::CyclicGraph(_)));
    assert!(backend.passes().is_empty());
}

#[test]
fn graph_without_terminal_is_rejected() {
    let mut graph = source_graph();
    graph.add_node(intermediate("a", &[("texture", "source")])).unwrap();
    assert!(matches!(
        graph.execution_order(),
        Err(ClayError::MissingTerminal)
    ));
}

#[test]
fn missing_lookups_are_not_errors() {
    let mut graph = source_graph();
    assert!(graph.node("nope").is_none());
    assert!(!graph.set_input("nope", "texture", None));
    assert!(!graph.set_parameter("nope", "x", 1.0_f32));
    assert!(!graph.set_texture("nope", None));
    assert_eq!(graph.resolve_input("source", "texture"), None);
}

// ============================================================================
// Description
// ============================================================================

#[test]
fn custom_description_builds_runnable_graph() {
    let description = EffectDescription::from_json(
        r#"{
            "nodes": [
                { "name": "source" },
                {
                    "name": "grade",
                    "shader": "composite",
                    "inputs": { "texture": "source", "bloom": null },
                    "outputs": { "width": 128, "height": { "scale": 0.5 } },
                    "parameters": { "exposure": 1.0, "tint": [1.0, 0.9, 0.8] },
                    "defines": { "TONEMAPPING": true, "QUALITY": 2 }
                },
                { "name": "out", "shader": "fxaa", "inputs": { "texture": "grade" } }
            ]
        }"#,
    )
    .unwrap();
    let mut graph = description.build().unwrap();
    graph.set_texture("source", Some(SCENE));

    let mut backend = backend();
    graph.render(&mut backend, RenderTarget::Screen).unwrap();

    assert_eq!(graph.output_size("grade"), Some((128, 120)));
    let grade = backend.pass("grade").unwrap();
    assert_eq!(grade.defines.get("TONEMAPPING"), Some(""));
    assert_eq!(grade.defines.get("QUALITY"), Some("2"));
    assert_eq!(
        grade.parameters.get("tint").and_then(|p| p.as_vec3()),
        Some(glam::Vec3::new(1.0, 0.9, 0.8))
    );
}

#[test]
fn malformed_description_is_a_json_error() {
    let err = EffectDescription::from_json(r#"{ "nodes": [ { "shader": "x" } ] }"#).unwrap_err();
    assert!(matches!(err, ClayError::JsonError(_)));
}
