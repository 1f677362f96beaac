//! Render graph benchmarks
//!
//! Measures the CPU side of a frame against the recording backend:
//! scheduling, target bookkeeping and per-pass command assembly.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use clay::renderer::backend::RenderBackend;
use clay::{Effect, EffectCompositor, HeadlessBackend, RenderCamera, RenderTarget, Viewport};

fn compositor_with(effects: &[Effect]) -> (HeadlessBackend, EffectCompositor) {
    let mut backend = HeadlessBackend::new(Viewport::new(1280, 720, 2.0));
    let mut compositor = EffectCompositor::with_builtin_effects(&mut backend)
        .expect("builtin effects must build");
    for effect in effects {
        compositor.enable(*effect);
    }
    (backend, compositor)
}

fn bench_composite(c: &mut Criterion) {
    let camera = RenderCamera::default();
    let mut group = c.benchmark_group("composite");

    for (name, effects) in [
        ("fxaa_only", &[][..]),
        ("bloom_dof", &[Effect::Bloom, Effect::DepthOfField][..]),
        ("all", &Effect::ALL[..]),
    ] {
        let (mut backend, mut compositor) = compositor_with(effects);
        let mut frame = 0_u64;
        group.bench_function(name, |b| {
            b.iter(|| {
                backend.clear_frame();
                compositor
                    .composite(&mut backend, &camera, RenderTarget::Screen, frame)
                    .expect("composite");
                frame += 1;
                black_box(backend.passes().len())
            });
        });
    }
    group.finish();
}

fn bench_reschedule(c: &mut Criterion) {
    let (mut backend, mut compositor) = compositor_with(&[Effect::Bloom]);
    let camera = RenderCamera::default();

    c.bench_function("toggle_dof_and_composite", |b| {
        let mut on = false;
        b.iter(|| {
            on = !on;
            compositor.set_enabled(Effect::DepthOfField, on);
            backend.clear_frame();
            compositor
                .composite(&mut backend, &camera, RenderTarget::Screen, 0)
                .expect("composite");
            black_box(backend.viewport())
        });
    });
}

criterion_group!(benches, bench_composite, bench_reschedule);
criterion_main!(benches);
