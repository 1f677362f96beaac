//! Precomputed Poisson-disk sequence for the DOF blur.
//!
//! 1024 points in the unit disk, generated once with a fixed seed by
//! best-candidate sampling in independent blocks of 32 points. Each block is
//! well distributed on its own, so consecutive windows of up to 32 points
//! make usable blur kernels and successive windows jitter the kernel from
//! frame to frame.

use std::f32::consts::TAU;
use std::sync::OnceLock;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

pub const POISSON_POINT_COUNT: usize = 1024;

const BLOCK_SIZE: usize = 32;
const CANDIDATES: usize = 24;
const SEED: u64 = 0x0d0f_5eed;

static SEQUENCE: OnceLock<Vec<Vec2>> = OnceLock::new();

/// The sequence as points.
#[must_use]
pub fn poisson_points() -> &'static [Vec2] {
    SEQUENCE.get_or_init(generate)
}

/// The sequence as interleaved `x, y` floats (`2 × POISSON_POINT_COUNT`).
#[must_use]
pub fn poisson_kernel() -> &'static [f32] {
    bytemuck::cast_slice(poisson_points())
}

fn generate() -> Vec<Vec2> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut points: Vec<Vec2> = Vec::with_capacity(POISSON_POINT_COUNT);

    for _ in 0..POISSON_POINT_COUNT / BLOCK_SIZE {
        let block_start = points.len();
        for _ in 0..BLOCK_SIZE {
            let candidates: Vec<Vec2> = (0..CANDIDATES).map(|_| point_in_disk(&mut rng)).collect();
            let block = &points[block_start..];
            let best = candidates
                .into_iter()
                .map(|c| (c, nearest_distance(block, c)))
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map_or(Vec2::ZERO, |(c, _)| c);
            points.push(best);
        }
    }
    points
}

fn point_in_disk(rng: &mut StdRng) -> Vec2 {
    let r = rng.random_range(0.0..1.0f32).sqrt();
    let theta = rng.random_range(0.0..TAU);
    Vec2::new(r * theta.cos(), r * theta.sin())
}

fn nearest_distance(points: &[Vec2], candidate: Vec2) -> f32 {
    points
        .iter()
        .map(|p| p.distance_squared(candidate))
        .fold(f32::INFINITY, f32::min)
}
