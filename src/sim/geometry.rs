//! Shape helpers for cave generation
//!
//! Obstacle outlines, floor surface sampling, envelope quantization and
//! debris shards. Vertices are offsets from the owning entity's center.

use std::f32::consts::TAU;

use glam::Vec2;

use super::random::RandomStream;
use crate::consts::ENVELOPE_RESOLUTION;

/// Fewest and most vertices of an obstacle outline
pub const MIN_VERTICES: i32 = 5;
pub const MAX_VERTICES: i32 = 10;

/// Half the angular spread of a shard (radians)
const SHARD_HALF_ANGLE: f32 = 0.1;

/// Unit vector for an angle measured from +y toward +x
///
/// Gameplay angles (ejection cones, fire directions) use this convention.
#[inline]
pub fn heading(theta: f32) -> Vec2 {
    Vec2::new(theta.sin(), theta.cos())
}

/// Generate a rough rock outline around the origin
///
/// Vertices sit on a regular polygon layout, each pulled in to 80-100% of
/// `radius` and skewed by up to a tenth of a turn.
pub fn boulder_outline(rng: &mut RandomStream, radius: f32) -> Vec<Vec2> {
    let count = rng.int_inclusive(MIN_VERTICES, MAX_VERTICES);
    (0..count)
        .map(|j| {
            let r = (rng.uniform() * 0.2 + 0.8) * radius;
            let skew = (rng.uniform() * 0.2 - 0.1) * TAU;
            let theta = TAU * j as f32 / count as f32 + skew;
            heading(theta) * r
        })
        .collect()
}

/// Closed-loop edges of a polygon (last vertex joins the first)
pub fn polygon_edges(vertices: &[Vec2]) -> impl Iterator<Item = [Vec2; 2]> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| [vertices[i], vertices[(i + 1) % n]])
}

/// Two-point shard fragment pointing along `theta`
pub fn shard(theta: f32, size: f32) -> [Vec2; 2] {
    let a = theta - SHARD_HALF_ANGLE;
    let b = theta + SHARD_HALF_ANGLE;
    [
        Vec2::new(a.cos(), a.sin()) * size,
        Vec2::new(b.cos(), b.sin()) * size,
    ]
}

/// Quantize an x coordinate to its envelope slot
#[inline]
pub fn envelope_slot(x: f32) -> i64 {
    (x / ENVELOPE_RESOLUTION).floor() as i64
}

/// World x of an envelope slot
#[inline]
pub fn slot_x(slot: i64) -> f32 {
    slot as f32 * ENVELOPE_RESOLUTION
}

/// Sample the upper surface of a floor rock across its width
///
/// Yields `(slot, y)` at every envelope step from `x - radius` up to (not
/// including) `x + radius`. The y is the circle's boundary facing the
/// cave interior, so smaller values reach further into the corridor.
pub fn surface_samples(center: Vec2, radius: f32) -> impl Iterator<Item = (i64, f32)> {
    let steps = (2.0 * radius / ENVELOPE_RESOLUTION).ceil() as usize;
    (0..steps).filter_map(move |i| {
        let lx = -radius + i as f32 * ENVELOPE_RESOLUTION;
        if lx >= radius {
            return None;
        }
        let c = lx / radius;
        let y = center.y - (1.0 - c * c).max(0.0).sqrt() * radius;
        Some((envelope_slot(center.x + lx), y))
    })
}
