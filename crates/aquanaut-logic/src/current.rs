//! Procedural ambient current in the pool.
//!
//! Direction comes from a low-frequency value-noise field, speed from a
//! base value plus a slow sinusoidal gust. A second noise sample adds a
//! small swirl perpendicular to the main flow. Near the pool walls the
//! current fades with a smoothstep falloff, but never below 8%.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::collision::HorizontalBounds;
use crate::config::CurrentConfig;
use crate::noise::{seeded_value_noise_2d, smoothstep, value_noise_2d};

/// Fraction of the current that survives right at a wall.
pub const MIN_WALL_FACTOR: f32 = 0.08;

/// Noise seed of the swirl field, distinct from the direction field.
pub const SWIRL_SEED: f32 = 7.0;

/// Current velocity (X, Z) at world position `pos` and time `t`.
pub fn current_at(
    config: &CurrentConfig,
    pos: Vec2,
    t: f32,
    bounds: Option<&HorizontalBounds>,
) -> Vec2 {
    let ns = config.noise_scale;
    let speed = config.base + config.gust * (TAU * config.freq * t + 1.3).sin();
    let angle = value_noise_2d(pos.x * ns, pos.y * ns) * TAU;
    let dir = Vec2::new(angle.cos(), angle.sin());

    let wall = match bounds {
        Some(b) => {
            let d = b.wall_distance(pos.x, pos.y);
            smoothstep(0.0, config.wall_dampen_dist, d).max(MIN_WALL_FACTOR)
        }
        None => 1.0,
    };

    let swirl =
        config.swirl * (seeded_value_noise_2d(pos.x * ns * 0.7, pos.y * ns * 0.7, SWIRL_SEED) - 0.5);

    // dir.perp() is (-dir.y, dir.x): the swirl runs at right angles to the flow.
    (dir * speed + dir.perp() * swirl) * wall
}
