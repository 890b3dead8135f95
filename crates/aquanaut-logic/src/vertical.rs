//! Vertical buoyancy integrator.
//!
//! Per tick:
//! 1. Depth below the water surface gives hydrostatic pressure
//! 2. Displaced volume = rigid shell + BC gas + lung gas, both gas terms
//!    compressed by Boyle's law (P_surface / P)
//! 3. Lung volume follows a breathing cycle whose rate drifts slowly; a
//!    random reserve draw keeps successive breaths from being identical
//! 4. Net force = buoyancy − weight − quadratic drag + micro-current + trim
//! 5. Near-neutral and nearly still: damp vy toward zero
//! 6. Integrate, then clamp to the head-height range; vy is zeroed at a bound

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::collision::VerticalBounds;
use crate::config::VerticalConfig;
use crate::horizontal::sanitize_dt;

/// Per-tick input to [`VerticalIntegrator::step_y`].
#[derive(Debug, Clone, Copy)]
pub struct VerticalInput {
    pub dt: f32,
    /// Current head height (world units).
    pub y: f32,
    /// Current vertical velocity (m/s).
    pub vy: f32,
    /// Signed ballast units; values below the floor count as the floor.
    pub ballast: i32,
    pub bounds: VerticalBounds,
    /// Horizontal speed, used to pick the breathing amplitude (m/s).
    pub speed_xz: f32,
    /// Elapsed simulation time (s).
    pub t: f32,
}

/// Result of one vertical step, with force diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerticalStep {
    pub new_y: f32,
    pub new_vy: f32,
    pub net_force: f32,
    pub buoyancy: f32,
    pub weight: f32,
    pub total_mass: f32,
    /// Depth below the surface (m).
    pub depth: f32,
    /// Absolute pressure at that depth (Pa).
    pub pressure: f32,
}

#[derive(Debug, Clone)]
pub struct VerticalIntegrator {
    config: VerticalConfig,
    rng: StdRng,
}

impl VerticalIntegrator {
    /// `seed` drives the lung-reserve draw; equal seeds replay identically.
    pub fn new(config: VerticalConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &VerticalConfig {
        &self.config
    }

    /// Depth in meters at head height `y`, capped at the pool depth.
    pub fn depth_at(&self, y: f32) -> f32 {
        let c = &self.config;
        ((c.water_surface_y - y).max(0.0) * c.meters_per_world_unit).min(c.pool_depth_m)
    }

    /// Displaced lung volume (m³) at time `t` before pressure scaling.
    fn lung_volume(&mut self, t: f32, speed_xz: f32) -> f32 {
        let c = &self.config;
        let freq = c.breath_hz * (1.0 + c.breath_var * ((0.13 * t).sin() - 0.5));
        let amp = if speed_xz < c.breath_moving_speed {
            c.breath_amplitude_neutral
        } else {
            c.breath_amplitude_moving
        };
        let tidal = c.lung_tidal_liters * 0.5 * (1.0 + (TAU * freq * t).sin());
        let draw: f32 = self.rng.gen();
        let reserve = c.lung_reserve_fraction * c.lung_reserve_liters * draw;
        (tidal + reserve) / 1000.0 * amp
    }

    pub fn step_y(&mut self, input: &VerticalInput) -> VerticalStep {
        let dt = sanitize_dt(input.dt);
        let y = if input.y.is_finite() { input.y } else { input.bounds.mid() };
        let vy = if input.vy.is_finite() { input.vy } else { 0.0 };
        let speed_xz = if input.speed_xz.is_finite() { input.speed_xz } else { 0.0 };

        let depth = self.depth_at(y);
        let lung = self.lung_volume(input.t, speed_xz);

        let c = &self.config;
        let pressure = c.p_surface + c.rho * c.g * depth;
        let boyle = c.p_surface / pressure;
        let total_mass = c.total_mass(input.ballast);

        let v_bc = c.bc_gas_liters_surface / 1000.0 * boyle;
        let v_lung = lung * boyle;
        let volume = c.rigid_volume + v_bc + v_lung;

        let buoyancy = c.rho * c.g * volume;
        let weight = total_mass * c.g;

        let m_eff = (total_mass + c.ca_vert * c.rho * c.rigid_volume).max(1e-6);
        let drag = 0.5 * c.rho * c.cd_vert * c.area_vert * vy.abs() * vy;
        let micro = c.micro_current_n * (0.7 * input.t).sin() * 0.2;

        let net_force = buoyancy - weight - drag + micro + c.neutral_trim_n;
        let mut new_vy = vy + net_force / m_eff * dt;

        let static_force = buoyancy - weight + c.neutral_trim_n;
        if new_vy.abs() < c.neutral_speed_eps && static_force.abs() < c.neutral_force_n {
            new_vy *= c.neutral_settle;
        }

        let mut new_y = y + new_vy * dt;
        let b = input.bounds;
        if new_y < b.min_y {
            new_y = b.min_y;
            new_vy = 0.0;
        }
        if new_y > b.max_y {
            new_y = b.max_y;
            new_vy = 0.0;
        }

        VerticalStep {
            new_y,
            new_vy,
            net_force,
            buoyancy,
            weight,
            total_mass,
            depth,
            pressure,
        }
    }
}
