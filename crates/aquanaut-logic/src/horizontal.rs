//! Horizontal (X/Z) swimming integrator.
//!
//! Each tick turns camera-relative key input into a displacement:
//!
//! 1. Flatten the camera forward vector onto the water plane; right = forward × up
//! 2. Smooth the commanded thrust toward its target (exponential spool-up)
//! 3. Sample the ambient current and take velocity relative to it
//! 4. Estimate yaw rate from how far the forward vector turned; faster
//!    turns scale drag up
//! 5. Quadratic drag and added mass per body axis (forward / side)
//! 6. Integrate, clamp each axis to its speed cap, zero tiny speeds
//!
//! ```
//! use aquanaut_logic::config::MotionConfig;
//! use aquanaut_logic::horizontal::{HorizontalInput, HorizontalIntegrator};
//! use aquanaut_logic::input::{Key, MoveKeys};
//! use glam::{Vec2, Vec3};
//!
//! let mut swim = HorizontalIntegrator::new(MotionConfig::default());
//! let keys = MoveKeys::with(&[Key::KeyW]);
//! let step = swim.step(&HorizontalInput {
//!     dt: 1.0 / 60.0,
//!     forward: Vec3::NEG_Z,
//!     position: Vec2::ZERO,
//!     keys: &keys,
//!     eff_mass: None,
//!     t: 0.0,
//!     bounds: None,
//! });
//! assert!(step.length() > 0.0);
//! ```

use glam::{Vec2, Vec3};

use crate::collision::HorizontalBounds;
use crate::config::MotionConfig;
use crate::current::current_at;
use crate::input::MoveKeys;

/// Frame time used when the host reports a bad delta.
pub const NOMINAL_DT: f32 = 1.0 / 60.0;

/// Blend factor pulling the remembered forward vector toward the new one.
const YAW_BLEND: f32 = 0.6;

/// Replace non-finite or non-positive deltas with [`NOMINAL_DT`].
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        NOMINAL_DT
    }
}

/// Exponential moving average with time constant `tau`.
pub fn ema_update(prev: f32, target: f32, dt: f32, tau: f32) -> f32 {
    let a = 1.0 - (-dt / tau.max(1e-6)).exp();
    prev + (target - prev) * a
}

/// Unit forward on the water plane, falling back to -Z when the camera
/// looks straight up or down.
pub fn flat_forward(camera_forward: Vec3) -> Vec3 {
    let flat = Vec3::new(camera_forward.x, 0.0, camera_forward.z);
    if !flat.is_finite() || flat.length_squared() < 1e-8 {
        Vec3::NEG_Z
    } else {
        flat.normalize()
    }
}

/// Per-tick input to [`HorizontalIntegrator::step`].
#[derive(Debug, Clone, Copy)]
pub struct HorizontalInput<'a> {
    pub dt: f32,
    /// Camera look direction; only its X/Z part is used.
    pub forward: Vec3,
    /// Player position on the water plane (world X, Z).
    pub position: Vec2,
    pub keys: &'a MoveKeys,
    /// Mass override (kg); `None` uses the configured mass.
    pub eff_mass: Option<f32>,
    /// Elapsed simulation time (s), drives the current's gusts.
    pub t: f32,
    /// Pool walls, used to fade the current near the edges.
    pub bounds: Option<&'a HorizontalBounds>,
}

/// Retained swimming state for one player.
#[derive(Debug, Clone)]
pub struct HorizontalIntegrator {
    config: MotionConfig,
    /// World-space velocity (X, Z) in m/s.
    velocity: Vec2,
    /// Smoothed thrust magnitude (N).
    thrust: f32,
    /// Blended forward direction from previous ticks.
    prev_dir: Vec3,
}

impl HorizontalIntegrator {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            velocity: Vec2::ZERO,
            thrust: 0.0,
            prev_dir: Vec3::NEG_Z,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn thrust(&self) -> f32 {
        self.thrust
    }

    /// Advance one tick and return the displacement (world X, Z).
    pub fn step(&mut self, input: &HorizontalInput<'_>) -> Vec2 {
        let c = &self.config;
        let dt = sanitize_dt(input.dt);

        let fwd3 = flat_forward(input.forward);
        let right3 = fwd3.cross(Vec3::Y).normalize();
        let fwd = Vec2::new(fwd3.x, fwd3.z);
        let right = Vec2::new(right3.x, right3.z);

        let cmd_fwd = input.keys.forward_command();
        let cmd_side = input.keys.side_command();
        let has_input = cmd_fwd != 0.0 || cmd_side != 0.0;
        let target = if has_input {
            c.thrust_n * if input.keys.boost() { c.accel_boost } else { 1.0 }
        } else {
            0.0
        };
        self.thrust = ema_update(self.thrust, target, dt, c.thrust_rise_tau);

        let current = current_at(&c.current, input.position, input.t, input.bounds);
        let rel = self.velocity - current;
        let v_fwd = rel.dot(fwd);
        let v_side = rel.dot(right);

        let dot = self.prev_dir.dot(fwd3).clamp(-1.0, 1.0);
        let turned = dot.acos();
        self.prev_dir = self.prev_dir.lerp(fwd3, YAW_BLEND);
        let yaw_rate = turned / dt.max(1e-6);
        let turn_factor = 1.0 + c.turn_damp_k * yaw_rate;

        let drag_f = 0.5 * c.rho * c.cd_fwd * c.area_fwd * v_fwd.abs() * v_fwd * turn_factor;
        let drag_s = 0.5 * c.rho * c.cd_side * c.area_side * v_side.abs() * v_side * turn_factor;

        let mass = input.eff_mass.unwrap_or(c.mass).max(1e-6);
        let m_eff_f = mass + c.ca_fwd * c.rho * c.vol;
        let m_eff_s = mass + c.ca_side * c.rho * c.vol;

        let a_f = (self.thrust * cmd_fwd - drag_f) / m_eff_f;
        let a_s = (self.thrust * cmd_side - drag_s) / m_eff_s;
        self.velocity += (fwd * a_f + right * a_s) * dt;

        let clamped_f = self.velocity.dot(fwd).clamp(-c.vmax_fwd, c.vmax_fwd);
        let clamped_s = self.velocity.dot(right).clamp(-c.vmax_side, c.vmax_side);
        self.velocity = fwd * clamped_f + right * clamped_s;

        if !self.velocity.is_finite() || self.velocity.length() < c.deadband_v {
            self.velocity = Vec2::ZERO;
        }

        self.velocity * dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CurrentConfig;
    use crate::input::Key;

    const DT: f32 = 1.0 / 60.0;

    fn still_config() -> MotionConfig {
        MotionConfig {
            current: CurrentConfig::still(),
            ..Default::default()
        }
    }

    fn step(swim: &mut HorizontalIntegrator, keys: &MoveKeys, forward: Vec3) -> Vec2 {
        swim.step(&HorizontalInput {
            dt: DT,
            forward,
            position: Vec2::ZERO,
            keys,
            eff_mass: None,
            t: 0.0,
            bounds: None,
        })
    }

    // --- Helpers ---

    #[test]
    fn sanitize_replaces_bad_deltas() {
        assert_eq!(sanitize_dt(0.0), NOMINAL_DT);
        assert_eq!(sanitize_dt(-0.1), NOMINAL_DT);
        assert_eq!(sanitize_dt(f32::NAN), NOMINAL_DT);
        assert_eq!(sanitize_dt(f32::INFINITY), NOMINAL_DT);
        assert_eq!(sanitize_dt(0.02), 0.02);
    }

    #[test]
    fn ema_moves_toward_target() {
        let v = ema_update(0.0, 200.0, DT, 0.05);
        assert!(v > 0.0 && v < 200.0);
        // Long dt converges.
        assert!((ema_update(0.0, 200.0, 10.0, 0.05) - 200.0).abs() < 1e-3);
    }

    #[test]
    fn degenerate_forward_falls_back() {
        assert_eq!(flat_forward(Vec3::Y), Vec3::NEG_Z);
        assert_eq!(flat_forward(Vec3::ZERO), Vec3::NEG_Z);
        assert_eq!(flat_forward(Vec3::new(f32::NAN, 0.0, 1.0)), Vec3::NEG_Z);
        let f = flat_forward(Vec3::new(3.0, 5.0, 4.0));
        assert!((f - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
    }

    // --- Thrust and motion ---

    #[test]
    fn forward_key_moves_along_camera() {
        let mut swim = HorizontalIntegrator::new(still_config());
        let keys = MoveKeys::with(&[Key::KeyW]);
        let mut total = Vec2::ZERO;
        for _ in 0..30 {
            total += step(&mut swim, &keys, Vec3::NEG_Z);
        }
        assert!(total.y < 0.0, "moved toward -Z, got {total:?}");
        assert!(total.x.abs() < 1e-5);
    }

    #[test]
    fn right_key_moves_to_camera_right() {
        let mut swim = HorizontalIntegrator::new(still_config());
        let keys = MoveKeys::with(&[Key::KeyD]);
        let mut total = Vec2::ZERO;
        for _ in 0..30 {
            total += step(&mut swim, &keys, Vec3::NEG_Z);
        }
        // Looking down -Z, right is +X.
        assert!(total.x > 0.0, "got {total:?}");
    }

    #[test]
    fn boost_accelerates_faster() {
        let mut plain = HorizontalIntegrator::new(still_config());
        let mut boosted = HorizontalIntegrator::new(still_config());
        let w = MoveKeys::with(&[Key::KeyW]);
        let wb = MoveKeys::with(&[Key::KeyW, Key::ShiftLeft]);
        for _ in 0..5 {
            step(&mut plain, &w, Vec3::NEG_Z);
            step(&mut boosted, &wb, Vec3::NEG_Z);
        }
        assert!(boosted.thrust() > plain.thrust());
        assert!(boosted.velocity().length() > plain.velocity().length());
    }

    #[test]
    fn velocity_never_exceeds_caps() {
        let mut swim = HorizontalIntegrator::new(MotionConfig {
            thrust_n: 50_000.0,
            ..still_config()
        });
        let keys = MoveKeys::with(&[Key::KeyW, Key::KeyD, Key::ShiftLeft]);
        let c = *swim.config();
        for _ in 0..200 {
            step(&mut swim, &keys, Vec3::NEG_Z);
            let v = swim.velocity();
            // Looking down -Z: forward is -Z, right is +X.
            assert!(v.y.abs() <= c.vmax_fwd + 1e-5, "fwd {v:?}");
            assert!(v.x.abs() <= c.vmax_side + 1e-5, "side {v:?}");
        }
    }

    #[test]
    fn caps_hold_while_turning() {
        let mut swim = HorizontalIntegrator::new(MotionConfig {
            thrust_n: 50_000.0,
            ..still_config()
        });
        let keys = MoveKeys::with(&[Key::KeyW]);
        let c = *swim.config();
        for i in 0..120 {
            let yaw = i as f32 * 0.05;
            let forward = Vec3::new(yaw.sin(), -0.3, -yaw.cos());
            step(&mut swim, &keys, forward);
            let f3 = flat_forward(forward);
            let fwd = Vec2::new(f3.x, f3.z);
            let right = Vec2::new(-f3.z, f3.x);
            let v = swim.velocity();
            assert!(v.dot(fwd).abs() <= c.vmax_fwd + 1e-4);
            assert!(v.dot(right).abs() <= c.vmax_side + 1e-4);
        }
    }

    // --- Decay and dead-band ---

    #[test]
    fn coasting_decays_to_exact_zero() {
        let mut swim = HorizontalIntegrator::new(still_config());
        swim.set_velocity(Vec2::new(0.0, -0.05));
        let keys = MoveKeys::new();
        let mut steps = 0;
        while swim.velocity() != Vec2::ZERO {
            step(&mut swim, &keys, Vec3::NEG_Z);
            steps += 1;
            assert!(steps < 60_000, "did not settle, v = {:?}", swim.velocity());
        }
        // Once stopped it stays stopped.
        assert_eq!(step(&mut swim, &keys, Vec3::NEG_Z), Vec2::ZERO);
    }

    #[test]
    fn below_deadband_snaps_immediately() {
        let mut swim = HorizontalIntegrator::new(still_config());
        swim.set_velocity(Vec2::new(0.0005, 0.0));
        let d = step(&mut swim, &MoveKeys::new(), Vec3::NEG_Z);
        assert_eq!(d, Vec2::ZERO);
    }

    #[test]
    fn idle_without_current_stays_put() {
        let mut swim = HorizontalIntegrator::new(still_config());
        for _ in 0..10 {
            assert_eq!(step(&mut swim, &MoveKeys::new(), Vec3::NEG_Z), Vec2::ZERO);
        }
    }

    #[test]
    fn current_pushes_idle_swimmer() {
        let mut swim = HorizontalIntegrator::new(MotionConfig::default());
        let keys = MoveKeys::new();
        let mut moved = Vec2::ZERO;
        for i in 0..120 {
            moved += swim.step(&HorizontalInput {
                dt: DT,
                forward: Vec3::NEG_Z,
                position: Vec2::new(2.0, 3.0),
                keys: &keys,
                eff_mass: None,
                t: i as f32 * DT,
                bounds: None,
            });
        }
        assert!(moved.length() > 0.0);
    }

    // --- Turn damping and edge cases ---

    #[test]
    fn sharp_turn_adds_drag() {
        let cfg = still_config();
        let keys = MoveKeys::new();
        let mut steady = HorizontalIntegrator::new(cfg);
        let mut turning = HorizontalIntegrator::new(cfg);
        steady.set_velocity(Vec2::new(0.0, -1.0));
        turning.set_velocity(Vec2::new(0.0, -1.0));
        step(&mut steady, &keys, Vec3::NEG_Z);
        step(&mut turning, &keys, Vec3::new(1.0, 0.0, -1.0));
        assert!(turning.velocity().length() < steady.velocity().length());
    }

    #[test]
    fn zero_dt_uses_nominal_frame() {
        let mut a = HorizontalIntegrator::new(still_config());
        let mut b = HorizontalIntegrator::new(still_config());
        let keys = MoveKeys::with(&[Key::KeyW]);
        let input = |dt| HorizontalInput {
            dt,
            forward: Vec3::NEG_Z,
            position: Vec2::ZERO,
            keys: &keys,
            eff_mass: None,
            t: 0.0,
            bounds: None,
        };
        let da = a.step(&input(0.0));
        let db = b.step(&input(NOMINAL_DT));
        assert_eq!(da, db);
        assert!(da.is_finite());
    }

    #[test]
    fn heavier_mass_accelerates_slower() {
        let mut light = HorizontalIntegrator::new(still_config());
        let mut heavy = HorizontalIntegrator::new(still_config());
        let keys = MoveKeys::with(&[Key::KeyW]);
        for _ in 0..5 {
            for (swim, mass) in [(&mut light, 100.0), (&mut heavy, 400.0)] {
                swim.step(&HorizontalInput {
                    dt: DT,
                    forward: Vec3::NEG_Z,
                    position: Vec2::ZERO,
                    keys: &keys,
                    eff_mass: Some(mass),
                    t: 0.0,
                    bounds: None,
                });
            }
        }
        assert!(light.velocity().length() > heavy.velocity().length());
    }
}
