//! The aquatic player controller shared by every training stage.
//!
//! Tick order:
//! 1. Vertical step on the head height (buoyancy, ballast, breathing)
//! 2. Horizontal step from keys and camera forward
//! 3. Propose the new capsule center, clamp it into the water rectangle
//! 4. Block hazard penetration one axis at a time
//! 5. Sync the head height and session position from the accepted center

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::collision::{block_by_hazards, clamp_xz_inside, VerticalBounds};
use crate::config::HydroConfig;
use crate::horizontal::{sanitize_dt, HorizontalInput, HorizontalIntegrator};
use crate::input::{Key, MoveKeys};
use crate::level::Level;
use crate::session::SimSession;
use crate::vertical::{VerticalInput, VerticalIntegrator, VerticalStep};

pub mod constants {
    /// Standing height of the suited player (m).
    pub const PLAYER_HEIGHT: f32 = 1.75;
    pub const PLAYER_RADIUS: f32 = 0.38;
    /// Lowest head height the camera may reach.
    pub const CAM_MIN_Y: f32 = 1.75;
    /// Mass floor fed to the horizontal integrator (kg).
    pub const MIN_SWIM_MASS: f32 = 100.0;
}

/// Capsule dimensions of the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerShape {
    pub height: f32,
    pub radius: f32,
}

impl Default for PlayerShape {
    fn default() -> Self {
        Self {
            height: constants::PLAYER_HEIGHT,
            radius: constants::PLAYER_RADIUS,
        }
    }
}

impl PlayerShape {
    /// Distance from capsule center to head; also the capsule half height.
    pub fn head_offset(&self) -> f32 {
        self.height * 0.5
    }
}

/// What the "remove ballast" key does at low values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallastPolicy {
    /// Always subtract one unit.
    Unbounded,
    /// Never go below zero.
    FloorAtZero,
}

impl BallastPolicy {
    pub fn decrement(self, ballast: i32) -> i32 {
        match self {
            BallastPolicy::Unbounded => ballast.saturating_sub(1),
            BallastPolicy::FloorAtZero => (ballast - 1).max(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerParams {
    /// Spawn head position.
    pub spawn: Vec3,
    pub cam_min_y: f32,
    pub ballast_policy: BallastPolicy,
    pub shape: PlayerShape,
    /// Seed for the breathing reserve draw.
    pub seed: u64,
}

impl ControllerParams {
    pub fn new(spawn: Vec3, ballast_policy: BallastPolicy) -> Self {
        Self {
            spawn,
            cam_min_y: constants::CAM_MIN_Y,
            ballast_policy,
            shape: PlayerShape::default(),
            seed: 0,
        }
    }
}

/// Outcome of one controller tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    /// Horizontal displacement requested by the integrator (before clamping).
    pub displacement: Vec2,
    pub vertical: VerticalStep,
    /// Accepted head position.
    pub head: Vec3,
    /// Horizontal velocity (X, Z) after the step.
    pub velocity: Vec2,
    /// Vertical velocity after clamping and blocking.
    pub vy: f32,
    /// True if any axis of the move was rejected by a hazard.
    pub blocked: bool,
}

#[derive(Debug, Clone)]
pub struct AquaticController {
    params: ControllerParams,
    horizontal: HorizontalIntegrator,
    vertical: VerticalIntegrator,
    keys: MoveKeys,
    /// Capsule center.
    center: Vec3,
    head_y: f32,
    vy: f32,
    elapsed: f32,
    last_speed_xz: f32,
}

impl AquaticController {
    /// Place the player at the spawn point and publish the position to `session`.
    pub fn spawn(
        config: &HydroConfig,
        params: ControllerParams,
        level: &Level,
        session: &mut SimSession,
    ) -> Self {
        let offset = params.shape.head_offset();
        let center = params.spawn - Vec3::Y * offset;
        let mut center = clamp_xz_inside(center, &level.xz, params.shape.radius);
        let head_y = (center.y + offset).max(params.cam_min_y);
        center.y = head_y - offset;

        session.position = Vec3::new(center.x, head_y, center.z);

        Self {
            params,
            horizontal: HorizontalIntegrator::new(config.motion),
            vertical: VerticalIntegrator::new(config.vertical, params.seed),
            keys: MoveKeys::new(),
            center,
            head_y,
            vy: 0.0,
            elapsed: 0.0,
            last_speed_xz: 0.0,
        }
    }

    pub fn params(&self) -> &ControllerParams {
        &self.params
    }

    pub fn keys(&self) -> &MoveKeys {
        &self.keys
    }

    pub fn head(&self) -> Vec3 {
        Vec3::new(self.center.x, self.head_y, self.center.z)
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn vy(&self) -> f32 {
        self.vy
    }

    pub fn velocity(&self) -> Vec2 {
        self.horizontal.velocity()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Track a pressed key; E and R adjust ballast unless the session is locked.
    pub fn on_key_down(&mut self, key: Key, session: &mut SimSession) {
        self.keys.press(key);
        if session.locked {
            return;
        }
        let before = session.ballast;
        match key {
            Key::KeyE => session.ballast = self.params.ballast_policy.decrement(before),
            Key::KeyR => session.ballast = before.saturating_add(1),
            _ => return,
        }
        if session.ballast != before {
            log::debug!("ballast {} -> {}", before, session.ballast);
        }
    }

    pub fn on_key_up(&mut self, key: Key) {
        self.keys.release(key);
    }

    /// Release every key (window blur).
    pub fn clear_keys(&mut self) {
        self.keys.clear();
    }

    /// Head-height range for this tick: the level range, floored by the camera minimum.
    fn head_range(&self, level: &Level) -> VerticalBounds {
        VerticalBounds {
            min_y: level.head.min_y.max(self.params.cam_min_y),
            max_y: level.head.max_y,
        }
    }

    pub fn tick(
        &mut self,
        dt: f32,
        forward: Vec3,
        level: &Level,
        session: &mut SimSession,
    ) -> TickReport {
        let dt = sanitize_dt(dt);
        self.elapsed += dt;
        let offset = self.params.shape.head_offset();
        let radius = self.params.shape.radius;

        let vstep = self.vertical.step_y(&VerticalInput {
            dt,
            y: self.head_y,
            vy: self.vy,
            ballast: session.ballast,
            bounds: self.head_range(level),
            speed_xz: self.last_speed_xz,
            t: self.elapsed,
        });
        self.vy = vstep.new_vy;

        let idle = MoveKeys::new();
        let keys = if session.locked { &idle } else { &self.keys };
        let displacement = self.horizontal.step(&HorizontalInput {
            dt,
            forward,
            position: Vec2::new(self.center.x, self.center.z),
            keys,
            eff_mass: Some(vstep.total_mass.max(constants::MIN_SWIM_MASS)),
            t: self.elapsed,
            bounds: Some(&level.xz),
        });

        let mut proposed = self.center;
        if displacement.x.is_finite() {
            proposed.x += displacement.x;
        }
        if displacement.y.is_finite() {
            proposed.z += displacement.y;
        }
        proposed.y = vstep.new_y - offset;
        let proposed = clamp_xz_inside(proposed, &level.xz, radius);

        let accepted = block_by_hazards(self.center, proposed, &level.hazards, radius, offset);
        let blocked = accepted != proposed;
        if accepted.y != proposed.y {
            self.vy = 0.0;
        }
        if accepted.x != proposed.x || accepted.z != proposed.z {
            // Keep the integrator from building speed against the hull.
            let v = self.horizontal.velocity();
            self.horizontal.set_velocity(Vec2::new(
                if accepted.x != proposed.x { 0.0 } else { v.x },
                if accepted.z != proposed.z { 0.0 } else { v.y },
            ));
        }

        self.center = accepted;
        self.head_y = accepted.y + offset;
        self.last_speed_xz = self.horizontal.velocity().length();
        session.position = self.head();

        TickReport {
            displacement,
            vertical: vstep,
            head: self.head(),
            velocity: self.horizontal.velocity(),
            vy: self.vy,
            blocked,
        }
    }
}
