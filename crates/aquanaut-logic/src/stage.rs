//! One running training stage: session, controller, level and mission.
//!
//! ```
//! use aquanaut_logic::campaign::StageId;
//! use aquanaut_logic::collision::{HorizontalBounds, VerticalBounds};
//! use aquanaut_logic::config::HydroConfig;
//! use aquanaut_logic::level::Level;
//! use aquanaut_logic::stage::Stage;
//! use glam::Vec3;
//!
//! let level = Level::open_pool(
//!     HorizontalBounds { min_x: -18.0, max_x: 18.0, min_z: -34.0, max_z: 22.0 },
//!     VerticalBounds { min_y: 0.885, max_y: 11.95 },
//! );
//! let mut stage = Stage::new(StageId::BuoyancyTraining, &HydroConfig::default(), level, 7);
//! stage.frame(1.0 / 60.0, Vec3::NEG_Z);
//! assert_eq!(stage.hud().ballast, -5);
//! ```

use glam::Vec3;

use crate::campaign::StageId;
use crate::config::HydroConfig;
use crate::controller::{AquaticController, ControllerParams, TickReport};
use crate::horizontal::sanitize_dt;
use crate::hud::HudSnapshot;
use crate::input::Key;
use crate::level::Level;
use crate::mission::{Mission, MissionContext, MissionStatus};
use crate::session::SimSession;

pub struct Stage {
    id: StageId,
    level: Level,
    session: SimSession,
    controller: AquaticController,
    mission: Box<dyn Mission>,
    status: MissionStatus,
    last_tick: Option<TickReport>,
}

impl Stage {
    /// Spawn the player and start the stage's mission. `seed` drives every
    /// random draw in the stage.
    pub fn new(id: StageId, config: &HydroConfig, level: Level, seed: u64) -> Self {
        let mut session = SimSession::new(config.initial_ballast);
        let params = ControllerParams {
            seed,
            ..ControllerParams::new(id.spawn(), id.ballast_policy())
        };
        let controller = AquaticController::spawn(config, params, &level, &mut session);
        let mut mission = id.mission(seed.wrapping_add(1));

        let mut ctx = MissionContext {
            head: controller.head(),
            dt: 0.0,
            keys: controller.keys(),
            level: &level,
            session: &mut session,
        };
        mission.start(&mut ctx);
        log::info!("{id}: started ({})", mission.phase_name());

        Self {
            id,
            level,
            session,
            controller,
            mission,
            status: MissionStatus::InProgress,
            last_tick: None,
        }
    }

    pub fn id(&self) -> StageId {
        self.id
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn session(&self) -> &SimSession {
        &self.session
    }

    /// Mutable session access for hosts that lock input during dialogue.
    pub fn session_mut(&mut self) -> &mut SimSession {
        &mut self.session
    }

    pub fn controller(&self) -> &AquaticController {
        &self.controller
    }

    /// Controller output of the most recent frame.
    pub fn last_tick(&self) -> Option<&TickReport> {
        self.last_tick.as_ref()
    }

    pub fn phase_name(&self) -> &'static str {
        self.mission.phase_name()
    }

    pub fn is_complete(&self) -> bool {
        self.status == MissionStatus::Complete
    }

    pub fn key_down(&mut self, key: Key) {
        self.controller.on_key_down(key, &mut self.session);
        let mut ctx = MissionContext {
            head: self.controller.head(),
            dt: 0.0,
            keys: self.controller.keys(),
            level: &self.level,
            session: &mut self.session,
        };
        self.mission.on_key_down(key, &mut ctx);
    }

    pub fn key_up(&mut self, key: Key) {
        self.controller.on_key_up(key);
        let mut ctx = MissionContext {
            head: self.controller.head(),
            dt: 0.0,
            keys: self.controller.keys(),
            level: &self.level,
            session: &mut self.session,
        };
        self.mission.on_key_up(key, &mut ctx);
    }

    pub fn clear_keys(&mut self) {
        self.controller.clear_keys();
    }

    /// Advance one frame: move the player, then step the mission.
    pub fn frame(&mut self, dt: f32, forward: Vec3) -> MissionStatus {
        let dt = sanitize_dt(dt);
        let tick = self
            .controller
            .tick(dt, forward, &self.level, &mut self.session);
        self.last_tick = Some(tick);

        let mut ctx = MissionContext {
            head: tick.head,
            dt,
            keys: self.controller.keys(),
            level: &self.level,
            session: &mut self.session,
        };
        let status = self.mission.tick(&mut ctx);
        if status == MissionStatus::Complete && self.status != MissionStatus::Complete {
            log::info!(
                "{}: complete after {:.1} s",
                self.id,
                self.controller.elapsed()
            );
        }
        self.status = status;
        status
    }

    pub fn hud(&self) -> HudSnapshot {
        let head = self.controller.head();
        HudSnapshot {
            title: self.id.title(),
            phase: self.mission.phase_name(),
            text: self.session.stage_text.clone(),
            position: self.session.position,
            ballast: self.session.ballast,
            neutral_timer: self.session.neutral_timer,
            depth_m: self.last_tick.map_or(0.0, |t| t.vertical.depth),
            vertical_speed: self.controller.vy(),
            horizontal_speed: self.controller.velocity().length(),
            net_force: self.last_tick.map_or(0.0, |t| t.vertical.net_force),
            target_distance: self.session.target.map(|t| t.distance(head)),
            elapsed: self.controller.elapsed(),
        }
    }
}
