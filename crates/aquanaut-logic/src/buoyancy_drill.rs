//! Stage 1: buoyancy control drill.
//!
//! The trainee reaches a target above (positive buoyancy), then one below
//! (negative buoyancy), then holds steady at mid-depth (neutral buoyancy).
//! Targets are placed at random inside the pool, away from hazard boxes.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::collision::{Aabb, HorizontalBounds, VerticalBounds};
use crate::mission::{rand_between, Mission, MissionContext, MissionStatus};

pub mod constants {
    /// Placement attempts before falling back to the pool origin.
    pub const MAX_TARGET_ATTEMPTS: usize = 10;
    /// Half height of the band around an ascend/descend target (m).
    pub const REACH_BAND: f32 = 0.2;
    /// Time the trainee must keep moving inside the band (s).
    pub const REACH_STAY: f32 = 0.5;
    /// Half height of the neutral band (m).
    pub const NEUTRAL_BAND: f32 = 0.15;
    /// Time to hold inside the neutral band (s).
    pub const NEUTRAL_HOLD: f32 = 1.0;
    /// Random spread of the neutral target around mid-depth (m).
    pub const NEUTRAL_SPREAD: f32 = 0.3;
}

pub const ASCEND_TEXT: &str = "🎯 [Stage 1] Use positive buoyancy to rise toward the target above!";
pub const DESCEND_TEXT: &str =
    "🎯 [Stage 2] Use negative buoyancy to descend toward the target below!";
pub const NEUTRAL_TEXT: &str =
    "🎯 [Stage 3] Maintain neutral buoyancy and stay steady for 1 second!";
pub const ASCEND_DONE_TEXT: &str = "✅ [Stage 1 Complete] Reached the upper target!";
pub const DESCEND_DONE_TEXT: &str = "✅ [Stage 2 Complete] Reached the lower target!";
pub const NEUTRAL_DONE_TEXT: &str = "✅ [Stage 3 Complete] Neutral buoyancy held steady!";
pub const NEUTRAL_LOST_TEXT: &str = "⚠️ Out of neutral range. Try again!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuoyancyPhase {
    Ascend,
    Descend,
    Neutral,
    Done,
}

/// Pick a target for `phase` starting from head height `base_y`.
///
/// Tries up to [`constants::MAX_TARGET_ATTEMPTS`] random points and rejects
/// any that fall inside a hazard box; falls back to `(0, base_y, 0)`.
pub fn random_target(
    rng: &mut StdRng,
    phase: BuoyancyPhase,
    base_y: f32,
    head: &VerticalBounds,
    xz: &HorizontalBounds,
    hazards: &[Aabb],
) -> Vec3 {
    let base_y = if base_y.is_finite() { base_y } else { head.mid() };

    for _ in 0..constants::MAX_TARGET_ATTEMPTS {
        let x = rand_between(rng, xz.min_x + 1.0, xz.max_x - 1.0);
        let z = rand_between(rng, xz.min_z + 1.0, xz.max_z - 1.0);
        let y = match phase {
            BuoyancyPhase::Ascend => {
                let y = (base_y + rand_between(rng, 1.0, 3.0)).min(head.max_y - 0.5);
                if y <= base_y {
                    base_y + 1.0
                } else {
                    y
                }
            }
            BuoyancyPhase::Descend => {
                let y = (base_y - rand_between(rng, 1.0, 3.0)).max(head.min_y + 0.5);
                if y >= base_y {
                    base_y - 1.0
                } else {
                    y
                }
            }
            BuoyancyPhase::Neutral | BuoyancyPhase::Done => {
                let mid = head.mid();
                rand_between(
                    rng,
                    mid - constants::NEUTRAL_SPREAD,
                    mid + constants::NEUTRAL_SPREAD,
                )
            }
        };

        let candidate = Vec3::new(x, y, z);
        if !hazards.iter().any(|b| b.contains_point(candidate)) {
            return candidate;
        }
    }

    Vec3::new(0.0, base_y, 0.0)
}

#[derive(Debug, Clone)]
pub struct BuoyancyDrill {
    rng: StdRng,
    phase: BuoyancyPhase,
    target: Vec3,
    /// Time spent moving inside the reach band.
    stay: f32,
    /// Time spent inside the neutral band.
    neutral_timer: f32,
    prev_y: f32,
}

impl BuoyancyDrill {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: BuoyancyPhase::Ascend,
            target: Vec3::ZERO,
            stay: 0.0,
            neutral_timer: 0.0,
            prev_y: 0.0,
        }
    }

    pub fn phase(&self) -> BuoyancyPhase {
        self.phase
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    fn enter(&mut self, phase: BuoyancyPhase, base_y: f32, ctx: &mut MissionContext<'_>) {
        let level = ctx.level;
        self.phase = phase;
        self.stay = 0.0;
        self.target = random_target(
            &mut self.rng,
            phase,
            base_y,
            &level.head,
            &level.xz,
            &level.hazards,
        );
        ctx.session.target = Some(self.target);
        let text = match phase {
            BuoyancyPhase::Ascend => ASCEND_TEXT,
            BuoyancyPhase::Descend => DESCEND_TEXT,
            BuoyancyPhase::Neutral | BuoyancyPhase::Done => {
                self.neutral_timer = 0.0;
                ctx.session.neutral_timer = 0.0;
                NEUTRAL_TEXT
            }
        };
        ctx.session.set_text(text);
        log::info!(
            "buoyancy drill: {} target at y = {:.2}",
            self.phase_name(),
            self.target.y
        );
    }

    /// Accumulate stay time while moving the right way inside the band.
    fn track_reach(&mut self, y: f32, dt: f32, rising: bool) -> bool {
        let target_y = self.target.y;
        let heading = if rising {
            y > self.prev_y && y < target_y + constants::REACH_BAND
        } else {
            y < self.prev_y && y > target_y - constants::REACH_BAND
        };
        if heading && (y - target_y).abs() < constants::REACH_BAND {
            self.stay += dt;
            self.stay > constants::REACH_STAY
        } else {
            self.stay = 0.0;
            false
        }
    }
}

impl Mission for BuoyancyDrill {
    fn phase_name(&self) -> &'static str {
        match self.phase {
            BuoyancyPhase::Ascend => "ascend",
            BuoyancyPhase::Descend => "descend",
            BuoyancyPhase::Neutral => "neutral",
            BuoyancyPhase::Done => "done",
        }
    }

    fn start(&mut self, ctx: &mut MissionContext<'_>) {
        let mid = ctx.level.head.mid();
        self.prev_y = ctx.head.y;
        self.neutral_timer = 0.0;
        ctx.session.neutral_timer = 0.0;
        self.enter(BuoyancyPhase::Ascend, mid, ctx);
    }

    fn tick(&mut self, ctx: &mut MissionContext<'_>) -> MissionStatus {
        let y = ctx.head.y;
        let dt = ctx.dt;

        let status = match self.phase {
            BuoyancyPhase::Ascend => {
                if self.track_reach(y, dt, true) {
                    ctx.session.set_text(ASCEND_DONE_TEXT);
                    self.enter(BuoyancyPhase::Descend, y, ctx);
                }
                MissionStatus::InProgress
            }
            BuoyancyPhase::Descend => {
                if self.track_reach(y, dt, false) {
                    ctx.session.set_text(DESCEND_DONE_TEXT);
                    self.enter(BuoyancyPhase::Neutral, y, ctx);
                }
                MissionStatus::InProgress
            }
            BuoyancyPhase::Neutral => {
                if (y - self.target.y).abs() < constants::NEUTRAL_BAND {
                    self.neutral_timer += dt;
                    ctx.session.neutral_timer = self.neutral_timer;
                    if self.neutral_timer >= constants::NEUTRAL_HOLD {
                        self.phase = BuoyancyPhase::Done;
                        ctx.session.set_text(NEUTRAL_DONE_TEXT);
                        log::info!("buoyancy drill complete");
                        MissionStatus::Complete
                    } else {
                        MissionStatus::InProgress
                    }
                } else {
                    if self.neutral_timer != 0.0 {
                        self.neutral_timer = 0.0;
                        ctx.session.neutral_timer = 0.0;
                        ctx.session.set_text(NEUTRAL_LOST_TEXT);
                    }
                    MissionStatus::InProgress
                }
            }
            BuoyancyPhase::Done => MissionStatus::Complete,
        };

        self.prev_y = y;
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MoveKeys;
    use crate::level::Level;
    use crate::session::SimSession;

    fn pool() -> Level {
        Level::open_pool(
            HorizontalBounds {
                min_x: -18.0,
                max_x: 18.0,
                min_z: -34.0,
                max_z: 22.0,
            },
            VerticalBounds {
                min_y: 1.75,
                max_y: 11.95,
            },
        )
    }

    // --- Target placement ---

    #[test]
    fn ascend_target_above_base_and_below_ceiling() {
        let level = pool();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let t = random_target(&mut rng, BuoyancyPhase::Ascend, 6.0, &level.head, &level.xz, &[]);
            assert!(t.y >= 7.0 && t.y <= 9.0, "y = {}", t.y);
            assert!(t.x >= -17.0 && t.x <= 17.0);
            assert!(t.z >= -33.0 && t.z <= 21.0);
        }
    }

    #[test]
    fn ascend_near_ceiling_forced_one_up() {
        let level = pool();
        let mut rng = StdRng::seed_from_u64(2);
        let t = random_target(&mut rng, BuoyancyPhase::Ascend, 11.9, &level.head, &level.xz, &[]);
        assert!((t.y - 12.9).abs() < 1e-5);
    }

    #[test]
    fn descend_target_below_base() {
        let level = pool();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let t = random_target(&mut rng, BuoyancyPhase::Descend, 8.0, &level.head, &level.xz, &[]);
            assert!(t.y >= 5.0 && t.y <= 7.0, "y = {}", t.y);
        }
        let floor = random_target(&mut rng, BuoyancyPhase::Descend, 2.0, &level.head, &level.xz, &[]);
        assert!((floor.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn neutral_target_near_mid() {
        let level = pool();
        let mid = level.head.mid();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            let t = random_target(&mut rng, BuoyancyPhase::Neutral, 3.0, &level.head, &level.xz, &[]);
            assert!((t.y - mid).abs() <= constants::NEUTRAL_SPREAD + 1e-5);
        }
    }

    #[test]
    fn hazard_everywhere_falls_back_to_origin() {
        let level = pool();
        let wall = Aabb::new(Vec3::splat(-100.0), Vec3::splat(100.0));
        let mut rng = StdRng::seed_from_u64(5);
        let t = random_target(&mut rng, BuoyancyPhase::Ascend, 6.0, &level.head, &level.xz, &[wall]);
        assert_eq!(t, Vec3::new(0.0, 6.0, 0.0));
    }

    // --- Phase machine ---

    fn run(drill: &mut BuoyancyDrill, level: &Level, session: &mut SimSession, y: f32) -> MissionStatus {
        let keys = MoveKeys::new();
        let mut ctx = MissionContext {
            head: Vec3::new(0.0, y, 0.0),
            dt: 0.1,
            keys: &keys,
            level,
            session,
        };
        drill.tick(&mut ctx)
    }

    fn start(drill: &mut BuoyancyDrill, level: &Level, session: &mut SimSession, y: f32) {
        let keys = MoveKeys::new();
        let mut ctx = MissionContext {
            head: Vec3::new(0.0, y, 0.0),
            dt: 0.0,
            keys: &keys,
            level,
            session,
        };
        drill.start(&mut ctx);
    }

    #[test]
    fn start_sets_ascend_target_and_text() {
        let level = pool();
        let mut session = SimSession::new(-5);
        let mut drill = BuoyancyDrill::new(7);
        start(&mut drill, &level, &mut session, 1.75);
        assert_eq!(drill.phase(), BuoyancyPhase::Ascend);
        assert_eq!(session.target, Some(drill.target()));
        assert_eq!(session.stage_text, ASCEND_TEXT);
        assert!(drill.target().y > level.head.mid());
    }

    #[test]
    fn ascend_needs_rising_stay() {
        let level = pool();
        let mut session = SimSession::new(-5);
        let mut drill = BuoyancyDrill::new(8);
        start(&mut drill, &level, &mut session, 1.75);
        let ty = drill.target().y;

        // Hovering still inside the band does not count.
        for _ in 0..10 {
            run(&mut drill, &level, &mut session, ty - 0.1);
        }
        assert_eq!(drill.phase(), BuoyancyPhase::Ascend);

        // Rising slowly through the band for > 0.5 s does.
        let mut y = ty - 0.19;
        for _ in 0..6 {
            y += 0.01;
            run(&mut drill, &level, &mut session, y);
        }
        assert_eq!(drill.phase(), BuoyancyPhase::Descend);
        assert!(drill.target().y < y);
        assert_eq!(session.stage_text, DESCEND_TEXT);
    }

    #[test]
    fn neutral_hold_completes_and_drop_resets() {
        let level = pool();
        let mut session = SimSession::new(-5);
        let mut drill = BuoyancyDrill::new(9);
        start(&mut drill, &level, &mut session, 1.75);

        let mut y = drill.target().y - 0.19;
        while drill.phase() == BuoyancyPhase::Ascend {
            y += 0.01;
            run(&mut drill, &level, &mut session, y);
        }
        let mut y = drill.target().y + 0.19;
        while drill.phase() == BuoyancyPhase::Descend {
            y -= 0.01;
            run(&mut drill, &level, &mut session, y);
        }
        assert_eq!(drill.phase(), BuoyancyPhase::Neutral);
        let ty = drill.target().y;

        for _ in 0..5 {
            run(&mut drill, &level, &mut session, ty);
        }
        assert!(session.neutral_timer > 0.4);
        run(&mut drill, &level, &mut session, ty + 1.0);
        assert_eq!(session.neutral_timer, 0.0);
        assert_eq!(session.stage_text, NEUTRAL_LOST_TEXT);

        let mut status = MissionStatus::InProgress;
        for _ in 0..11 {
            status = run(&mut drill, &level, &mut session, ty + 0.1);
        }
        assert_eq!(status, MissionStatus::Complete);
        assert_eq!(drill.phase(), BuoyancyPhase::Done);
        assert_eq!(session.stage_text, NEUTRAL_DONE_TEXT);
        assert_eq!(run(&mut drill, &level, &mut session, 0.0), MissionStatus::Complete);
    }
}
