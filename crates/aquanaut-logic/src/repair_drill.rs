//! Stage 2: external repair drill.
//!
//! Swim to the ring, press F within reach to start the repair, wait for
//! it to finish, then a three-step countdown hands over to the next stage.

use glam::Vec3;

use crate::input::Key;
use crate::mission::{Mission, MissionContext, MissionStatus};

pub mod constants {
    use glam::Vec3;

    pub const RING_POS: Vec3 = Vec3::new(-1.59, 0.0, 14.89);
    /// Maximum head-to-ring distance for starting the repair (m).
    pub const REPAIR_DISTANCE: f32 = 2.0;
    /// Length of the repair procedure (s).
    pub const REPAIR_DURATION: f32 = 4.0;
    /// Countdown steps shown after the repair, one per second.
    pub const COUNTDOWN_STEPS: u32 = 3;
}

pub const BRIEFING_TEXT: &str = "🔧 EQUIPMENT REPAIR TRAINING\n\n\
• Mission: Repair critical life support system\n\
• Move to the red ring and press F to begin repair\n\
• Use E/R keys to adjust ballast for stability\n\
• Complete the repair to proceed to next stage";

pub const ZONE_TEXT: &str = "🎯 REPAIR ZONE REACHED\n\n\
• You are now in the repair zone\n\
• Press F to begin the repair procedure\n\
• Maintain stable position during repair\n\
• Use E/R to adjust ballast if needed";

pub const REPAIRING_TEXT: &str = "🔧 REPAIR IN PROGRESS\n\n\
• Repairing critical life support system\n\
• Maintain stable position\n\
• Do not move during repair procedure\n\
• Repair will complete automatically";

pub const COMPLETED_TEXT: &str = "✅ REPAIR COMPLETED SUCCESSFULLY!\n\n\
• Critical life support system restored\n\
• Mission objective achieved\n\
• Preparing for next training stage\n\
• Well done, astronaut!";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepairPhase {
    Approach,
    Repairing { elapsed: f32 },
    Completed { elapsed: f32 },
    Done,
}

#[derive(Debug, Clone)]
pub struct RepairDrill {
    ring: Vec3,
    phase: RepairPhase,
}

impl Default for RepairDrill {
    fn default() -> Self {
        Self::new(constants::RING_POS)
    }
}

impl RepairDrill {
    pub fn new(ring: Vec3) -> Self {
        Self {
            ring,
            phase: RepairPhase::Approach,
        }
    }

    pub fn phase(&self) -> RepairPhase {
        self.phase
    }

    pub fn in_range(&self, head: Vec3) -> bool {
        head.distance(self.ring) <= constants::REPAIR_DISTANCE
    }
}

/// Completion text with "Next stage in N..." appended.
pub fn countdown_text(remaining: u32) -> String {
    format!("{COMPLETED_TEXT}\n\nNext stage in {remaining}...")
}

impl Mission for RepairDrill {
    fn phase_name(&self) -> &'static str {
        match self.phase {
            RepairPhase::Approach => "approach",
            RepairPhase::Repairing { .. } => "repairing",
            RepairPhase::Completed { .. } => "completed",
            RepairPhase::Done => "done",
        }
    }

    fn start(&mut self, ctx: &mut MissionContext<'_>) {
        self.phase = RepairPhase::Approach;
        ctx.session.target = Some(self.ring);
        ctx.session.set_text(BRIEFING_TEXT);
    }

    fn on_key_down(&mut self, key: Key, ctx: &mut MissionContext<'_>) {
        if key != Key::KeyF || self.phase != RepairPhase::Approach {
            return;
        }
        if !self.in_range(ctx.head) {
            return;
        }
        self.phase = RepairPhase::Repairing { elapsed: 0.0 };
        ctx.session.set_text(REPAIRING_TEXT);
        log::info!("repair drill: repair started");
    }

    fn tick(&mut self, ctx: &mut MissionContext<'_>) -> MissionStatus {
        match self.phase {
            RepairPhase::Approach => {
                let text = if self.in_range(ctx.head) {
                    ZONE_TEXT
                } else {
                    BRIEFING_TEXT
                };
                ctx.session.set_text(text);
                MissionStatus::InProgress
            }
            RepairPhase::Repairing { elapsed } => {
                let elapsed = elapsed + ctx.dt;
                if elapsed >= constants::REPAIR_DURATION {
                    self.phase = RepairPhase::Completed { elapsed: 0.0 };
                    ctx.session.set_text(COMPLETED_TEXT);
                    log::info!("repair drill: repair completed");
                } else {
                    self.phase = RepairPhase::Repairing { elapsed };
                }
                MissionStatus::InProgress
            }
            RepairPhase::Completed { elapsed } => {
                let elapsed = elapsed + ctx.dt;
                // One countdown step per whole second; the step after the last
                // one hands over.
                let step = elapsed.floor() as u32;
                if step > constants::COUNTDOWN_STEPS {
                    self.phase = RepairPhase::Done;
                    return MissionStatus::Complete;
                }
                if step >= 1 {
                    ctx.session
                        .set_text(countdown_text(constants::COUNTDOWN_STEPS + 1 - step));
                }
                self.phase = RepairPhase::Completed { elapsed };
                MissionStatus::InProgress
            }
            RepairPhase::Done => MissionStatus::Complete,
        }
    }
}
