//! Stage 3: hatch ingress drill.
//!
//! Near the portal, F pages through a briefing (purpose, context,
//! checklist) and then arms the handle. Holding F for three seconds inside
//! the trigger radius opens the hatch; the trainee then glides through.

use glam::Vec3;

use crate::input::Key;
use crate::mission::{text_block, Mission, MissionContext, MissionStatus};

pub mod constants {
    use glam::Vec3;

    pub const PORTAL_POS: Vec3 = Vec3::new(-5.489, 0.0, -7.946);
    /// Maximum head-to-portal distance for any interaction (m).
    pub const TRIGGER_DISTANCE: f32 = 3.0;
    /// Time F must be held on the handle (s).
    pub const HOLD_TIME: f32 = 3.0;
    /// Length of the hatch opening sequence (s).
    pub const OPENING_DURATION: f32 = 2.5;
    /// Delay between the ingress briefing and stage completion (s).
    pub const INGRESS_DELAY: f32 = 2.2;
    /// Cells in the handle progress bar.
    pub const BAR_CELLS: usize = 12;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HatchPhase {
    Idle,
    Purpose,
    Context,
    Checklist,
    Handle { hold: f32 },
    Opening { elapsed: f32 },
    Ingress { elapsed: f32 },
    Done,
}

pub fn intro_text() -> String {
    text_block(
        "INGRESS DRILL",
        &[
            "Move: WASD",
            "Buoyancy: E/R",
            "Action: F near the portal",
            "Approach the portal to start",
        ],
    )
}

fn purpose_text() -> String {
    text_block(
        "WHY THIS DRILL",
        &[
            "Avoid snags and hinge injuries",
            "Refine buoyancy and body alignment",
            "Confirm comms before tight entry",
            "Press F to continue",
        ],
    )
}

fn context_text() -> String {
    text_block(
        "CONTEXT",
        &[
            "Exterior → Interior transition",
            "Hold neutral trim, minimize wake",
            "Protect seals and mechanisms",
            "Keep tools/tethers clear",
            "Press F for checklist",
        ],
    )
}

fn checklist_text() -> String {
    text_block(
        "CHECKLIST",
        &[
            "Stabilize within 3 m of the portal",
            "Trim neutral with E/R, square to hatch",
            "Hands clear of hinges/seals",
            "Path clear, comms good",
            "Press F to move to handle",
        ],
    )
}

fn handle_text() -> String {
    text_block(
        "HANDLE",
        &[
            "Hold F for 3 s to actuate",
            "Stay on centerline, neutral trim",
            "Hold F now to open the hatch",
        ],
    )
}

pub fn handle_retry_text() -> String {
    text_block(
        "HANDLE",
        &[
            "Hold F for 3 s to actuate",
            "Stay centered and neutral",
            "Hold F again to continue",
        ],
    )
}

fn opening_text() -> String {
    text_block(
        "HATCH OPENING",
        &[
            "Hold position; avoid seals/hinges",
            "Centerline only; small corrections",
        ],
    )
}

pub fn ingress_text() -> String {
    text_block(
        "INGRESS",
        &[
            "Glide through slowly, stay centered",
            "Protect suit, tethers, cameras",
            "Clear the threshold and stabilize",
            "Training complete",
        ],
    )
}

/// `[████        ] 33%` style progress line.
pub fn progress_bar(pct: u32) -> String {
    let pct = pct.min(100);
    let filled = ((pct as f32 / 100.0) * constants::BAR_CELLS as f32).round() as usize;
    format!(
        "[{}{}] {pct}%",
        "█".repeat(filled),
        " ".repeat(constants::BAR_CELLS - filled)
    )
}

#[derive(Debug, Clone)]
pub struct HatchDrill {
    portal: Vec3,
    phase: HatchPhase,
    /// Last percentage shown, so the text only changes when it moves.
    last_pct: Option<u32>,
}

impl Default for HatchDrill {
    fn default() -> Self {
        Self::new(constants::PORTAL_POS)
    }
}

impl HatchDrill {
    pub fn new(portal: Vec3) -> Self {
        Self {
            portal,
            phase: HatchPhase::Idle,
            last_pct: None,
        }
    }

    pub fn phase(&self) -> HatchPhase {
        self.phase
    }

    pub fn in_range(&self, head: Vec3) -> bool {
        head.distance(self.portal) <= constants::TRIGGER_DISTANCE
    }

    fn set_phase(&mut self, phase: HatchPhase, text: String, ctx: &mut MissionContext<'_>) {
        self.phase = phase;
        ctx.session.set_text(text);
        log::info!("hatch drill: {}", self.phase_name());
    }

    fn reset_hold(&mut self, ctx: &mut MissionContext<'_>) {
        self.phase = HatchPhase::Handle { hold: 0.0 };
        self.last_pct = None;
        ctx.session.set_text(handle_retry_text());
    }
}

impl Mission for HatchDrill {
    fn phase_name(&self) -> &'static str {
        match self.phase {
            HatchPhase::Idle => "idle",
            HatchPhase::Purpose => "purpose",
            HatchPhase::Context => "context",
            HatchPhase::Checklist => "checklist",
            HatchPhase::Handle { .. } => "handle",
            HatchPhase::Opening { .. } => "opening",
            HatchPhase::Ingress { .. } => "ingress",
            HatchPhase::Done => "done",
        }
    }

    fn start(&mut self, ctx: &mut MissionContext<'_>) {
        self.phase = HatchPhase::Idle;
        self.last_pct = None;
        ctx.session.target = Some(self.portal);
        ctx.session.set_text(intro_text());
    }

    fn on_key_down(&mut self, key: Key, ctx: &mut MissionContext<'_>) {
        if key != Key::KeyF || !self.in_range(ctx.head) {
            return;
        }
        match self.phase {
            HatchPhase::Idle => self.set_phase(HatchPhase::Purpose, purpose_text(), ctx),
            HatchPhase::Purpose => self.set_phase(HatchPhase::Context, context_text(), ctx),
            HatchPhase::Context => self.set_phase(HatchPhase::Checklist, checklist_text(), ctx),
            HatchPhase::Checklist => {
                self.last_pct = None;
                self.set_phase(HatchPhase::Handle { hold: 0.0 }, handle_text(), ctx);
            }
            _ => {}
        }
    }

    fn on_key_up(&mut self, key: Key, ctx: &mut MissionContext<'_>) {
        if key == Key::KeyF && matches!(self.phase, HatchPhase::Handle { .. }) {
            self.reset_hold(ctx);
        }
    }

    fn tick(&mut self, ctx: &mut MissionContext<'_>) -> MissionStatus {
        match self.phase {
            HatchPhase::Handle { hold } => {
                if self.in_range(ctx.head) && ctx.keys.is_down(Key::KeyF) {
                    let hold = hold + ctx.dt;
                    let pct = ((hold / constants::HOLD_TIME) * 100.0).floor().min(100.0) as u32;
                    if self.last_pct != Some(pct) {
                        let bar = progress_bar(pct);
                        ctx.session.set_text(text_block(
                            "HANDLE",
                            &[bar.as_str(), "Keep holding F, stay centered"],
                        ));
                        self.last_pct = Some(pct);
                    }
                    if hold >= constants::HOLD_TIME {
                        self.last_pct = None;
                        self.set_phase(HatchPhase::Opening { elapsed: 0.0 }, opening_text(), ctx);
                    } else {
                        self.phase = HatchPhase::Handle { hold };
                    }
                } else if hold > 0.0 {
                    self.reset_hold(ctx);
                }
                MissionStatus::InProgress
            }
            HatchPhase::Opening { elapsed } => {
                let elapsed = elapsed + ctx.dt;
                if elapsed >= constants::OPENING_DURATION {
                    self.set_phase(HatchPhase::Ingress { elapsed: 0.0 }, ingress_text(), ctx);
                } else {
                    self.phase = HatchPhase::Opening { elapsed };
                }
                MissionStatus::InProgress
            }
            HatchPhase::Ingress { elapsed } => {
                let elapsed = elapsed + ctx.dt;
                if elapsed >= constants::INGRESS_DELAY {
                    self.phase = HatchPhase::Done;
                    log::info!("hatch drill complete");
                    MissionStatus::Complete
                } else {
                    self.phase = HatchPhase::Ingress { elapsed };
                    MissionStatus::InProgress
                }
            }
            HatchPhase::Done => MissionStatus::Complete,
            _ => MissionStatus::InProgress,
        }
    }
}
