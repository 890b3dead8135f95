//! Mission trait: the per-stage objective state machine.
//!
//! The stage forwards key events and calls [`Mission::tick`] once per frame
//! after the controller has moved the player. Missions write instructions
//! and objective positions into the session; they never move the player.

use glam::Vec3;

use crate::input::{Key, MoveKeys};
use crate::level::Level;
use crate::session::SimSession;

/// Everything a mission may read or update during one callback.
pub struct MissionContext<'a> {
    /// Player head position after this frame's movement.
    pub head: Vec3,
    pub dt: f32,
    pub keys: &'a MoveKeys,
    pub level: &'a Level,
    pub session: &'a mut SimSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionStatus {
    InProgress,
    Complete,
}

pub trait Mission {
    /// Short label of the current phase, for the HUD and logs.
    fn phase_name(&self) -> &'static str;

    /// Called once when the stage begins, after the player has spawned.
    fn start(&mut self, ctx: &mut MissionContext<'_>);

    fn on_key_down(&mut self, _key: Key, _ctx: &mut MissionContext<'_>) {}

    fn on_key_up(&mut self, _key: Key, _ctx: &mut MissionContext<'_>) {}

    fn tick(&mut self, ctx: &mut MissionContext<'_>) -> MissionStatus;
}

/// Format an instruction block: `【TITLE】`, a blank line, then `• line` bullets.
pub fn text_block(title: &str, lines: &[&str]) -> String {
    let header = format!("【{title}】");
    if lines.is_empty() {
        return header;
    }
    let body: Vec<String> = lines.iter().map(|l| format!("• {l}")).collect();
    format!("{header}\n\n{}", body.join("\n"))
}

/// `lo + (hi - lo) * u` for a uniform `u` in `[0, 1)`. Never panics on an
/// empty or inverted range.
pub(crate) fn rand_between<R: rand::Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * rng.gen::<f32>()
}
