//! Mutable per-stage simulation state shared by the controller and mission.
//!
//! Passed explicitly as `&mut SimSession`; the HUD reads it after each frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSession {
    /// While locked the player cannot move (dialogue, animations).
    pub locked: bool,
    /// Signed ballast units.
    pub ballast: i32,
    /// Instruction text shown to the trainee.
    pub stage_text: String,
    /// Seconds spent inside the neutral band during the buoyancy drill.
    pub neutral_timer: f32,
    /// Head position of the player.
    pub position: Vec3,
    /// Current objective position, if any.
    pub target: Option<Vec3>,
}

impl SimSession {
    pub fn new(initial_ballast: i32) -> Self {
        Self {
            locked: false,
            ballast: initial_ballast,
            stage_text: String::new(),
            neutral_timer: 0.0,
            position: Vec3::ZERO,
            target: None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.stage_text = text.into();
    }
}

impl Default for SimSession {
    fn default() -> Self {
        Self::new(0)
    }
}
