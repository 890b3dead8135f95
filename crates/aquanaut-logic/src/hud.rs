//! Read-only snapshot of what the trainee's HUD shows.

use glam::Vec3;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub title: &'static str,
    pub phase: &'static str,
    pub text: String,
    /// Head position.
    pub position: Vec3,
    pub ballast: i32,
    pub neutral_timer: f32,
    pub depth_m: f32,
    pub vertical_speed: f32,
    pub horizontal_speed: f32,
    /// Net vertical force on the last tick (N).
    pub net_force: f32,
    /// Head distance to the current objective, if there is one.
    pub target_distance: Option<f32>,
    pub elapsed: f32,
}

impl HudSnapshot {
    /// Plain-text rendering: title, instruction text, then telemetry.
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![self.title.to_string()];
        if !self.text.is_empty() {
            out.extend(self.text.lines().map(str::to_string));
        }
        out.push(format!("X: {:.2}", self.position.x));
        out.push(format!("Y: {:.2}", self.position.y));
        out.push(format!("Z: {:.2}", self.position.z));
        out.push(format!("Ballast: {}", self.ballast));
        out.push(format!("Neutral Timer: {:.2} s", self.neutral_timer));
        out.push(format!(
            "Depth: {:.2} m  vy: {:+.3} m/s  v_xz: {:.2} m/s",
            self.depth_m, self.vertical_speed, self.horizontal_speed
        ));
        if let Some(d) = self.target_distance {
            out.push(format!("Target: {d:.2} m"));
        }
        out
    }
}
