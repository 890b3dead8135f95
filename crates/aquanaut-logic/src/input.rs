//! Keyboard state for the player controller.
//!
//! Keys are named after DOM `KeyboardEvent.code` values so hosts can pass
//! the codes they receive straight through [`Key::from_code`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Keys the training stages react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Thrust boost while held.
    ShiftLeft,
    /// Remove one ballast unit.
    KeyE,
    /// Add one ballast unit.
    KeyR,
    /// Interact with the stage objective.
    KeyF,
    Space,
}

impl Key {
    pub fn from_code(code: &str) -> Option<Key> {
        match code {
            "KeyW" => Some(Key::KeyW),
            "KeyA" => Some(Key::KeyA),
            "KeyS" => Some(Key::KeyS),
            "KeyD" => Some(Key::KeyD),
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "ShiftLeft" => Some(Key::ShiftLeft),
            "KeyE" => Some(Key::KeyE),
            "KeyR" => Some(Key::KeyR),
            "KeyF" => Some(Key::KeyF),
            "Space" => Some(Key::Space),
            _ => None,
        }
    }

    /// Keys whose default browser action (scrolling) the host should suppress.
    pub fn suppresses_default(&self) -> bool {
        matches!(
            self,
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight | Key::Space
        )
    }
}

/// Set of currently held keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveKeys {
    held: HashSet<Key>,
}

impl MoveKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a list of held keys.
    pub fn with(keys: &[Key]) -> Self {
        Self {
            held: keys.iter().copied().collect(),
        }
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Drop every key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Forward command in {-1, 0, 1}.
    pub fn forward_command(&self) -> f32 {
        let mut cmd = 0.0;
        if self.is_down(Key::KeyW) || self.is_down(Key::ArrowUp) {
            cmd += 1.0;
        }
        if self.is_down(Key::KeyS) || self.is_down(Key::ArrowDown) {
            cmd -= 1.0;
        }
        cmd
    }

    /// Lateral command in {-1, 0, 1}; positive is to the right.
    pub fn side_command(&self) -> f32 {
        let mut cmd = 0.0;
        if self.is_down(Key::KeyA) || self.is_down(Key::ArrowLeft) {
            cmd -= 1.0;
        }
        if self.is_down(Key::KeyD) || self.is_down(Key::ArrowRight) {
            cmd += 1.0;
        }
        cmd
    }

    pub fn boost(&self) -> bool {
        self.is_down(Key::ShiftLeft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_arrows_are_equivalent() {
        assert_eq!(MoveKeys::with(&[Key::KeyW]).forward_command(), 1.0);
        assert_eq!(MoveKeys::with(&[Key::ArrowUp]).forward_command(), 1.0);
        assert_eq!(MoveKeys::with(&[Key::ArrowDown]).forward_command(), -1.0);
        assert_eq!(MoveKeys::with(&[Key::KeyA]).side_command(), -1.0);
        assert_eq!(MoveKeys::with(&[Key::ArrowRight]).side_command(), 1.0);
    }

    #[test]
    fn opposing_keys_cancel() {
        let keys = MoveKeys::with(&[Key::KeyW, Key::KeyS, Key::KeyA, Key::KeyD]);
        assert_eq!(keys.forward_command(), 0.0);
        assert_eq!(keys.side_command(), 0.0);
    }

    #[test]
    fn same_direction_does_not_double() {
        let keys = MoveKeys::with(&[Key::KeyW, Key::ArrowUp]);
        assert_eq!(keys.forward_command(), 1.0);
    }

    #[test]
    fn press_release_clear() {
        let mut keys = MoveKeys::new();
        keys.press(Key::KeyF);
        keys.press(Key::ShiftLeft);
        assert!(keys.is_down(Key::KeyF));
        assert!(keys.boost());
        keys.release(Key::KeyF);
        assert!(!keys.is_down(Key::KeyF));
        keys.clear();
        assert!(!keys.boost());
    }

    #[test]
    fn codes_round_trip() {
        assert_eq!(Key::from_code("KeyE"), Some(Key::KeyE));
        assert_eq!(Key::from_code("ArrowLeft"), Some(Key::ArrowLeft));
        assert_eq!(Key::from_code("KeyQ"), None);
    }

    #[test]
    fn arrows_and_space_suppress_default() {
        assert!(Key::Space.suppresses_default());
        assert!(Key::ArrowUp.suppresses_default());
        assert!(!Key::KeyW.suppresses_default());
    }
}
