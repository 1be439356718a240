//! Keyboard → input snapshot mapping
//!
//! Arrow keys / WASD steer and thrust, Space fires, B bombs, Escape or P
//! pauses, M toggles music, Enter or R restarts. Held keys are level
//! triggered; toggles latch until the next `take_snapshot`.

use crate::sim::InputSnapshot;

#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    left: bool,
    right: bool,
    thrust: bool,
    fire: bool,
    pending: InputSnapshot,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a keydown; `repeat` is the browser's auto-repeat flag.
    /// Returns true if the key is bound.
    pub fn key_down(&mut self, key: &str, repeat: bool) -> bool {
        match key {
            "ArrowLeft" | "a" | "A" => self.left = true,
            "ArrowRight" | "d" | "D" => self.right = true,
            "ArrowUp" | "w" | "W" => self.thrust = true,
            " " => self.fire = true,
            _ if repeat => return Self::is_toggle(key),
            "b" | "B" | "x" | "X" => self.pending.bomb = true,
            "Escape" | "p" | "P" => self.pending.pause_toggle = true,
            "m" | "M" => self.pending.music_toggle = true,
            "Enter" | "r" | "R" => self.pending.restart = true,
            _ => return false,
        }
        true
    }

    /// Handle a keyup
    pub fn key_up(&mut self, key: &str) {
        match key {
            "ArrowLeft" | "a" | "A" => self.left = false,
            "ArrowRight" | "d" | "D" => self.right = false,
            "ArrowUp" | "w" | "W" => self.thrust = false,
            " " => self.fire = false,
            _ => {}
        }
    }

    /// Release everything (window lost focus)
    pub fn release_all(&mut self) {
        self.left = false;
        self.right = false;
        self.thrust = false;
        self.fire = false;
    }

    /// Current held keys plus any latched toggles; clears the latches
    pub fn take_snapshot(&mut self) -> InputSnapshot {
        let mut snapshot = std::mem::take(&mut self.pending);
        snapshot.rotate_left = self.left;
        snapshot.rotate_right = self.right;
        snapshot.thrust = self.thrust;
        snapshot.fire = self.fire;
        snapshot
    }

    fn is_toggle(key: &str) -> bool {
        matches!(
            key,
            "b" | "B" | "x" | "X" | "Escape" | "p" | "P" | "m" | "M" | "Enter" | "r" | "R"
        )
    }
}
