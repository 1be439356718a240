//! Per-tick input snapshot
//!
//! Produced by an external input mapper (keyboard, touch, autopilot). The
//! simulation never reads device events directly.

use serde::{Deserialize, Serialize};

/// Input commands for a single tick
///
/// Held controls (`rotate_*`, `thrust`, `fire`) stay set while the key is
/// down. Toggles (`bomb`, `pause_toggle`, `music_toggle`, `restart`) are
/// one-shot: the driver clears them after the first substep that sees them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub rotate_left: bool,
    pub rotate_right: bool,
    /// Analog steering in [-1, 1] (touch stick); added to the digital keys
    pub turn_axis: f32,
    pub thrust: bool,
    pub fire: bool,
    pub bomb: bool,
    pub pause_toggle: bool,
    pub music_toggle: bool,
    pub restart: bool,
}

impl InputSnapshot {
    /// Combined steering in [-1, 1]; positive turns clockwise on screen
    pub fn steering(&self) -> f32 {
        let digital = (self.rotate_right as i8 - self.rotate_left as i8) as f32;
        (digital + self.turn_axis).clamp(-1.0, 1.0)
    }

    /// Whether the analog fields are usable
    pub fn is_well_formed(&self) -> bool {
        self.turn_axis.is_finite() && (-1.0..=1.0).contains(&self.turn_axis)
    }

    /// Replace a malformed snapshot with all-false
    pub fn sanitized(&self) -> InputSnapshot {
        if self.is_well_formed() {
            self.clone()
        } else {
            log::warn!(
                "Discarding malformed input snapshot (turn_axis = {})",
                self.turn_axis
            );
            InputSnapshot::default()
        }
    }

    /// Clear one-shot toggles after they have been consumed
    pub fn clear_one_shots(&mut self) {
        self.bomb = false;
        self.pause_toggle = false;
        self.music_toggle = false;
        self.restart = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steering_combines_keys_and_axis() {
        let input = InputSnapshot {
            rotate_right: true,
            turn_axis: -0.25,
            ..Default::default()
        };
        assert!((input.steering() - 0.75).abs() < 1e-6);

        let both = InputSnapshot {
            rotate_left: true,
            rotate_right: true,
            ..Default::default()
        };
        assert_eq!(both.steering(), 0.0);
    }

    #[test]
    fn test_malformed_axis_becomes_all_false() {
        let input = InputSnapshot {
            fire: true,
            thrust: true,
            turn_axis: f32::NAN,
            ..Default::default()
        };
        assert_eq!(input.sanitized(), InputSnapshot::default());

        let out_of_range = InputSnapshot {
            fire: true,
            turn_axis: 3.0,
            ..Default::default()
        };
        assert_eq!(out_of_range.sanitized(), InputSnapshot::default());
    }

    #[test]
    fn test_clear_one_shots_keeps_held_controls() {
        let mut input = InputSnapshot {
            fire: true,
            thrust: true,
            bomb: true,
            pause_toggle: true,
            restart: true,
            ..Default::default()
        };
        input.clear_one_shots();
        assert!(input.fire && input.thrust);
        assert!(!input.bomb && !input.pause_toggle && !input.restart);
    }
}
