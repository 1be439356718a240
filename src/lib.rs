//! Signal Strike - A wrap-around arena arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, waves, scoring)
//! - `game_loop`: Fixed-timestep driver feeding the render/audio sinks
//! - `platform`: Sink traits and browser/headless collaborators
//! - `persistence`: High-score storage backends
//! - `tuning`: Data-driven game balance

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod autopilot;
pub mod game_loop;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game_loop::GameLoop;
pub use highscores::HighScore;
pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest real frame delta the driver will accumulate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along a heading (radians, 0 = +x)
#[inline]
pub fn heading_vector(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}

/// Rotate a vector by an angle (radians)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps_into_range() {
        assert!((normalize_angle(3.0 * PI + 0.5) - (-PI + 0.5)).abs() < 1e-5);
        // An odd multiple of pi lands on either end of the range after rounding
        let odd = normalize_angle(3.0 * PI);
        assert!((-PI..PI).contains(&odd));
        assert!((odd.abs() - PI).abs() < 1e-5);
        assert!((normalize_angle(-3.5 * PI) - (0.5 * PI)).abs() < 1e-5);
        assert_eq!(normalize_angle(0.25), 0.25);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::X, PI / 2.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 1.0).abs() < 1e-5);
    }
}
