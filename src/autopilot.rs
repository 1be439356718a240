//! Autopilot
//!
//! A simple bot that reads the session and produces the input a player
//! would. Drives the native runner and the long soak tests.

use glam::Vec2;

use crate::normalize_angle;
use crate::sim::{GamePhase, InputSnapshot, Session};
use crate::tuning::Tuning;

/// Heading error (radians) under which the bot pulls the trigger
const AIM_TOLERANCE: f32 = 0.12;
/// Threats closer than this make the bot thrust away
const EVADE_DISTANCE: f32 = 110.0;
/// Power-ups closer than this are worth a detour
const PICKUP_DISTANCE: f32 = 160.0;
/// Enemies within this radius count toward crowding
const CROWD_RADIUS: f32 = 140.0;
const CROWD_COUNT: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    /// Steps spent in the current non-playing phase
    idle_steps: u32,
    last_phase: Option<GamePhase>,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input for the next fixed step
    pub fn input_for(&mut self, session: &Session, tuning: &Tuning) -> InputSnapshot {
        if self.last_phase != Some(session.phase) {
            self.idle_steps = 0;
            self.last_phase = Some(session.phase);
        }
        self.idle_steps = self.idle_steps.saturating_add(1);

        match session.phase {
            GamePhase::Title => InputSnapshot {
                fire: true,
                ..Default::default()
            },
            GamePhase::Paused => InputSnapshot {
                pause_toggle: true,
                ..Default::default()
            },
            // Linger on the game-over screen for a moment
            GamePhase::GameOver => InputSnapshot {
                restart: self.idle_steps > 30,
                ..Default::default()
            },
            GamePhase::Playing => self.fly(session, tuning),
        }
    }

    fn fly(&self, session: &Session, tuning: &Tuning) -> InputSnapshot {
        let world = &session.world;
        let arena = world.arena;
        let ship = &world.player;
        let pos = ship.body.pos;

        let mut input = InputSnapshot::default();

        let nearest_enemy = world
            .enemies
            .iter()
            .filter(|e| e.body.alive)
            .map(|e| (arena.delta(pos, e.body.pos), e.body.radius))
            .min_by(|a, b| a.0.length_squared().total_cmp(&b.0.length_squared()));

        let nearest_shot = world
            .projectiles
            .iter()
            .filter(|p| p.body.alive && !p.from_player())
            .map(|p| arena.delta(pos, p.body.pos))
            .min_by(|a, b| a.length_squared().total_cmp(&b.length_squared()));

        let nearest_pickup = world
            .power_ups
            .iter()
            .filter(|p| p.body.alive)
            .map(|p| arena.delta(pos, p.body.pos))
            .filter(|d| d.length() < PICKUP_DISTANCE)
            .min_by(|a, b| a.length_squared().total_cmp(&b.length_squared()));

        // Closest thing that can hurt us, measured edge to edge
        let threat = nearest_enemy
            .map(|(d, r)| (d, d.length() - r))
            .into_iter()
            .chain(nearest_shot.map(|d| (d, d.length())))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let crowd = world
            .enemies
            .iter()
            .filter(|e| e.body.alive && arena.distance(pos, e.body.pos) < CROWD_RADIUS)
            .count();
        if crowd >= CROWD_COUNT && ship.bombs > 0 && !ship.shielded() {
            input.bomb = true;
        }

        let evading = match threat {
            Some((_, gap)) => gap < EVADE_DISTANCE && !ship.shielded() && !ship.is_invulnerable(),
            None => false,
        };

        let target = if evading {
            // Point away from the threat and run
            threat.map(|(d, _)| -d)
        } else if let Some(pickup) = nearest_pickup {
            Some(pickup)
        } else {
            nearest_enemy.map(|(d, _)| d)
        };

        let Some(target) = target else {
            return input;
        };

        let error = heading_error(ship.heading, target);
        steer(&mut input, error, tuning);

        let aligned = error.abs() < AIM_TOLERANCE;
        if let Some((d, _)) = nearest_enemy {
            // Keep shooting while turning toward an enemy that is roughly ahead
            input.fire = heading_error(ship.heading, d).abs() < AIM_TOLERANCE * 2.0;
        }
        input.thrust = aligned && (evading || nearest_pickup.is_some());
        input
    }
}

/// Signed turn (radians) from `heading` to face `direction`
fn heading_error(heading: f32, direction: Vec2) -> f32 {
    if direction.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    normalize_angle(direction.y.atan2(direction.x) - heading)
}

/// Analog turn toward the error, easing off near zero so the ship doesn't
/// oscillate past the target
fn steer(input: &mut InputSnapshot, error: f32, tuning: &Tuning) {
    let full_turn = tuning.player.turn_rate * crate::consts::SIM_DT;
    input.turn_axis = (error / full_turn.max(f32::EPSILON)).clamp(-1.0, 1.0);
}
