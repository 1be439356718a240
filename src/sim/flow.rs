//! Game-flow state machine
//!
//! Title → Playing → (Paused ⇄ Playing) → GameOver → Title. Only Playing
//! runs the simulation; every other phase leaves the World untouched.

use serde::{Deserialize, Serialize};

use super::events::{SoundCue, TickOutput};
use super::input::InputSnapshot;
use super::state::World;
use super::tick::tick_into;
use crate::tuning::Tuning;

/// Top-level game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Title,
    Playing,
    Paused,
    GameOver,
}

impl GamePhase {
    pub fn label(self) -> &'static str {
        match self {
            GamePhase::Title => "title",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "game_over",
        }
    }
}

/// One play session: the flow phase plus the World it drives
#[derive(Debug, Clone)]
pub struct Session {
    pub phase: GamePhase,
    pub world: World,
    base_seed: u64,
    games_started: u64,
}

impl Session {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            phase: GamePhase::Title,
            world: World::new(seed, tuning),
            base_seed: seed,
            games_started: 0,
        }
    }

    /// Seed the next game will be played with
    fn upcoming_seed(&self) -> u64 {
        self.base_seed.wrapping_add(self.games_started)
    }

    /// Reuses the title World when it was built for this seed and never ticked
    fn start_game(&mut self, tuning: &Tuning) {
        let seed = self.upcoming_seed();
        self.games_started += 1;
        if self.world.seed != seed || self.world.tick_count != 0 {
            self.world = World::new(seed, tuning);
        }
        self.phase = GamePhase::Playing;
        log::info!("Game started (seed {})", seed);
    }

    /// Advance the flow machine by one fixed step
    pub fn step(&mut self, input: &InputSnapshot, tuning: &Tuning, dt: f32, out: &mut TickOutput) {
        match self.phase {
            GamePhase::Title => {
                if input.fire || input.restart {
                    self.start_game(tuning);
                }
            }
            GamePhase::Playing => {
                if input.pause_toggle {
                    self.phase = GamePhase::Paused;
                    log::debug!("Paused");
                    return;
                }
                tick_into(&mut self.world, input, tuning, dt, out);
                if self.world.lives == 0 {
                    self.phase = GamePhase::GameOver;
                    out.sounds.push(SoundCue::GameOver);
                    log::info!(
                        "Game over: score {} on wave {}",
                        self.world.score.score,
                        self.world.wave.number
                    );
                }
            }
            GamePhase::Paused => {
                if input.pause_toggle {
                    self.phase = GamePhase::Playing;
                    log::debug!("Resumed");
                }
            }
            GamePhase::GameOver => {
                if input.restart {
                    self.world = World::new(self.upcoming_seed(), tuning);
                    self.phase = GamePhase::Title;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn press(f: impl FnOnce(&mut InputSnapshot)) -> InputSnapshot {
        let mut input = InputSnapshot::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_title_waits_for_fire() {
        let tuning = Tuning::default();
        let mut session = Session::new(1, &tuning);
        let mut out = TickOutput::default();
        session.step(&InputSnapshot::default(), &tuning, SIM_DT, &mut out);
        assert_eq!(session.phase, GamePhase::Title);
        assert_eq!(session.world.tick_count, 0);

        session.step(&press(|i| i.fire = true), &tuning, SIM_DT, &mut out);
        assert_eq!(session.phase, GamePhase::Playing);
        session.step(&InputSnapshot::default(), &tuning, SIM_DT, &mut out);
        assert_eq!(session.world.tick_count, 1);
    }

    #[test]
    fn test_pause_suspends_simulation() {
        let tuning = Tuning::default();
        let mut session = Session::new(1, &tuning);
        let mut out = TickOutput::default();
        session.step(&press(|i| i.restart = true), &tuning, SIM_DT, &mut out);
        session.step(&InputSnapshot::default(), &tuning, SIM_DT, &mut out);

        let pause = press(|i| i.pause_toggle = true);
        session.step(&pause, &tuning, SIM_DT, &mut out);
        assert_eq!(session.phase, GamePhase::Paused);
        let ticks = session.world.tick_count;
        let wave = session.world.wave.clone();
        for _ in 0..30 {
            session.step(&InputSnapshot::default(), &tuning, SIM_DT, &mut out);
        }
        assert_eq!(session.world.tick_count, ticks);
        assert_eq!(session.world.wave, wave);

        session.step(&pause, &tuning, SIM_DT, &mut out);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.world.tick_count, ticks);
    }

    #[test]
    fn test_last_life_ends_game() {
        let tuning = Tuning::default();
        let mut session = Session::new(1, &tuning);
        let mut out = TickOutput::default();
        session.step(&press(|i| i.fire = true), &tuning, SIM_DT, &mut out);
        session.world.lives = 0;
        out.clear();
        session.step(&InputSnapshot::default(), &tuning, SIM_DT, &mut out);
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(out.sounds.last(), Some(&SoundCue::GameOver));

        // Frozen until restart
        let ticks = session.world.tick_count;
        session.step(&press(|i| i.fire = true), &tuning, SIM_DT, &mut out);
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(session.world.tick_count, ticks);

        session.step(&press(|i| i.restart = true), &tuning, SIM_DT, &mut out);
        assert_eq!(session.phase, GamePhase::Title);
        assert_eq!(session.world.lives, tuning.player.start_lives);
        assert_eq!(session.world.score.score, 0);
    }

    #[test]
    fn test_each_game_gets_a_new_seed() {
        let tuning = Tuning::default();
        let mut session = Session::new(50, &tuning);
        let mut out = TickOutput::default();
        session.step(&press(|i| i.fire = true), &tuning, SIM_DT, &mut out);
        let first = session.world.seed;
        session.world.lives = 0;
        session.step(&InputSnapshot::default(), &tuning, SIM_DT, &mut out);
        session.step(&press(|i| i.restart = true), &tuning, SIM_DT, &mut out);
        session.step(&press(|i| i.fire = true), &tuning, SIM_DT, &mut out);
        assert_ne!(session.world.seed, first);
    }

    #[test]
    fn test_title_world_after_game_over_is_the_next_game() {
        let tuning = Tuning::default();
        let mut session = Session::new(7, &tuning);
        let mut out = TickOutput::default();
        session.step(&press(|i| i.fire = true), &tuning, SIM_DT, &mut out);
        assert_eq!(session.world.seed, 7);
        session.world.lives = 0;
        session.step(&InputSnapshot::default(), &tuning, SIM_DT, &mut out);
        assert_eq!(session.phase, GamePhase::GameOver);

        session.step(&press(|i| i.restart = true), &tuning, SIM_DT, &mut out);
        assert_eq!(session.phase, GamePhase::Title);
        let title_seed = session.world.seed;
        let title_player = session.world.player.body.pos;
        assert_eq!(session.world.tick_count, 0);

        session.step(&press(|i| i.fire = true), &tuning, SIM_DT, &mut out);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.world.seed, title_seed);
        assert_eq!(session.world.seed, 8);
        assert_eq!(session.world.player.body.pos, title_player);
        assert_eq!(session.world.tick_count, 0);
    }
}
