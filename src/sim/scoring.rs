//! Score and combo engine
//!
//! A kill inside the open combo window raises the multiplier by one (capped
//! at 8), otherwise the multiplier restarts at 1. The multiplier is updated
//! before the kill is scored. Taking a hit closes the window.

use serde::{Deserialize, Serialize};

use super::entity::countdown;
use super::events::{GameEvent, SoundCue, TickOutput};
use super::state::World;
use crate::tuning::Tuning;

/// Hard ceiling for the combo multiplier
pub const MAX_MULTIPLIER: u32 = 8;
/// Wave-clear bonus per wave number
pub const WAVE_CLEAR_BONUS: u64 = 500;
/// Bonus factor for clearing a wave without taking damage
pub const FLAWLESS_FACTOR: u64 = 2;

/// Score, multiplier, and combo timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    /// Always in [1, MAX_MULTIPLIER]
    pub multiplier: u32,
    /// Seconds left in the combo window (0 = closed)
    pub combo_timer: f32,
    /// Score that awards the next extra life (0 = disabled)
    pub next_extra_life: u64,
}

impl ScoreState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            multiplier: 1,
            combo_timer: 0.0,
            next_extra_life: tuning.scoring.extra_life_every,
        }
    }

    /// Credit a kill; returns the points actually added
    pub fn register_kill(&mut self, points: u32, combo_window: f32) -> u64 {
        if self.combo_timer > 0.0 {
            self.multiplier = (self.multiplier + 1).min(MAX_MULTIPLIER);
        } else {
            self.multiplier = 1;
        }
        self.combo_timer = combo_window;
        let gained = points as u64 * self.multiplier as u64;
        self.score = self.score.saturating_add(gained);
        gained
    }

    /// Ship took damage: combo is lost
    pub fn register_hit(&mut self) {
        self.multiplier = 1;
        self.combo_timer = 0.0;
    }

    /// Advance the combo window; expiry resets the multiplier
    pub fn tick(&mut self, dt: f32) {
        if self.combo_timer > 0.0 {
            countdown(&mut self.combo_timer, dt);
            if self.combo_timer == 0.0 {
                self.multiplier = 1;
            }
        }
    }

    /// Flat bonus (wave clear, boss); never decreases the score
    pub fn add_bonus(&mut self, bonus: u64) {
        self.score = self.score.saturating_add(bonus);
    }

    /// Number of extra lives earned by the current score
    pub fn claim_extra_lives(&mut self, step: u64) -> u32 {
        if step == 0 || self.next_extra_life == 0 {
            return 0;
        }
        let mut earned = 0;
        while self.score >= self.next_extra_life {
            earned += 1;
            self.next_extra_life = self.next_extra_life.saturating_add(step);
        }
        earned
    }
}

/// Wave-clear bonus: 500 × wave, doubled for a flawless wave
pub fn wave_clear_bonus(wave: u32, flawless: bool) -> u64 {
    let base = WAVE_CLEAR_BONUS * wave as u64;
    if flawless { base * FLAWLESS_FACTOR } else { base }
}

/// Consume this tick's destruction and hit events
pub fn apply(world: &mut World, tuning: &Tuning, out: &mut TickOutput) {
    for event in &out.events {
        match event {
            GameEvent::Destruction(d) => {
                let gained = world.score.register_kill(d.points, tuning.scoring.combo_window);
                log::trace!(
                    "{:?} destroyed: +{} (x{})",
                    d.kind,
                    gained,
                    world.score.multiplier
                );
            }
            GameEvent::Hit(_) => {
                world.score.register_hit();
                world.wave.hit_this_wave = true;
            }
            GameEvent::Pickup(_) => {}
        }
    }
    if grant_extra_lives(world, tuning) {
        out.sounds.push(SoundCue::ExtraLife);
    }
}

/// Convert score milestones into lives, capped at the maximum.
/// Returns true if a life was actually added.
pub fn grant_extra_lives(world: &mut World, tuning: &Tuning) -> bool {
    let earned = world.score.claim_extra_lives(tuning.scoring.extra_life_every);
    if earned == 0 {
        return false;
    }
    let lives = (world.lives as u32 + earned).min(tuning.player.max_lives as u32) as u8;
    if lives > world.lives {
        log::info!("Extra life! ({} -> {})", world.lives, lives);
        world.lives = lives;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{EnemyKind, EntityId};
    use crate::sim::events::{DestructionEvent, HitEvent};
    use glam::Vec2;
    use proptest::prelude::*;

    fn fresh() -> ScoreState {
        ScoreState::new(&Tuning::default())
    }

    fn kill(points: u32) -> GameEvent {
        GameEvent::Destruction(DestructionEvent {
            enemy: EntityId(1),
            kind: EnemyKind::SignalDisruptor,
            position: Vec2::ZERO,
            points,
        })
    }

    #[test]
    fn test_first_kill_scores_at_one() {
        let mut s = fresh();
        assert_eq!(s.register_kill(100, 2.0), 100);
        assert_eq!(s.score, 100);
        assert_eq!(s.multiplier, 1);
    }

    #[test]
    fn test_combo_builds_then_expires() {
        // Kills 1s apart inside a 2s window, then a kill 3s later
        let mut s = fresh();
        s.register_kill(100, 2.0);
        s.tick(1.0);
        s.register_kill(100, 2.0);
        assert_eq!(s.multiplier, 2);
        assert_eq!(s.score, 300);

        s.tick(3.0);
        assert_eq!(s.multiplier, 1);
        s.register_kill(100, 2.0);
        assert_eq!(s.multiplier, 1);
        assert_eq!(s.score, 400);
    }

    #[test]
    fn test_multiplier_caps_at_eight() {
        let mut s = fresh();
        for _ in 0..20 {
            s.register_kill(10, 2.0);
        }
        assert_eq!(s.multiplier, MAX_MULTIPLIER);
    }

    #[test]
    fn test_hit_resets_combo() {
        let mut s = fresh();
        s.register_kill(10, 2.0);
        s.register_kill(10, 2.0);
        s.register_hit();
        assert_eq!(s.multiplier, 1);
        assert_eq!(s.combo_timer, 0.0);
        assert_eq!(s.score, 30);
    }

    #[test]
    fn test_wave_clear_bonus() {
        assert_eq!(wave_clear_bonus(3, true), 3000);
        assert_eq!(wave_clear_bonus(3, false), 1500);
        assert_eq!(wave_clear_bonus(1, false), 500);
    }

    #[test]
    fn test_extra_lives_claimed_once_per_step() {
        let mut s = fresh();
        s.add_bonus(25_000);
        assert_eq!(s.claim_extra_lives(10_000), 2);
        assert_eq!(s.claim_extra_lives(10_000), 0);
        assert_eq!(s.next_extra_life, 30_000);
    }

    #[test]
    fn test_apply_consumes_events() {
        let tuning = Tuning::default();
        let mut world = World::new(5, &tuning);
        let mut out = TickOutput::default();
        out.events.push(kill(100));
        out.events.push(kill(100));
        apply(&mut world, &tuning, &mut out);
        assert_eq!(world.score.score, 300);
        assert_eq!(world.score.multiplier, 2);

        out.clear();
        out.events.push(GameEvent::Hit(HitEvent {
            position: Vec2::ZERO,
            lives_left: 2,
        }));
        apply(&mut world, &tuning, &mut out);
        assert_eq!(world.score.multiplier, 1);
        assert!(world.wave.hit_this_wave);
    }

    #[test]
    fn test_extra_life_respects_max() {
        let tuning = Tuning::default();
        let mut world = World::new(5, &tuning);
        world.lives = tuning.player.max_lives;
        world.score.add_bonus(50_000);
        assert!(!grant_extra_lives(&mut world, &tuning));
        assert_eq!(world.lives, tuning.player.max_lives);
    }

    #[derive(Debug, Clone)]
    enum Step {
        Kill(u32),
        Wait(f32),
        Hit,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (1u32..2000).prop_map(Step::Kill),
            (0.0f32..3.0).prop_map(Step::Wait),
            Just(Step::Hit),
        ]
    }

    proptest! {
        #[test]
        fn prop_multiplier_bounded_and_score_monotonic(steps in prop::collection::vec(step(), 1..200)) {
            let mut s = fresh();
            let mut last_score = 0;
            for st in steps {
                let before = s.multiplier;
                let window_open = s.combo_timer > 0.0;
                match st {
                    Step::Kill(p) => {
                        s.register_kill(p, 2.0);
                        if window_open {
                            prop_assert!(s.multiplier >= before);
                        } else {
                            prop_assert_eq!(s.multiplier, 1);
                        }
                    }
                    Step::Wait(dt) => s.tick(dt),
                    Step::Hit => {
                        s.register_hit();
                        prop_assert_eq!(s.multiplier, 1);
                    }
                }
                prop_assert!((1..=MAX_MULTIPLIER).contains(&s.multiplier));
                prop_assert!(s.combo_timer >= 0.0);
                prop_assert!(s.score >= last_score);
                last_score = s.score;
            }
        }
    }
}
