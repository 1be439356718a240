//! Wave controller
//!
//! Spawning → Active → Clearing → (Spawning | BossIntro → Spawning) for the
//! next wave. The controller only runs while the session is Playing, so a
//! pause suspends it in whatever phase it was in.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::entity::{EnemyKind, countdown};
use super::events::{SoundCue, TickOutput};
use super::scoring;
use super::spawner;
use super::state::World;
use crate::tuning::Tuning;

/// Where the current wave is in its lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Releasing queued enemies one per spawn interval
    Spawning {
        queue: VecDeque<EnemyKind>,
        cooldown: f32,
    },
    /// Everything is out; waiting for the arena to be cleared
    Active,
    /// Wave cleared; short breather before the next one
    Clearing { timer: f32 },
    /// Warning period before a boss wave
    BossIntro { timer: f32 },
}

impl WavePhase {
    pub fn label(&self) -> &'static str {
        match self {
            WavePhase::Spawning { .. } => "spawning",
            WavePhase::Active => "active",
            WavePhase::Clearing { .. } => "clearing",
            WavePhase::BossIntro { .. } => "boss_intro",
        }
    }
}

/// Wave number, phase, and the per-wave hit flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveState {
    /// 1-based, strictly increasing
    pub number: u32,
    pub phase: WavePhase,
    /// Set when the ship takes a hit; cancels the flawless bonus
    pub hit_this_wave: bool,
}

impl WaveState {
    /// Wave 1, about to release `queue`
    pub fn new(queue: VecDeque<EnemyKind>) -> Self {
        Self {
            number: 1,
            phase: WavePhase::Spawning {
                queue,
                cooldown: 0.0,
            },
            hit_this_wave: false,
        }
    }

    /// Enemies still waiting to be released
    pub fn pending(&self) -> usize {
        match &self.phase {
            WavePhase::Spawning { queue, .. } => queue.len(),
            _ => 0,
        }
    }
}

/// Advance the wave state machine by `dt`
pub fn advance(world: &mut World, tuning: &Tuning, dt: f32, out: &mut TickOutput) {
    let phase = std::mem::replace(&mut world.wave.phase, WavePhase::Active);
    world.wave.phase = match phase {
        WavePhase::Spawning {
            mut queue,
            mut cooldown,
        } => {
            countdown(&mut cooldown, dt);
            if cooldown == 0.0 {
                if let Some(kind) = queue.pop_front() {
                    spawner::spawn(world, kind, tuning);
                    cooldown = tuning.waves.spawn_interval;
                }
            }
            if queue.is_empty() {
                WavePhase::Active
            } else {
                WavePhase::Spawning { queue, cooldown }
            }
        }
        WavePhase::Active => {
            if world.alive_enemy_count() == 0 {
                complete_wave(world, tuning, out);
                WavePhase::Clearing {
                    timer: tuning.waves.clear_delay,
                }
            } else {
                WavePhase::Active
            }
        }
        WavePhase::Clearing { mut timer } => {
            countdown(&mut timer, dt);
            if timer > 0.0 {
                WavePhase::Clearing { timer }
            } else {
                begin_next_wave(world, tuning, out)
            }
        }
        WavePhase::BossIntro { mut timer } => {
            countdown(&mut timer, dt);
            if timer > 0.0 {
                WavePhase::BossIntro { timer }
            } else {
                let queue = spawner::plan_wave(world.wave.number, tuning, &mut world.rng);
                WavePhase::Spawning {
                    queue,
                    cooldown: 0.0,
                }
            }
        }
    };
}

/// Award the clear bonus for the current wave
fn complete_wave(world: &mut World, tuning: &Tuning, out: &mut TickOutput) {
    let number = world.wave.number;
    let flawless = !world.wave.hit_this_wave;
    let mut bonus = scoring::wave_clear_bonus(number, flawless);
    if spawner::is_boss_wave(number, tuning) {
        bonus += tuning.scoring.boss_clear_bonus;
    }
    world.score.add_bonus(bonus);
    log::info!(
        "Wave {} cleared{}: +{}",
        number,
        if flawless { " (flawless)" } else { "" },
        bonus
    );
    out.sounds.push(SoundCue::WaveComplete);
    if scoring::grant_extra_lives(world, tuning) {
        out.sounds.push(SoundCue::ExtraLife);
    }
}

/// Bump the wave number and pick the phase it opens with
fn begin_next_wave(world: &mut World, tuning: &Tuning, out: &mut TickOutput) -> WavePhase {
    world.wave.number += 1;
    world.wave.hit_this_wave = false;
    let number = world.wave.number;

    if spawner::is_boss_wave(number, tuning) {
        log::info!("Wave {}: boss incoming", number);
        out.sounds.push(SoundCue::BossIncoming);
        WavePhase::BossIntro {
            timer: tuning.waves.boss_intro_delay,
        }
    } else {
        log::info!("Wave {} starting", number);
        let queue = spawner::plan_wave(number, tuning, &mut world.rng);
        WavePhase::Spawning {
            queue,
            cooldown: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn cleared_world(number: u32) -> (World, Tuning) {
        let tuning = Tuning::default();
        let mut world = World::new(8, &tuning);
        world.wave.number = number;
        world.wave.phase = WavePhase::Active;
        (world, tuning)
    }

    #[test]
    fn test_flawless_clear_doubles_bonus() {
        let (mut world, tuning) = cleared_world(3);
        let mut out = TickOutput::default();
        advance(&mut world, &tuning, SIM_DT, &mut out);
        assert_eq!(world.score.score, 3000);
        assert!(matches!(world.wave.phase, WavePhase::Clearing { .. }));
        assert!(out.sounds.contains(&SoundCue::WaveComplete));
    }

    #[test]
    fn test_hit_wave_gets_base_bonus() {
        let (mut world, tuning) = cleared_world(3);
        world.wave.hit_this_wave = true;
        advance(&mut world, &tuning, SIM_DT, &mut TickOutput::default());
        assert_eq!(world.score.score, 1500);
    }

    #[test]
    fn test_boss_clear_adds_boss_bonus() {
        let (mut world, tuning) = cleared_world(5);
        advance(&mut world, &tuning, SIM_DT, &mut TickOutput::default());
        assert_eq!(world.score.score, 5000 + tuning.scoring.boss_clear_bonus);
    }

    #[test]
    fn test_spawning_releases_one_per_interval() {
        let tuning = Tuning::default();
        let mut world = World::new(8, &tuning);
        let planned = world.wave.pending();
        let mut out = TickOutput::default();

        advance(&mut world, &tuning, SIM_DT, &mut out);
        assert_eq!(world.enemies.len(), 1);
        advance(&mut world, &tuning, SIM_DT, &mut out);
        assert_eq!(world.enemies.len(), 1);

        for _ in 0..(planned * 40) {
            advance(&mut world, &tuning, SIM_DT, &mut out);
        }
        assert_eq!(world.enemies.len(), planned);
        assert_eq!(world.wave.phase, WavePhase::Active);
    }

    #[test]
    fn test_active_waits_for_living_enemies() {
        let (mut world, tuning) = cleared_world(2);
        spawner::spawn(&mut world, EnemyKind::LegacyTower, &tuning);
        advance(&mut world, &tuning, SIM_DT, &mut TickOutput::default());
        assert_eq!(world.wave.phase, WavePhase::Active);

        // Flagged dead but not yet cleaned up still counts as cleared
        world.enemies[0].body.alive = false;
        advance(&mut world, &tuning, SIM_DT, &mut TickOutput::default());
        assert!(matches!(world.wave.phase, WavePhase::Clearing { .. }));
    }

    #[test]
    fn test_boss_intro_then_single_jammer() {
        let (mut world, tuning) = cleared_world(4);
        world.wave.hit_this_wave = true;
        let mut out = TickOutput::default();
        advance(&mut world, &tuning, SIM_DT, &mut out);
        advance(&mut world, &tuning, tuning.waves.clear_delay, &mut out);
        assert_eq!(world.wave.number, 5);
        assert!(!world.wave.hit_this_wave);
        assert!(matches!(world.wave.phase, WavePhase::BossIntro { .. }));
        assert!(out.sounds.contains(&SoundCue::BossIncoming));

        advance(&mut world, &tuning, tuning.waves.boss_intro_delay, &mut out);
        assert_eq!(
            world.wave.phase,
            WavePhase::Spawning {
                queue: VecDeque::from([EnemyKind::SpectrumJammer]),
                cooldown: 0.0,
            }
        );
        advance(&mut world, &tuning, SIM_DT, &mut out);
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.enemies[0].kind(), EnemyKind::SpectrumJammer);
    }

    #[test]
    fn test_wave_number_strictly_increases() {
        let tuning = Tuning::default();
        let mut world = World::new(21, &tuning);
        let mut out = TickOutput::default();
        let mut last = world.wave.number;
        let mut seen = Vec::new();
        for _ in 0..20_000 {
            advance(&mut world, &tuning, SIM_DT, &mut out);
            // Clear the arena as soon as anything appears
            for e in &mut world.enemies {
                e.body.alive = false;
            }
            world.cleanup();
            assert!(world.wave.number >= last);
            if world.wave.number > last {
                assert_eq!(world.wave.number, last + 1);
                seen.push(world.wave.number);
                last = world.wave.number;
            }
            if last >= 11 {
                break;
            }
        }
        assert_eq!(seen, (2..=11).collect::<Vec<_>>());
    }
}
