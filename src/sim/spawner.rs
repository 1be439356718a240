//! Wave composition and enemy placement

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{AttackPattern, Behavior, Body, Enemy, EnemyKind, EntityId};
use super::geometry::{Arena, wrap_coord};
use super::state::World;
use crate::tuning::Tuning;

/// Boss waves land on every multiple of `boss_every`
pub fn is_boss_wave(wave: u32, tuning: &Tuning) -> bool {
    wave > 0 && wave % tuning.waves.boss_every == 0
}

/// 1-based count of boss waves up to and including `wave`
pub fn boss_index(wave: u32, tuning: &Tuning) -> u32 {
    (wave / tuning.waves.boss_every).max(1)
}

/// Enemy speed multiplier for a wave
pub fn speed_scale(wave: u32, tuning: &Tuning) -> f32 {
    let ramp = 1.0 + tuning.waves.speed_ramp * wave.saturating_sub(1) as f32;
    ramp.min(tuning.waves.max_speed_scale)
}

/// Number of regular enemies queued for a wave
pub fn wave_size(wave: u32, tuning: &Tuning) -> u32 {
    let waves = &tuning.waves;
    waves
        .base_count
        .saturating_add(wave.saturating_mul(waves.per_wave))
        .min(waves.max_count)
        .max(1)
}

/// Spawn weights for regular kinds unlocked by `wave`
fn kind_weights(wave: u32) -> [(EnemyKind, u32); 4] {
    [
        (EnemyKind::SignalDisruptor, 4),
        (EnemyKind::NetworkNode, 4),
        (EnemyKind::DataPacket, if wave >= 2 { 2 } else { 0 }),
        (
            EnemyKind::LegacyTower,
            if wave >= 3 { (2 + wave / 4).min(5) } else { 0 },
        ),
    ]
}

/// Decide which enemies a wave releases, in order
///
/// Boss waves release exactly one Spectrum Jammer. Regular waves always
/// open with a Network Node.
pub fn plan_wave(wave: u32, tuning: &Tuning, rng: &mut Pcg32) -> VecDeque<EnemyKind> {
    if is_boss_wave(wave, tuning) {
        return VecDeque::from([EnemyKind::SpectrumJammer]);
    }

    let weights = kind_weights(wave);
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    let count = wave_size(wave, tuning);

    let mut plan = VecDeque::with_capacity(count as usize);
    plan.push_back(EnemyKind::NetworkNode);
    while plan.len() < count as usize {
        let mut roll = rng.random_range(0..total);
        for &(kind, weight) in &weights {
            if roll < weight {
                plan.push_back(kind);
                break;
            }
            roll -= weight;
        }
    }
    plan
}

/// Build an enemy of `kind` for `wave` at `pos`, heading in a random direction
pub fn build_enemy(kind: EnemyKind, wave: u32, pos: Vec2, tuning: &Tuning, rng: &mut Pcg32) -> Enemy {
    let roster = &tuning.enemies;
    let stats = roster.stats(kind);
    let speed = stats.speed * speed_scale(wave, tuning);
    let angle = rng.random_range(0.0..std::f32::consts::TAU);

    let (behavior, health) = match kind {
        EnemyKind::SignalDisruptor => (
            Behavior::Seeker {
                turn_rate: roster.disruptor_turn_rate,
            },
            stats.health,
        ),
        EnemyKind::DataPacket => (Behavior::Courier, stats.health),
        EnemyKind::NetworkNode => (Behavior::Splitter { generation: 0 }, stats.health),
        EnemyKind::LegacyTower => {
            let spin = rng.random_range(-roster.tower_max_spin..=roster.tower_max_spin);
            (Behavior::Tumbler { spin }, stats.health)
        }
        EnemyKind::SpectrumJammer => (
            Behavior::Jammer {
                pattern: AttackPattern::RadialBurst,
                attack_cooldown: roster.jammer_attack_interval,
                volleys: 0,
            },
            stats.health.saturating_add(
                roster
                    .boss_health_per_cycle
                    .saturating_mul(boss_index(wave, tuning) - 1),
            ),
        ),
    };

    Enemy {
        id: EntityId(0),
        body: Body::new(pos, Vec2::from_angle(angle) * speed, stats.radius),
        health,
        points: stats.points,
        speed,
        rotation: angle,
        behavior,
    }
}

/// Fallback spawn point: the top-edge point horizontally opposite the ship
pub fn default_edge_position(arena: &Arena, player_pos: Vec2) -> Vec2 {
    Vec2::new(wrap_coord(player_pos.x + arena.width * 0.5, arena.width), 0.0)
}

/// Pick a spawn point on the arena seam away from the ship
///
/// Tries `placement_attempts` random seam points, then falls back to the
/// default edge position. Never loops unbounded.
pub fn choose_spawn_point(world: &mut World, radius: f32, tuning: &Tuning) -> Vec2 {
    let arena = world.arena;
    let player_pos = world.player.body.pos;
    let clearance = tuning.waves.safe_radius + radius;

    for _ in 0..tuning.waves.placement_attempts {
        let candidate = if world.rng.random_bool(0.5) {
            Vec2::new(world.rng.random_range(0.0..arena.width), 0.0)
        } else {
            Vec2::new(0.0, world.rng.random_range(0.0..arena.height))
        };
        let clear_of_ship = arena.distance(candidate, player_pos) >= clearance;
        let clear_of_enemies = world
            .enemies
            .iter()
            .filter(|e| e.body.alive)
            .all(|e| !arena.circles_overlap(candidate, radius, e.body.pos, e.body.radius));
        if clear_of_ship && clear_of_enemies {
            return candidate;
        }
    }

    let fallback = default_edge_position(&arena, player_pos);
    log::debug!("Spawn placement exhausted, using edge fallback {:?}", fallback);
    fallback
}

/// Place and add one enemy of `kind` for the current wave
pub fn spawn(world: &mut World, kind: EnemyKind, tuning: &Tuning) -> EntityId {
    let radius = tuning.enemies.stats(kind).radius;
    let pos = choose_spawn_point(world, radius, tuning);
    let wave = world.wave.number;
    let enemy = build_enemy(kind, wave, pos, tuning, &mut world.rng);
    let id = world.add_enemy(enemy);
    log::debug!("Wave {}: spawned {:?} #{} at {:?}", wave, kind, id.0, pos);
    id
}
