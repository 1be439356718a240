//! Collision stage
//!
//! Circle-circle overlap on the torus between distinct pair categories:
//! player shots × enemies, ship × enemies and enemy shots, ship × power-ups.
//! Kills are resolved after the pair pass, so split children and drops are
//! appended without disturbing the iteration.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Behavior, Body, Enemy, EnemyKind, EntityId, Player, PowerUpKind, Tint};
use super::events::{DestructionEvent, GameEvent, HitEvent, PickupEvent, SoundCue, TickOutput};
use super::state::World;
use crate::rotate;
use crate::tuning::Tuning;

/// Speed multiplier applied to split children
pub const SPLIT_SPEED_FACTOR: f32 = 1.25;
/// Divergence angle range for split children (radians)
pub const SPLIT_ANGLE_MIN: f32 = 0.35;
pub const SPLIT_ANGLE_MAX: f32 = 1.0;

const DEBRIS_SPEED: f32 = 140.0;

/// Run every collision category for this tick
pub fn run(world: &mut World, tuning: &Tuning, out: &mut TickOutput) {
    shots_vs_enemies(world, tuning, out);
    ship_vs_threats(world, tuning, out);
    ship_vs_power_ups(world, tuning, out);
}

/// Player projectiles against enemies: each shot damages at most one enemy
fn shots_vs_enemies(world: &mut World, tuning: &Tuning, out: &mut TickOutput) {
    let arena = world.arena;
    let mut destroyed = Vec::new();

    for shot in world
        .projectiles
        .iter_mut()
        .filter(|p| p.body.alive && p.from_player())
    {
        let target = world.enemies.iter_mut().enumerate().find(|(_, e)| {
            e.body.alive
                && arena.circles_overlap(shot.body.pos, shot.body.radius, e.body.pos, e.body.radius)
        });
        if let Some((index, enemy)) = target {
            shot.body.alive = false;
            if enemy.take_damage(shot.damage) {
                destroyed.push(index);
            }
        }
    }

    for index in destroyed {
        resolve_kill(world, index, true, tuning, out);
    }
}

/// Ship against enemy bodies and enemy projectiles
///
/// Skipped entirely while invulnerable. A shield swallows enemy shots and
/// ignores contact. At most one hit lands per tick.
fn ship_vs_threats(world: &mut World, tuning: &Tuning, out: &mut TickOutput) {
    if world.player.is_invulnerable() {
        return;
    }
    let arena = world.arena;
    let shielded = world.player.shielded();
    let ship = world.player.body;
    let mut hit = false;

    for shot in world
        .projectiles
        .iter_mut()
        .filter(|p| p.body.alive && !p.from_player())
    {
        if !arena.circles_overlap(ship.pos, ship.radius, shot.body.pos, shot.body.radius) {
            continue;
        }
        if shielded {
            shot.body.alive = false;
            out.sounds.push(SoundCue::ShieldBlock);
        } else if !hit {
            shot.body.alive = false;
            hit = true;
        }
    }

    if !shielded && !hit {
        hit = world.enemies.iter().any(|e| {
            e.body.alive && arena.circles_overlap(ship.pos, ship.radius, e.body.pos, e.body.radius)
        });
    }

    if hit {
        take_hit(world, tuning, out);
    }
}

fn take_hit(world: &mut World, tuning: &Tuning, out: &mut TickOutput) {
    world.lives = world.lives.saturating_sub(1);
    world.player.invulnerable = tuning.player.invulnerability;
    let position = world.player.body.pos;
    log::info!("Ship hit, {} lives left", world.lives);

    out.events.push(GameEvent::Hit(HitEvent {
        position,
        lives_left: world.lives,
    }));
    out.sounds.push(SoundCue::PlayerHit);
    world.spawn_debris(position, Tint::Ship, 16, DEBRIS_SPEED, tuning.max_particles);
}

fn ship_vs_power_ups(world: &mut World, tuning: &Tuning, out: &mut TickOutput) {
    let arena = world.arena;
    let ship = world.player.body;
    let mut collected = Vec::new();

    for pickup in world.power_ups.iter_mut().filter(|p| p.body.alive) {
        if arena.circles_overlap(ship.pos, ship.radius, pickup.body.pos, pickup.body.radius) {
            pickup.body.alive = false;
            collected.push((pickup.kind, pickup.body.pos));
        }
    }

    for (kind, position) in collected {
        apply_power_up(&mut world.player, kind, tuning);
        log::debug!("Collected {:?}", kind);
        out.events.push(GameEvent::Pickup(PickupEvent { kind, position }));
        out.sounds.push(SoundCue::PowerUpCollected);
        world.spawn_debris(position, Tint::PowerUp(kind), 8, DEBRIS_SPEED * 0.5, tuning.max_particles);
    }
}

/// Start or refresh a timed buff, or add a bomb
pub fn apply_power_up(player: &mut Player, kind: PowerUpKind, tuning: &Tuning) {
    let pt = &tuning.power_ups;
    match kind {
        PowerUpKind::BandwidthBoost => player.effects.bandwidth = pt.bandwidth_duration,
        PowerUpKind::SignalShield => player.effects.shield = pt.shield_duration,
        PowerUpKind::SpectrumSpread => player.effects.spread = pt.spread_duration,
        PowerUpKind::NetworkSurge => {
            player.bombs = (player.bombs + 1).min(tuning.player.max_bombs);
        }
    }
}

/// Detonate a bomb if the ship carries one
///
/// Regular enemies are destroyed outright without splitting, the boss takes
/// fixed damage, and every enemy projectile is cleared. Returns whether a
/// bomb went off.
pub fn detonate_bomb(world: &mut World, tuning: &Tuning, out: &mut TickOutput) -> bool {
    if world.player.bombs == 0 {
        return false;
    }
    world.player.bombs -= 1;
    out.sounds.push(SoundCue::BombUsed);
    log::info!("Bomb detonated, {} left", world.player.bombs);

    let mut destroyed = Vec::new();
    for (index, enemy) in world.enemies.iter_mut().enumerate() {
        if !enemy.body.alive {
            continue;
        }
        let damage = if enemy.kind().is_boss() {
            tuning.weapon.bomb_boss_damage
        } else {
            enemy.health
        };
        if enemy.take_damage(damage) {
            destroyed.push(index);
        }
    }
    for shot in world.projectiles.iter_mut().filter(|p| !p.from_player()) {
        shot.body.alive = false;
    }

    for index in destroyed {
        resolve_kill(world, index, false, tuning, out);
    }
    let center = world.player.body.pos;
    world.spawn_debris(center, Tint::Bomb, 48, DEBRIS_SPEED * 2.5, tuning.max_particles);
    true
}

/// Report a kill and spawn its split children, drops, and debris
fn resolve_kill(world: &mut World, index: usize, allow_split: bool, tuning: &Tuning, out: &mut TickOutput) {
    let enemy = world.enemies[index].clone();
    let kind = enemy.kind();
    let position = enemy.body.pos;

    out.events.push(GameEvent::Destruction(DestructionEvent {
        enemy: enemy.id,
        kind,
        position,
        points: enemy.points,
    }));
    out.sounds.push(SoundCue::EnemyDestroyed);
    let debris = 6 + (enemy.body.radius * 0.5) as usize;
    world.spawn_debris(position, Tint::Enemy(kind), debris, DEBRIS_SPEED, tuning.max_particles);

    if allow_split {
        for child in split_children(&enemy, tuning, &mut world.rng) {
            world.add_enemy(child);
        }
    }

    let drops = match kind {
        EnemyKind::DataPacket => 1,
        EnemyKind::SpectrumJammer => 2,
        _ if world.rng.random_bool(tuning.power_ups.drop_chance) => 1,
        _ => 0,
    };
    for _ in 0..drops {
        let drop = world.random_power_up_kind();
        world.spawn_power_up(drop, position, tuning);
    }
    if kind.is_boss() {
        log::info!("Spectrum Jammer destroyed");
    }
}

/// Children of a destroyed Network Node
///
/// Two nodes of `radius * node_split_ratio` if that is at least
/// `node_min_split_radius`, otherwise none. Velocities diverge from the
/// parent's by ±a, a ∈ [0.35, 1.0] rad; a still parent sends them in
/// opposite random directions.
pub fn split_children(parent: &Enemy, tuning: &Tuning, rng: &mut Pcg32) -> Vec<Enemy> {
    let generation = match parent.behavior {
        Behavior::Splitter { generation } => generation.saturating_add(1),
        _ => return Vec::new(),
    };
    let roster = &tuning.enemies;
    let radius = parent.body.radius * roster.node_split_ratio;
    if radius < roster.node_min_split_radius || radius <= 0.0 {
        return Vec::new();
    }

    let speed = parent.speed * SPLIT_SPEED_FACTOR;
    let velocities = if parent.body.vel.length_squared() > 1e-6 {
        let base = parent.body.vel * SPLIT_SPEED_FACTOR;
        let a = rng.random_range(SPLIT_ANGLE_MIN..=SPLIT_ANGLE_MAX);
        [rotate(base, a), rotate(base, -a)]
    } else {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let dir = Vec2::from_angle(angle) * speed;
        [dir, -dir]
    };

    velocities
        .into_iter()
        .map(|vel| Enemy {
            id: EntityId(0),
            body: Body::new(
                parent.body.pos + vel.normalize_or_zero() * radius,
                vel,
                radius,
            ),
            health: roster.network_node.health,
            points: parent.points,
            speed: vel.length(),
            rotation: vel.y.atan2(vel.x),
            behavior: Behavior::Splitter { generation },
        })
        .collect()
}
