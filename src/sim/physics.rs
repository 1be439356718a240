//! Update stage: movement, timers, firing, enemy behavior
//!
//! Entities that die here (expired ttl, faded particles) are only flagged;
//! removal happens in the cleanup pass at the end of the tick.

use glam::Vec2;

use super::entity::{AttackPattern, Behavior, EntityId, Owner, countdown};
use super::events::{SoundCue, TickOutput};
use super::input::InputSnapshot;
use super::state::World;
use crate::tuning::Tuning;
use crate::{heading_vector, normalize_angle, rotate};

/// Particle velocity retained per second
const PARTICLE_DRAG: f32 = 0.3;
/// Particle life lost per second
const PARTICLE_FADE: f32 = 1.5;
/// Angular spacing of an aimed boss volley (radians)
const VOLLEY_SPREAD: f32 = 0.15;
/// Extra rotation applied to each successive radial burst
const BURST_TWIST: f32 = 0.3;

/// Advance every entity and timer by `dt`
///
/// `dt == 0` changes nothing.
pub fn update(world: &mut World, input: &InputSnapshot, tuning: &Tuning, dt: f32, out: &mut TickOutput) {
    debug_assert!(dt.is_finite() && dt >= 0.0, "invalid timestep {dt}");
    if dt <= 0.0 || !dt.is_finite() {
        return;
    }

    update_player(world, input, tuning, dt, out);
    update_enemies(world, tuning, dt, out);
    update_projectiles(world, dt);
    update_power_ups(world, dt);
    update_particles(world, dt);
    world.score.tick(dt);
}

fn update_player(world: &mut World, input: &InputSnapshot, tuning: &Tuning, dt: f32, out: &mut TickOutput) {
    let arena = world.arena;
    let pt = &tuning.player;
    let player = &mut world.player;

    player.heading = normalize_angle(player.heading + input.steering() * pt.turn_rate * dt);
    player.thrusting = input.thrust;
    if input.thrust {
        player.body.vel += heading_vector(player.heading) * pt.thrust_accel * dt;
    }
    player.body.vel *= pt.friction.powf(dt);
    player.body.vel = player.body.vel.clamp_length_max(pt.max_speed);
    player.body.pos = arena.wrap(player.body.pos + player.body.vel * dt);

    player.effects.tick(dt);
    countdown(&mut player.invulnerable, dt);
    countdown(&mut player.fire_cooldown, dt);

    if input.fire && player.fire_cooldown <= 0.0 {
        fire(world, tuning, out);
    }
}

/// Fire from the nose: one shot, or a three-way fan with Spectrum Spread
fn fire(world: &mut World, tuning: &Tuning, out: &mut TickOutput) {
    let wt = &tuning.weapon;
    let player = &world.player;
    let nose = player.body.pos + heading_vector(player.heading) * player.body.radius;
    let heading = player.heading;
    let inherited = player.body.vel;

    let fan = [-wt.spread_angle, 0.0, wt.spread_angle];
    let offsets = if player.effects.spread > 0.0 {
        &fan[..]
    } else {
        &fan[1..2]
    };
    let mut cooldown = wt.fire_interval;
    if player.effects.bandwidth > 0.0 {
        cooldown *= 0.5;
    }

    for &offset in offsets {
        let vel = heading_vector(heading + offset) * wt.projectile_speed + inherited;
        world.spawn_projectile(
            nose,
            vel,
            wt.projectile_radius,
            Owner::Player,
            wt.projectile_damage,
            wt.projectile_ttl,
        );
    }
    world.player.fire_cooldown = cooldown;
    out.sounds.push(SoundCue::PlayerFire);
}

fn update_enemies(world: &mut World, tuning: &Tuning, dt: f32, out: &mut TickOutput) {
    let arena = world.arena;
    let target = world.player.body.pos;
    let roster = &tuning.enemies;
    let mut shots: Vec<(EntityId, Vec2, Vec2)> = Vec::new();

    for enemy in world.enemies.iter_mut().filter(|e| e.body.alive) {
        let body = &mut enemy.body;
        match &mut enemy.behavior {
            Behavior::Seeker { turn_rate } => {
                let to_player = arena.delta(body.pos, target);
                if to_player.length_squared() > 0.0 {
                    let current = body.vel.y.atan2(body.vel.x);
                    let desired = to_player.y.atan2(to_player.x);
                    let max_turn = *turn_rate * dt;
                    let turn = normalize_angle(desired - current).clamp(-max_turn, max_turn);
                    body.vel = heading_vector(current + turn) * enemy.speed;
                }
                enemy.rotation = body.vel.y.atan2(body.vel.x);
            }
            Behavior::Courier | Behavior::Splitter { .. } => {}
            Behavior::Tumbler { spin } => {
                enemy.rotation = normalize_angle(enemy.rotation + *spin * dt);
            }
            Behavior::Jammer {
                pattern,
                attack_cooldown,
                volleys,
            } => {
                enemy.rotation = normalize_angle(enemy.rotation + 0.5 * dt);
                countdown(attack_cooldown, dt);
                if *attack_cooldown == 0.0 {
                    let speed = tuning.weapon.enemy_projectile_speed;
                    match pattern {
                        AttackPattern::RadialBurst => {
                            let count = roster.jammer_burst_count.max(1);
                            let step = std::f32::consts::TAU / count as f32;
                            let twist = *volleys as f32 * BURST_TWIST;
                            for i in 0..count {
                                let dir = heading_vector(twist + step * i as f32);
                                shots.push((enemy.id, body.pos + dir * body.radius, dir * speed));
                            }
                        }
                        AttackPattern::AimedVolley => {
                            let aim = arena.delta(body.pos, target).normalize_or(Vec2::X);
                            for offset in [-VOLLEY_SPREAD, 0.0, VOLLEY_SPREAD] {
                                let dir = rotate(aim, offset);
                                shots.push((enemy.id, body.pos + dir * body.radius, dir * speed));
                            }
                        }
                    }
                    *pattern = pattern.next();
                    *attack_cooldown = roster.jammer_attack_interval;
                    *volleys += 1;
                    out.sounds.push(SoundCue::BossAttack);
                }
            }
        }
        body.pos = arena.wrap(body.pos + body.vel * dt);
    }

    let wt = &tuning.weapon;
    for (owner, pos, vel) in shots {
        world.spawn_projectile(
            pos,
            vel,
            wt.enemy_projectile_radius,
            Owner::Enemy(owner),
            1,
            wt.enemy_projectile_ttl,
        );
    }
}

fn update_projectiles(world: &mut World, dt: f32) {
    let arena = world.arena;
    for p in world.projectiles.iter_mut().filter(|p| p.body.alive) {
        p.body.pos = arena.wrap(p.body.pos + p.body.vel * dt);
        countdown(&mut p.ttl, dt);
        if p.ttl == 0.0 {
            p.body.alive = false;
        }
    }
}

fn update_power_ups(world: &mut World, dt: f32) {
    let arena = world.arena;
    for p in world.power_ups.iter_mut().filter(|p| p.body.alive) {
        p.body.pos = arena.wrap(p.body.pos + p.body.vel * dt);
        countdown(&mut p.ttl, dt);
        if p.ttl == 0.0 {
            p.body.alive = false;
        }
    }
}

fn update_particles(world: &mut World, dt: f32) {
    let arena = world.arena;
    let drag = PARTICLE_DRAG.powf(dt);
    for p in world.particles.iter_mut().filter(|p| p.body.alive) {
        p.body.pos = arena.wrap(p.body.pos + p.body.vel * dt);
        p.body.vel *= drag;
        countdown(&mut p.life, dt * PARTICLE_FADE);
        if p.life == 0.0 {
            p.body.alive = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::entity::{EnemyKind, PowerUpKind, Tint};
    use crate::sim::spawner::build_enemy;
    use proptest::prelude::*;

    fn world() -> (World, Tuning) {
        let tuning = Tuning::default();
        (World::new(77, &tuning), tuning)
    }

    fn add(world: &mut World, tuning: &Tuning, kind: EnemyKind, pos: Vec2) -> usize {
        let enemy = build_enemy(kind, 1, pos, tuning, &mut world.rng);
        world.add_enemy(enemy);
        world.enemies.len() - 1
    }

    #[test]
    fn test_thrust_accelerates_along_heading() {
        let (mut world, tuning) = world();
        let input = InputSnapshot {
            thrust: true,
            ..Default::default()
        };
        let start = world.player.body.pos;
        for _ in 0..30 {
            update(&mut world, &input, &tuning, SIM_DT, &mut TickOutput::default());
        }
        // Heading starts nose-up (-y)
        assert!(world.player.body.vel.y < 0.0);
        assert!(world.player.body.vel.x.abs() < 1e-3);
        assert!(world.player.body.pos.y < start.y);
        assert!(world.player.thrusting);
    }

    #[test]
    fn test_speed_is_clamped() {
        let (mut world, tuning) = world();
        let input = InputSnapshot {
            thrust: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            update(&mut world, &input, &tuning, SIM_DT, &mut TickOutput::default());
        }
        assert!(world.player.body.vel.length() <= tuning.player.max_speed + 1e-3);
    }

    #[test]
    fn test_friction_slows_drifting_ship() {
        let (mut world, tuning) = world();
        world.player.body.vel = Vec2::new(200.0, 0.0);
        update(&mut world, &InputSnapshot::default(), &tuning, 1.0, &mut TickOutput::default());
        let expected = 200.0 * tuning.player.friction;
        assert!((world.player.body.vel.x - expected).abs() < 1e-2);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let (mut world, tuning) = world();
        let input = InputSnapshot {
            fire: true,
            ..Default::default()
        };
        let mut out = TickOutput::default();
        update(&mut world, &input, &tuning, SIM_DT, &mut out);
        assert_eq!(world.projectiles.len(), 1);
        assert!(world.projectiles[0].from_player());
        assert_eq!(out.sounds, vec![SoundCue::PlayerFire]);

        update(&mut world, &input, &tuning, SIM_DT, &mut out);
        assert_eq!(world.projectiles.len(), 1);
    }

    #[test]
    fn test_spread_fires_three_and_bandwidth_halves_cooldown() {
        let (mut world, tuning) = world();
        world.player.effects.spread = 5.0;
        world.player.effects.bandwidth = 5.0;
        let input = InputSnapshot {
            fire: true,
            ..Default::default()
        };
        update(&mut world, &input, &tuning, SIM_DT, &mut TickOutput::default());
        assert_eq!(world.projectiles.len(), 3);
        assert!((world.player.fire_cooldown - tuning.weapon.fire_interval * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_seeker_turns_toward_player() {
        let (mut world, tuning) = world();
        let center = world.arena.center();
        let i = add(&mut world, &tuning, EnemyKind::SignalDisruptor, center + Vec2::new(200.0, 0.0));
        // Flying away from the ship
        world.enemies[i].body.vel = Vec2::new(world.enemies[i].speed, 0.0);
        for _ in 0..180 {
            update(&mut world, &InputSnapshot::default(), &tuning, SIM_DT, &mut TickOutput::default());
        }
        let e = &world.enemies[i];
        let to_player = world.arena.delta(e.body.pos, world.player.body.pos);
        assert!(e.body.vel.dot(to_player) > 0.0);
        assert!((e.body.vel.length() - e.speed).abs() < 1e-2);
    }

    #[test]
    fn test_jammer_alternates_patterns() {
        let (mut world, tuning) = world();
        let center = world.arena.center();
        let i = add(&mut world, &tuning, EnemyKind::SpectrumJammer, center + Vec2::new(0.0, 250.0));
        let interval = tuning.enemies.jammer_attack_interval;

        let mut out = TickOutput::default();
        update(&mut world, &InputSnapshot::default(), &tuning, interval, &mut out);
        let burst = tuning.enemies.jammer_burst_count as usize;
        assert_eq!(world.projectiles.len(), burst);
        assert!(out.sounds.contains(&SoundCue::BossAttack));

        update(&mut world, &InputSnapshot::default(), &tuning, interval, &mut out);
        assert_eq!(world.projectiles.len(), burst + 3);
        assert!(world.projectiles.iter().all(|p| p.owner == Owner::Enemy(world.enemies[i].id)));
        match world.enemies[i].behavior {
            Behavior::Jammer { pattern, volleys, .. } => {
                assert_eq!(pattern, AttackPattern::RadialBurst);
                assert_eq!(volleys, 2);
            }
            _ => panic!("expected jammer"),
        }
    }

    #[test]
    fn test_timed_entities_expire() {
        let (mut world, tuning) = world();
        world.spawn_projectile(Vec2::ZERO, Vec2::X, 2.0, Owner::Player, 1, 0.05);
        world.spawn_power_up(PowerUpKind::SignalShield, Vec2::ONE, &tuning);
        world.spawn_debris(Vec2::ONE, Tint::Ship, 4, 50.0, 64);
        world.player.effects.shield = 0.05;

        update(&mut world, &InputSnapshot::default(), &tuning, 0.1, &mut TickOutput::default());
        assert!(!world.projectiles[0].body.alive);
        assert!(world.power_ups[0].body.alive);
        assert!(!world.player.shielded());

        update(&mut world, &InputSnapshot::default(), &tuning, tuning.power_ups.ttl, &mut TickOutput::default());
        assert!(!world.power_ups[0].body.alive);
        assert!(world.particles.iter().all(|p| !p.body.alive));
        assert_eq!(world.player.effects.shield, 0.0);
    }

    #[test]
    fn test_combo_window_runs_during_update() {
        let (mut world, tuning) = world();
        world.score.register_kill(100, tuning.scoring.combo_window);
        world.score.register_kill(100, tuning.scoring.combo_window);
        assert_eq!(world.score.multiplier, 2);
        update(&mut world, &InputSnapshot::default(), &tuning, 2.5, &mut TickOutput::default());
        assert_eq!(world.score.multiplier, 1);
    }

    fn input_strategy() -> impl Strategy<Value = InputSnapshot> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), -1.0f32..=1.0).prop_map(
            |(rotate_left, rotate_right, thrust, fire, turn_axis)| InputSnapshot {
                rotate_left,
                rotate_right,
                thrust,
                fire,
                turn_axis,
                ..Default::default()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_zero_dt_is_noop(seed in any::<u64>(), input in input_strategy(), warmup in 0usize..40) {
            let tuning = Tuning::default();
            let mut world = World::new(seed, &tuning);
            let center = world.arena.center();
            for kind in [EnemyKind::SignalDisruptor, EnemyKind::LegacyTower, EnemyKind::SpectrumJammer] {
                let e = build_enemy(kind, 1, center + Vec2::new(150.0, 90.0), &tuning, &mut world.rng);
                world.add_enemy(e);
            }
            for _ in 0..warmup {
                update(&mut world, &input, &tuning, SIM_DT, &mut TickOutput::default());
            }
            let before = format!("{world:?}");
            let mut out = TickOutput::default();
            update(&mut world, &input, &tuning, 0.0, &mut out);
            prop_assert_eq!(before, format!("{world:?}"));
            prop_assert!(out.sounds.is_empty());
        }

        #[test]
        fn prop_positions_stay_wrapped(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..120),
            dt in 0.001f32..0.1,
        ) {
            let tuning = Tuning::default();
            let mut world = World::new(seed, &tuning);
            let center = world.arena.center();
            for kind in EnemyKind::ALL {
                let e = build_enemy(kind, 1, center + Vec2::new(-200.0, 100.0), &tuning, &mut world.rng);
                world.add_enemy(e);
            }
            for input in &inputs {
                update(&mut world, input, &tuning, dt, &mut TickOutput::default());
                prop_assert!(world.arena.contains(world.player.body.pos));
                for e in &world.enemies {
                    prop_assert!(world.arena.contains(e.body.pos));
                }
                for p in world.projectiles.iter().filter(|p| p.body.alive) {
                    prop_assert!(world.arena.contains(p.body.pos));
                }
            }
        }
    }
}
