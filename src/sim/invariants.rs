//! End-of-tick invariant guard
//!
//! Debug builds panic on the first violated invariant. Release builds clamp
//! the offending value back into range and log a warning.

use super::entity::Body;
use super::geometry::Arena;
use super::scoring::MAX_MULTIPLIER;
use super::state::World;
use crate::tuning::Tuning;

/// Check and repair the world after a tick
pub fn enforce(world: &mut World, tuning: &Tuning) {
    let problems = repair(world, tuning);
    for problem in &problems {
        log::warn!("Invariant violated (clamped): {}", problem);
    }
    debug_assert!(problems.is_empty(), "invariants violated: {problems:?}");
}

/// Clamp every out-of-range value; returns a description of each fix
pub fn repair(world: &mut World, tuning: &Tuning) -> Vec<String> {
    let mut problems = Vec::new();
    let arena = world.arena;

    let player = &mut world.player;
    if !player.body.pos.is_finite() || !player.body.vel.is_finite() {
        problems.push(format!("ship position {:?} not finite", player.body.pos));
        player.body.pos = arena.center();
        player.body.vel = glam::Vec2::ZERO;
    } else if !arena.contains(player.body.pos) {
        problems.push(format!("ship at {:?} outside arena", player.body.pos));
        player.body.pos = arena.wrap(player.body.pos);
    }
    if player.bombs > tuning.player.max_bombs {
        problems.push(format!("{} bombs above max", player.bombs));
        player.bombs = tuning.player.max_bombs;
    }
    for (name, timer) in [
        ("bandwidth", &mut player.effects.bandwidth),
        ("spread", &mut player.effects.spread),
        ("shield", &mut player.effects.shield),
        ("invulnerability", &mut player.invulnerable),
        ("fire cooldown", &mut player.fire_cooldown),
    ] {
        if negative(*timer) {
            problems.push(format!("{name} timer {timer}"));
            *timer = 0.0;
        }
    }

    if world.lives > tuning.player.max_lives {
        problems.push(format!("{} lives above max", world.lives));
        world.lives = tuning.player.max_lives;
    }
    let score = &mut world.score;
    if !(1..=MAX_MULTIPLIER).contains(&score.multiplier) {
        problems.push(format!("multiplier {} out of range", score.multiplier));
        score.multiplier = score.multiplier.clamp(1, MAX_MULTIPLIER);
    }
    if negative(score.combo_timer) {
        problems.push(format!("combo timer {}", score.combo_timer));
        score.combo_timer = 0.0;
    }

    for e in world.enemies.iter_mut() {
        check_body(&mut e.body, "enemy", &mut problems, &arena);
    }
    for p in world.projectiles.iter_mut() {
        check_body(&mut p.body, "projectile", &mut problems, &arena);
        if negative(p.ttl) {
            problems.push(format!("projectile ttl {}", p.ttl));
            p.ttl = 0.0;
            p.body.alive = false;
        }
    }
    for p in world.power_ups.iter_mut() {
        check_body(&mut p.body, "power-up", &mut problems, &arena);
        if negative(p.ttl) {
            problems.push(format!("power-up ttl {}", p.ttl));
            p.ttl = 0.0;
            p.body.alive = false;
        }
    }

    problems
}

/// A live body needs a positive radius and a finite in-bounds position;
/// broken bodies are killed
fn check_body(body: &mut Body, what: &str, problems: &mut Vec<String>, arena: &Arena) {
    if !body.alive {
        return;
    }
    if body.radius.is_nan() || body.radius <= 0.0 || !body.pos.is_finite() || !arena.contains(body.pos) {
        problems.push(format!("{what} body {body:?} invalid"));
        body.alive = false;
    }
}

fn negative(value: f32) -> bool {
    value.is_nan() || value < 0.0
}
