//! Fixed timestep simulation tick
//!
//! Stages run in a fixed order: Update → Bomb → Collision → Scoring → Wave →
//! invariant guard → Cleanup. Bodies the guard kills are gone by the end of
//! the same tick.

use super::collision;
use super::events::TickOutput;
use super::input::InputSnapshot;
use super::invariants;
use super::physics;
use super::scoring;
use super::state::World;
use super::wave;
use crate::tuning::Tuning;

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &InputSnapshot, tuning: &Tuning, dt: f32) -> TickOutput {
    let mut out = TickOutput::default();
    tick_into(world, input, tuning, dt, &mut out);
    out
}

/// Same as [`tick`], appending to an existing output buffer
pub fn tick_into(world: &mut World, input: &InputSnapshot, tuning: &Tuning, dt: f32, out: &mut TickOutput) {
    debug_assert!(dt.is_finite() && dt >= 0.0, "invalid timestep {dt}");
    if dt <= 0.0 || !dt.is_finite() {
        return;
    }
    let input = input.sanitized();

    world.tick_count += 1;
    world.elapsed += dt;

    physics::update(world, &input, tuning, dt, out);
    if input.bomb {
        collision::detonate_bomb(world, tuning, out);
    }
    collision::run(world, tuning, out);
    scoring::apply(world, tuning, out);
    wave::advance(world, tuning, dt, out);
    invariants::enforce(world, tuning);
    world.cleanup();
}
