//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod events;
pub mod flow;
pub mod geometry;
pub mod input;
pub mod invariants;
pub mod physics;
pub mod scoring;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod wave;

pub use entity::{EnemyKind, EntityId, PowerUpKind};
pub use events::{GameEvent, SoundCue, TickOutput};
pub use flow::{GamePhase, Session};
pub use geometry::Arena;
pub use input::InputSnapshot;
pub use snapshot::{EntityView, Hud, Snapshot, ViewKind, VisualFlags};
pub use state::World;
pub use tick::tick;
pub use wave::{WavePhase, WaveState};
