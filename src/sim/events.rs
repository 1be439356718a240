//! Per-tick events
//!
//! The collision stage records what happened; scoring and the wave controller
//! consume the list synchronously before cleanup. Sound cues are collected
//! alongside and handed to the audio sink by the driver.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{EnemyKind, EntityId, PowerUpKind};

/// An enemy was destroyed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DestructionEvent {
    pub enemy: EntityId,
    pub kind: EnemyKind,
    pub position: Vec2,
    pub points: u32,
}

/// The ship collected a power-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupEvent {
    pub kind: PowerUpKind,
    pub position: Vec2,
}

/// The ship took damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitEvent {
    pub position: Vec2,
    pub lives_left: u8,
}

/// Gameplay event produced during one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    Destruction(DestructionEvent),
    Pickup(PickupEvent),
    Hit(HitEvent),
}

/// Named sound triggers for the audio sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    EnemyDestroyed,
    PlayerHit,
    PowerUpCollected,
    WaveComplete,
    BombUsed,
    PlayerFire,
    BossIncoming,
    BossAttack,
    ShieldBlock,
    ExtraLife,
    GameOver,
    HighScore,
}

impl SoundCue {
    /// Stable trigger name
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::EnemyDestroyed => "enemy_destroyed",
            SoundCue::PlayerHit => "player_hit",
            SoundCue::PowerUpCollected => "powerup_collected",
            SoundCue::WaveComplete => "wave_complete",
            SoundCue::BombUsed => "bomb_used",
            SoundCue::PlayerFire => "player_fire",
            SoundCue::BossIncoming => "boss_incoming",
            SoundCue::BossAttack => "boss_attack",
            SoundCue::ShieldBlock => "shield_block",
            SoundCue::ExtraLife => "extra_life",
            SoundCue::GameOver => "game_over",
            SoundCue::HighScore => "high_score",
        }
    }
}

/// Everything a tick reports to the outside
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    pub events: Vec<GameEvent>,
    pub sounds: Vec<SoundCue>,
}

impl TickOutput {
    pub fn clear(&mut self) {
        self.events.clear();
        self.sounds.clear();
    }

    pub fn destructions(&self) -> impl Iterator<Item = &DestructionEvent> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Destruction(d) => Some(d),
            _ => None,
        })
    }

    pub fn hits(&self) -> impl Iterator<Item = &HitEvent> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Hit(h) => Some(h),
            _ => None,
        })
    }

    pub fn pickups(&self) -> impl Iterator<Item = &PickupEvent> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Pickup(p) => Some(p),
            _ => None,
        })
    }
}
