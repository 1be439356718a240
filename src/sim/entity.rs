//! Entity model
//!
//! Every mobile thing shares a `Body` (position, velocity, radius, alive) and
//! carries a kind-specific payload. Behavior is dispatched with `match` over
//! the payload, never through trait objects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Entity identifier, unique within one World
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Capability record shared by all entities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Cleared when the entity dies; removal happens in the cleanup pass
    pub alive: bool,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            alive: true,
        }
    }
}

/// Decrement a countdown, never going below zero
#[inline]
pub fn countdown(timer: &mut f32, dt: f32) {
    *timer = (*timer - dt).max(0.0);
}

/// Timed buffs granted by power-ups (seconds remaining)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    /// Rapid fire
    pub bandwidth: f32,
    /// Three-way shot
    pub spread: f32,
    /// Damage immunity
    pub shield: f32,
}

impl ActiveEffects {
    pub fn tick(&mut self, dt: f32) {
        countdown(&mut self.bandwidth, dt);
        countdown(&mut self.spread, dt);
        countdown(&mut self.shield, dt);
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub body: Body,
    /// Facing (radians, 0 = +x)
    pub heading: f32,
    pub thrusting: bool,
    /// Seconds until the next shot may fire
    pub fire_cooldown: f32,
    pub effects: ActiveEffects,
    pub bombs: u8,
    /// Post-hit invulnerability (seconds remaining)
    pub invulnerable: f32,
}

impl Player {
    pub fn new(id: EntityId, pos: Vec2, radius: f32, bombs: u8) -> Self {
        Self {
            id,
            body: Body::new(pos, Vec2::ZERO, radius),
            // Nose up on screen
            heading: -std::f32::consts::FRAC_PI_2,
            thrusting: false,
            fire_cooldown: 0.0,
            effects: ActiveEffects::default(),
            bombs,
            invulnerable: 0.0,
        }
    }

    pub fn shielded(&self) -> bool {
        self.effects.shield > 0.0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }
}

/// Enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Homes in on the ship
    SignalDisruptor,
    /// Fast bonus target, always drops a power-up
    DataPacket,
    /// Splits into two smaller nodes when destroyed
    NetworkNode,
    /// Slow, tough, tumbling
    LegacyTower,
    /// Boss; fires projectile patterns
    SpectrumJammer,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::SignalDisruptor,
        EnemyKind::DataPacket,
        EnemyKind::NetworkNode,
        EnemyKind::LegacyTower,
        EnemyKind::SpectrumJammer,
    ];

    pub fn is_boss(self) -> bool {
        self == EnemyKind::SpectrumJammer
    }
}

/// Boss attack patterns, alternated on each attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPattern {
    /// Ring of projectiles in every direction
    RadialBurst,
    /// Three shots aimed at the ship
    AimedVolley,
}

impl AttackPattern {
    pub fn next(self) -> Self {
        match self {
            AttackPattern::RadialBurst => AttackPattern::AimedVolley,
            AttackPattern::AimedVolley => AttackPattern::RadialBurst,
        }
    }
}

/// Kind-specific enemy payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    /// Signal Disruptor: steers toward the ship
    Seeker { turn_rate: f32 },
    /// Data Packet: straight line
    Courier,
    /// Network Node: drifts; `generation` counts splits from the original node
    Splitter { generation: u8 },
    /// Legacy Tower: drifts and spins
    Tumbler { spin: f32 },
    /// Spectrum Jammer: drifts and attacks on a cooldown
    Jammer {
        pattern: AttackPattern,
        attack_cooldown: f32,
        volleys: u32,
    },
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub body: Body,
    pub health: u32,
    pub points: u32,
    /// Cruise speed (pixels/sec)
    pub speed: f32,
    /// Visual rotation (radians)
    pub rotation: f32,
    pub behavior: Behavior,
}

impl Enemy {
    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Seeker { .. } => EnemyKind::SignalDisruptor,
            Behavior::Courier => EnemyKind::DataPacket,
            Behavior::Splitter { .. } => EnemyKind::NetworkNode,
            Behavior::Tumbler { .. } => EnemyKind::LegacyTower,
            Behavior::Jammer { .. } => EnemyKind::SpectrumJammer,
        }
    }

    /// Apply damage; returns true if this hit destroyed the enemy
    pub fn take_damage(&mut self, damage: u32) -> bool {
        if !self.body.alive {
            return false;
        }
        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            self.body.alive = false;
            true
        } else {
            false
        }
    }
}

/// Who fired a projectile. Non-owning: only used to skip self-hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy(EntityId),
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub body: Body,
    pub owner: Owner,
    pub damage: u32,
    /// Seconds remaining
    pub ttl: f32,
}

impl Projectile {
    pub fn from_player(&self) -> bool {
        self.owner == Owner::Player
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Rapid fire
    BandwidthBoost,
    /// Temporary damage immunity
    SignalShield,
    /// Three-way shot
    SpectrumSpread,
    /// One extra bomb
    NetworkSurge,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::BandwidthBoost,
        PowerUpKind::SignalShield,
        PowerUpKind::SpectrumSpread,
        PowerUpKind::NetworkSurge,
    ];
}

/// A power-up pickup floating in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub body: Body,
    pub kind: PowerUpKind,
    /// Seconds before it despawns
    pub ttl: f32,
}

/// Particle tint, resolved to a color by the render sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tint {
    Enemy(EnemyKind),
    PowerUp(PowerUpKind),
    Ship,
    Bomb,
}

/// A particle for visual effects (never collides)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub body: Body,
    pub tint: Tint,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}
