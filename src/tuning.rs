//! Data-driven game balance
//!
//! One immutable `Tuning` is built at session start and passed by reference
//! into every simulation stage. Defaults reproduce the shipped balance; a JSON
//! file may override any subset of fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::entity::EnemyKind;

/// Error produced while loading a tuning file
#[derive(Debug)]
pub enum TuningError {
    /// The JSON could not be parsed
    Parse(serde_json::Error),
    /// A field holds a value the simulation cannot run with
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "tuning parse error: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid tuning `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Arena dimensions (toroidal: leaving one edge re-enters the opposite one)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 720.0,
        }
    }
}

/// Ship handling and survivability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub radius: f32,
    /// Rotation speed (radians/sec)
    pub turn_rate: f32,
    /// Acceleration along heading while thrusting (pixels/s²)
    pub thrust_accel: f32,
    /// Fraction of velocity retained after one second without thrust
    pub friction: f32,
    pub max_speed: f32,
    pub start_lives: u8,
    pub max_lives: u8,
    pub start_bombs: u8,
    pub max_bombs: u8,
    /// Post-hit invulnerability (seconds)
    pub invulnerability: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 12.0,
            turn_rate: 4.5,
            thrust_accel: 320.0,
            friction: 0.35,
            max_speed: 360.0,
            start_lives: 3,
            max_lives: 5,
            start_bombs: 1,
            max_bombs: 3,
            invulnerability: 2.0,
        }
    }
}

/// Projectiles (player and enemy) and the bomb
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub projectile_ttl: f32,
    pub projectile_damage: u32,
    /// Seconds between shots (halved by Bandwidth Boost)
    pub fire_interval: f32,
    /// Half-angle of the Spectrum Spread fan (radians)
    pub spread_angle: f32,
    pub enemy_projectile_speed: f32,
    pub enemy_projectile_radius: f32,
    pub enemy_projectile_ttl: f32,
    /// Health removed from the boss by one bomb
    pub bomb_boss_damage: u32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            projectile_speed: 520.0,
            projectile_radius: 3.0,
            projectile_ttl: 1.1,
            projectile_damage: 1,
            fire_interval: 0.18,
            spread_angle: 0.22,
            enemy_projectile_speed: 220.0,
            enemy_projectile_radius: 4.0,
            enemy_projectile_ttl: 3.0,
            bomb_boss_damage: 10,
        }
    }
}

/// Base stats for one enemy kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemyStats {
    pub points: u32,
    pub health: u32,
    pub radius: f32,
    pub speed: f32,
}

/// Per-kind enemy stats plus behavior parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyRoster {
    pub signal_disruptor: EnemyStats,
    pub data_packet: EnemyStats,
    pub network_node: EnemyStats,
    pub legacy_tower: EnemyStats,
    pub spectrum_jammer: EnemyStats,
    /// How fast a Signal Disruptor can turn toward the ship (radians/sec)
    pub disruptor_turn_rate: f32,
    /// Child radius = parent radius * ratio
    pub node_split_ratio: f32,
    /// Children smaller than this are never created
    pub node_min_split_radius: f32,
    pub tower_max_spin: f32,
    pub jammer_attack_interval: f32,
    pub jammer_burst_count: u32,
    /// Extra boss health for each boss wave after the first
    pub boss_health_per_cycle: u32,
}

impl Default for EnemyRoster {
    fn default() -> Self {
        Self {
            signal_disruptor: EnemyStats {
                points: 100,
                health: 1,
                radius: 14.0,
                speed: 90.0,
            },
            data_packet: EnemyStats {
                points: 250,
                health: 1,
                radius: 10.0,
                speed: 170.0,
            },
            network_node: EnemyStats {
                points: 50,
                health: 1,
                radius: 20.0,
                speed: 60.0,
            },
            legacy_tower: EnemyStats {
                points: 150,
                health: 3,
                radius: 26.0,
                speed: 35.0,
            },
            spectrum_jammer: EnemyStats {
                points: 1000,
                health: 30,
                radius: 42.0,
                speed: 45.0,
            },
            disruptor_turn_rate: 1.6,
            node_split_ratio: 0.5,
            node_min_split_radius: 8.0,
            tower_max_spin: 1.2,
            jammer_attack_interval: 2.0,
            jammer_burst_count: 10,
            boss_health_per_cycle: 10,
        }
    }
}

impl EnemyRoster {
    /// Base stats for a kind
    pub fn stats(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::SignalDisruptor => &self.signal_disruptor,
            EnemyKind::DataPacket => &self.data_packet,
            EnemyKind::NetworkNode => &self.network_node,
            EnemyKind::LegacyTower => &self.legacy_tower,
            EnemyKind::SpectrumJammer => &self.spectrum_jammer,
        }
    }
}

/// Power-up pickups and the buffs they grant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub radius: f32,
    /// Seconds a pickup floats before despawning
    pub ttl: f32,
    pub drift_speed: f32,
    /// Chance a regular (non-packet, non-boss) kill drops a pickup
    pub drop_chance: f64,
    pub bandwidth_duration: f32,
    pub shield_duration: f32,
    pub spread_duration: f32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            radius: 10.0,
            ttl: 10.0,
            drift_speed: 30.0,
            drop_chance: 0.12,
            bandwidth_duration: 8.0,
            shield_duration: 6.0,
            spread_duration: 8.0,
        }
    }
}

/// Combo and bonus scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Seconds after a kill during which the next kill extends the combo
    pub combo_window: f32,
    pub boss_clear_bonus: u64,
    /// Score step that awards an extra life (0 disables)
    pub extra_life_every: u64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            combo_window: 2.0,
            boss_clear_bonus: 2000,
            extra_life_every: 10_000,
        }
    }
}

/// Wave pacing and spawn placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub base_count: u32,
    pub per_wave: u32,
    pub max_count: u32,
    /// Seconds between queued spawns
    pub spawn_interval: f32,
    /// Rest between a clear and the next wave
    pub clear_delay: f32,
    pub boss_every: u32,
    pub boss_intro_delay: f32,
    /// Enemy speed growth per wave (fraction of base)
    pub speed_ramp: f32,
    pub max_speed_scale: f32,
    /// Minimum wrapped distance between a new enemy and the ship
    pub safe_radius: f32,
    pub placement_attempts: u32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            base_count: 3,
            per_wave: 1,
            max_count: 14,
            spawn_interval: 0.5,
            clear_delay: 2.0,
            boss_every: 5,
            boss_intro_delay: 2.5,
            speed_ramp: 0.06,
            max_speed_scale: 1.8,
            safe_radius: 180.0,
            placement_attempts: 8,
        }
    }
}

/// Complete balance sheet for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub player: PlayerTuning,
    pub weapon: WeaponTuning,
    pub enemies: EnemyRoster,
    pub power_ups: PowerUpTuning,
    pub scoring: ScoringTuning,
    pub waves: WaveTuning,
    /// Visual particle cap (0 disables debris)
    pub max_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena: ArenaTuning::default(),
            player: PlayerTuning::default(),
            weapon: WeaponTuning::default(),
            enemies: EnemyRoster::default(),
            power_ups: PowerUpTuning::default(),
            scoring: ScoringTuning::default(),
            waves: WaveTuning::default(),
            max_particles: 256,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Copy with a different particle cap (from quality settings)
    pub fn with_particle_cap(mut self, cap: usize) -> Self {
        self.max_particles = cap;
        self
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        }

        positive("arena.width", self.arena.width)?;
        positive("arena.height", self.arena.height)?;
        positive("player.radius", self.player.radius)?;
        positive("player.max_speed", self.player.max_speed)?;
        positive("weapon.projectile_radius", self.weapon.projectile_radius)?;
        positive("weapon.projectile_ttl", self.weapon.projectile_ttl)?;
        positive("weapon.fire_interval", self.weapon.fire_interval)?;
        positive("weapon.enemy_projectile_radius", self.weapon.enemy_projectile_radius)?;
        positive("weapon.enemy_projectile_ttl", self.weapon.enemy_projectile_ttl)?;
        positive("power_ups.radius", self.power_ups.radius)?;
        positive("power_ups.ttl", self.power_ups.ttl)?;
        positive("scoring.combo_window", self.scoring.combo_window)?;
        positive("enemies.node_min_split_radius", self.enemies.node_min_split_radius)?;
        positive("enemies.jammer_attack_interval", self.enemies.jammer_attack_interval)?;

        for kind in EnemyKind::ALL {
            let stats = self.enemies.stats(kind);
            positive("enemies.*.radius", stats.radius)?;
            if stats.health == 0 {
                return Err(TuningError::Invalid {
                    field: "enemies.*.health",
                    reason: format!("{kind:?} must start with at least 1 health"),
                });
            }
        }

        if !(self.player.friction > 0.0 && self.player.friction <= 1.0) {
            return Err(TuningError::Invalid {
                field: "player.friction",
                reason: "must be in (0, 1]".to_string(),
            });
        }
        if !(self.enemies.node_split_ratio > 0.0 && self.enemies.node_split_ratio < 1.0) {
            return Err(TuningError::Invalid {
                field: "enemies.node_split_ratio",
                reason: "must be in (0, 1) so split chains terminate".to_string(),
            });
        }
        let spin = self.enemies.tower_max_spin;
        if !(spin.is_finite() && spin >= 0.0) {
            return Err(TuningError::Invalid {
                field: "enemies.tower_max_spin",
                reason: format!("must be a non-negative rate, got {spin}"),
            });
        }
        if !(0.0..=1.0).contains(&self.power_ups.drop_chance) {
            return Err(TuningError::Invalid {
                field: "power_ups.drop_chance",
                reason: "must be a probability".to_string(),
            });
        }
        if self.player.start_lives == 0 || self.player.start_lives > self.player.max_lives {
            return Err(TuningError::Invalid {
                field: "player.start_lives",
                reason: "must be in 1..=max_lives".to_string(),
            });
        }
        if self.player.start_bombs > self.player.max_bombs {
            return Err(TuningError::Invalid {
                field: "player.start_bombs",
                reason: "must not exceed max_bombs".to_string(),
            });
        }
        if self.waves.boss_every == 0 {
            return Err(TuningError::Invalid {
                field: "waves.boss_every",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "arena": { "width": 1280.0 }, "max_particles": 64 }"#)
            .expect("valid tuning");
        assert_eq!(tuning.arena.width, 1280.0);
        assert_eq!(tuning.arena.height, ArenaTuning::default().height);
        assert_eq!(tuning.max_particles, 64);
        assert_eq!(tuning.enemies.signal_disruptor.points, 100);
    }

    #[test]
    fn test_rejects_non_terminating_split_ratio() {
        let err = Tuning::from_json(r#"{ "enemies": { "node_split_ratio": 1.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "enemies.node_split_ratio",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_negative_tower_spin() {
        let err = Tuning::from_json(r#"{ "enemies": { "tower_max_spin": -1.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "enemies.tower_max_spin",
                ..
            }
        ));
        assert!(Tuning::from_json(r#"{ "enemies": { "tower_max_spin": 0.0 } }"#).is_ok());
    }

    #[test]
    fn test_huge_wave_growth_is_accepted() {
        let tuning = Tuning::from_json(r#"{ "waves": { "per_wave": 4000000000 } }"#).expect("valid tuning");
        assert_eq!(tuning.waves.per_wave, 4_000_000_000);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
        assert!(err.to_string().starts_with("tuning parse error"));
    }
}
