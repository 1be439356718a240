//! World state
//!
//! The World exclusively owns every entity collection. Entities are created
//! only through World methods so ids stay unique and collections stay sorted
//! by id (append-only plus order-preserving `retain`).

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{
    Body, Enemy, EntityId, Owner, Particle, Player, PowerUp, PowerUpKind, Projectile, Tint,
};
use super::geometry::Arena;
use super::scoring::ScoreState;
use super::spawner;
use super::wave::WaveState;
use crate::tuning::Tuning;

/// Complete simulation state for one game session
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub arena: Arena,
    /// Simulation tick counter
    pub tick_count: u64,
    /// Simulated seconds
    pub elapsed: f32,
    pub lives: u8,
    pub player: Player,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    /// Sorted by id
    pub projectiles: Vec<Projectile>,
    /// Sorted by id
    pub power_ups: Vec<PowerUp>,
    /// Visual only
    pub particles: Vec<Particle>,
    pub score: ScoreState,
    pub wave: WaveState,
    next_id: u32,
}

impl World {
    /// Create a fresh session: ship at the center, wave 1 queued
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let arena = Arena::new(tuning.arena.width, tuning.arena.height);
        let mut rng = Pcg32::seed_from_u64(seed);
        let first_wave = spawner::plan_wave(1, tuning, &mut rng);

        let mut world = Self {
            seed,
            rng,
            arena,
            tick_count: 0,
            elapsed: 0.0,
            lives: tuning.player.start_lives,
            player: Player::new(
                EntityId(0),
                arena.center(),
                tuning.player.radius,
                tuning.player.start_bombs,
            ),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            score: ScoreState::new(tuning),
            wave: WaveState::new(first_wave),
            next_id: 1,
        };
        world.player.id = world.next_entity_id();
        world
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an enemy built by the spawner; assigns its id
    pub fn add_enemy(&mut self, mut enemy: Enemy) -> EntityId {
        let id = self.next_entity_id();
        enemy.id = id;
        enemy.body.pos = self.arena.wrap(enemy.body.pos);
        self.enemies.push(enemy);
        id
    }

    /// Spawn a projectile
    pub fn spawn_projectile(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        owner: Owner,
        damage: u32,
        ttl: f32,
    ) -> EntityId {
        let id = self.next_entity_id();
        let pos = self.arena.wrap(pos);
        self.projectiles.push(Projectile {
            id,
            body: Body::new(pos, vel, radius),
            owner,
            damage,
            ttl,
        });
        id
    }

    /// Drop a power-up that drifts slowly in a random direction
    pub fn spawn_power_up(&mut self, kind: PowerUpKind, pos: Vec2, tuning: &Tuning) -> EntityId {
        let id = self.next_entity_id();
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let vel = Vec2::from_angle(angle) * tuning.power_ups.drift_speed;
        let pos = self.arena.wrap(pos);
        self.power_ups.push(PowerUp {
            id,
            body: Body::new(pos, vel, tuning.power_ups.radius),
            kind,
            ttl: tuning.power_ups.ttl,
        });
        id
    }

    /// Burst of debris particles (respects the particle cap)
    pub fn spawn_debris(&mut self, pos: Vec2, tint: Tint, count: usize, speed: f32, cap: usize) {
        let room = cap.saturating_sub(self.particles.len());
        for _ in 0..count.min(room) {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let s = speed * self.rng.random_range(0.4..1.0f32);
            let size = self.rng.random_range(1.5..4.0f32);
            self.particles.push(Particle {
                body: Body::new(pos, Vec2::from_angle(angle) * s, size),
                tint,
                life: 1.0,
                size,
            });
        }
    }

    /// Random power-up kind
    pub fn random_power_up_kind(&mut self) -> PowerUpKind {
        let index = self.rng.random_range(0..PowerUpKind::ALL.len());
        PowerUpKind::ALL[index]
    }

    /// Enemies still alive (dead ones may linger until cleanup)
    pub fn alive_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.body.alive).count()
    }

    /// Remove every entity flagged dead this tick
    pub fn cleanup(&mut self) {
        self.enemies.retain(|e| e.body.alive);
        self.projectiles.retain(|p| p.body.alive);
        self.power_ups.retain(|p| p.body.alive);
        self.particles.retain(|p| p.body.alive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::wave::WavePhase;

    #[test]
    fn test_new_world_layout() {
        let tuning = Tuning::default();
        let world = World::new(42, &tuning);
        assert_eq!(world.lives, tuning.player.start_lives);
        assert_eq!(world.player.bombs, tuning.player.start_bombs);
        assert_eq!(world.player.body.pos, world.arena.center());
        assert_eq!(world.wave.number, 1);
        assert!(matches!(world.wave.phase, WavePhase::Spawning { .. }));
        assert_eq!(world.score.multiplier, 1);
        assert!(world.enemies.is_empty());
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let tuning = Tuning::default();
        let mut world = World::new(1, &tuning);
        let a = world.spawn_projectile(Vec2::ZERO, Vec2::X, 2.0, Owner::Player, 1, 1.0);
        let b = world.spawn_power_up(PowerUpKind::NetworkSurge, Vec2::ONE, &tuning);
        assert!(a > world.player.id);
        assert!(b > a);
    }

    #[test]
    fn test_spawned_positions_are_wrapped() {
        let tuning = Tuning::default();
        let mut world = World::new(1, &tuning);
        world.spawn_projectile(Vec2::new(-10.0, 5000.0), Vec2::ZERO, 2.0, Owner::Player, 1, 1.0);
        assert!(world.arena.contains(world.projectiles[0].body.pos));
    }

    #[test]
    fn test_debris_respects_cap() {
        let tuning = Tuning::default();
        let mut world = World::new(1, &tuning);
        world.spawn_debris(Vec2::ZERO, Tint::Ship, 50, 100.0, 20);
        assert_eq!(world.particles.len(), 20);
        world.spawn_debris(Vec2::ZERO, Tint::Ship, 50, 100.0, 20);
        assert_eq!(world.particles.len(), 20);
    }

    #[test]
    fn test_cleanup_removes_dead_only() {
        let tuning = Tuning::default();
        let mut world = World::new(1, &tuning);
        world.spawn_projectile(Vec2::ZERO, Vec2::X, 2.0, Owner::Player, 1, 1.0);
        world.spawn_projectile(Vec2::ONE, Vec2::X, 2.0, Owner::Player, 1, 1.0);
        world.projectiles[0].body.alive = false;
        world.cleanup();
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.projectiles[0].body.pos, Vec2::ONE);
    }

    #[test]
    fn test_same_seed_same_first_wave() {
        let tuning = Tuning::default();
        let a = World::new(99, &tuning);
        let b = World::new(99, &tuning);
        match (&a.wave.phase, &b.wave.phase) {
            (WavePhase::Spawning { queue: qa, .. }, WavePhase::Spawning { queue: qb, .. }) => {
                assert_eq!(qa, qb)
            }
            _ => panic!("both worlds should start spawning"),
        }
    }
}
