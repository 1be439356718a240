//! Render snapshot
//!
//! A read-only, serializable view of the session handed to the render sink
//! once per frame. Sprites and colors are the sink's business.

use glam::Vec2;
use serde::Serialize;

use super::entity::{EnemyKind, EntityId, PowerUpKind, Tint};
use super::flow::{GamePhase, Session};
use super::geometry::Arena;

/// What an entity view depicts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "kind")]
pub enum ViewKind {
    Ship,
    Enemy(EnemyKind),
    PlayerShot,
    EnemyShot,
    PowerUp(PowerUpKind),
    Particle(Tint),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VisualFlags {
    pub shielded: bool,
    pub thrusting: bool,
    pub invulnerable: bool,
    pub boss: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    /// Particles carry no id
    pub id: Option<EntityId>,
    pub kind: ViewKind,
    pub position: Vec2,
    pub rotation: f32,
    pub radius: f32,
    /// 1 for solid entities, fading toward 0 for particles
    pub alpha: f32,
    pub flags: VisualFlags,
}

/// Heads-up display values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub high_score: u64,
    pub lives: u8,
    pub wave: u32,
    pub multiplier: u32,
    pub combo_timer: f32,
    pub bombs: u8,
    pub phase: GamePhase,
    pub wave_phase: &'static str,
    /// Remaining boss health, if a boss is on the field
    pub boss_health: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub arena: Arena,
    pub tick: u64,
    /// Ship first, then enemies, projectiles, power-ups, particles
    pub entities: Vec<EntityView>,
    pub hud: Hud,
}

impl Snapshot {
    /// Capture the session as it stands
    pub fn capture(session: &Session, high_score: u64) -> Self {
        let world = &session.world;
        let mut entities = Vec::with_capacity(
            1 + world.enemies.len() + world.projectiles.len() + world.power_ups.len() + world.particles.len(),
        );

        let player = &world.player;
        entities.push(EntityView {
            id: Some(player.id),
            kind: ViewKind::Ship,
            position: player.body.pos,
            rotation: player.heading,
            radius: player.body.radius,
            alpha: 1.0,
            flags: VisualFlags {
                shielded: player.shielded(),
                thrusting: player.thrusting,
                invulnerable: player.is_invulnerable(),
                boss: false,
            },
        });

        for e in world.enemies.iter().filter(|e| e.body.alive) {
            let kind = e.kind();
            entities.push(EntityView {
                id: Some(e.id),
                kind: ViewKind::Enemy(kind),
                position: e.body.pos,
                rotation: e.rotation,
                radius: e.body.radius,
                alpha: 1.0,
                flags: VisualFlags {
                    boss: kind.is_boss(),
                    ..Default::default()
                },
            });
        }

        for p in world.projectiles.iter().filter(|p| p.body.alive) {
            entities.push(EntityView {
                id: Some(p.id),
                kind: if p.from_player() {
                    ViewKind::PlayerShot
                } else {
                    ViewKind::EnemyShot
                },
                position: p.body.pos,
                rotation: p.body.vel.y.atan2(p.body.vel.x),
                radius: p.body.radius,
                alpha: 1.0,
                flags: VisualFlags::default(),
            });
        }

        for p in world.power_ups.iter().filter(|p| p.body.alive) {
            entities.push(EntityView {
                id: Some(p.id),
                kind: ViewKind::PowerUp(p.kind),
                position: p.body.pos,
                rotation: 0.0,
                radius: p.body.radius,
                // Blink out over the last two seconds
                alpha: (p.ttl / 2.0).min(1.0),
                flags: VisualFlags::default(),
            });
        }

        for p in world.particles.iter().filter(|p| p.body.alive) {
            entities.push(EntityView {
                id: None,
                kind: ViewKind::Particle(p.tint),
                position: p.body.pos,
                rotation: 0.0,
                radius: p.size,
                alpha: p.life,
                flags: VisualFlags::default(),
            });
        }

        let boss_health = world
            .enemies
            .iter()
            .find(|e| e.body.alive && e.kind().is_boss())
            .map(|e| e.health);

        Self {
            arena: world.arena,
            tick: world.tick_count,
            entities,
            hud: Hud {
                score: world.score.score,
                high_score: high_score.max(world.score.score),
                lives: world.lives,
                wave: world.wave.number,
                multiplier: world.score.multiplier,
                combo_timer: world.score.combo_timer,
                bombs: player.bombs,
                phase: session.phase,
                wave_phase: world.wave.phase.label(),
                boss_health,
            },
        }
    }

    pub fn ship(&self) -> Option<&EntityView> {
        self.entities.iter().find(|e| e.kind == ViewKind::Ship)
    }

    /// Extra draw positions for a view straddling the arena seam
    pub fn wrap_ghosts(&self, view: &EntityView) -> Vec<Vec2> {
        let Arena { width, height } = self.arena;
        let r = view.radius;
        let p = view.position;
        let mut xs = vec![p.x];
        let mut ys = vec![p.y];
        if p.x < r {
            xs.push(p.x + width);
        } else if p.x > width - r {
            xs.push(p.x - width);
        }
        if p.y < r {
            ys.push(p.y + height);
        } else if p.y > height - r {
            ys.push(p.y - height);
        }
        let mut ghosts = Vec::new();
        for &x in &xs {
            for &y in &ys {
                if x != p.x || y != p.y {
                    ghosts.push(Vec2::new(x, y));
                }
            }
        }
        ghosts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::events::TickOutput;
    use crate::sim::input::InputSnapshot;
    use crate::tuning::Tuning;

    #[test]
    fn test_capture_title_screen() {
        let tuning = Tuning::default();
        let session = Session::new(4, &tuning);
        let snap = Snapshot::capture(&session, 1234);
        assert_eq!(snap.hud.phase, GamePhase::Title);
        assert_eq!(snap.hud.high_score, 1234);
        assert_eq!(snap.hud.lives, tuning.player.start_lives);
        assert_eq!(snap.entities.len(), 1);
        assert!(snap.ship().is_some());
    }

    #[test]
    fn test_capture_playing_lists_entities() {
        let tuning = Tuning::default();
        let mut session = Session::new(4, &tuning);
        let fire = InputSnapshot {
            fire: true,
            ..Default::default()
        };
        let mut out = TickOutput::default();
        for _ in 0..5 {
            session.step(&fire, &tuning, SIM_DT, &mut out);
        }
        let snap = Snapshot::capture(&session, 0);
        assert_eq!(snap.hud.phase, GamePhase::Playing);
        assert!(snap.entities.iter().any(|e| e.kind == ViewKind::PlayerShot));
        assert!(snap.entities.iter().any(|e| matches!(e.kind, ViewKind::Enemy(_))));
        assert_eq!(snap.hud.wave, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let tuning = Tuning::default();
        let session = Session::new(4, &tuning);
        let json = serde_json::to_string(&Snapshot::capture(&session, 0)).expect("serialize");
        assert!(json.contains("\"phase\":\"Title\""));
        assert!(json.contains("\"type\":\"Ship\""));
    }

    #[test]
    fn test_wrap_ghosts_near_corner() {
        let tuning = Tuning::default();
        let session = Session::new(4, &tuning);
        let mut snap = Snapshot::capture(&session, 0);
        let mut view = snap.entities.remove(0);
        view.position = Vec2::new(2.0, 3.0);
        assert_eq!(snap.wrap_ghosts(&view).len(), 3);
        view.position = snap.arena.center();
        assert!(snap.wrap_ghosts(&view).is_empty());
    }
}
