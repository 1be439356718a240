//! Canvas 2D render sink
//!
//! Vector shapes per entity kind, wrap ghosts at the arena seam, HUD text
//! and phase overlays. Scales the arena to whatever size the canvas has.

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::RenderSink;
use crate::settings::Settings;
use crate::sim::entity::Tint;
use crate::sim::{EnemyKind, EntityView, GamePhase, PowerUpKind, Snapshot, ViewKind};

const BACKGROUND: &str = "#05070f";
const GRID: &str = "#0d1830";
const HUD_TEXT: &str = "#d8e6ff";

fn enemy_color(kind: EnemyKind) -> &'static str {
    match kind {
        EnemyKind::SignalDisruptor => "#ff4d6d",
        EnemyKind::DataPacket => "#ffd166",
        EnemyKind::NetworkNode => "#06d6a0",
        EnemyKind::LegacyTower => "#8d99ae",
        EnemyKind::SpectrumJammer => "#c77dff",
    }
}

fn power_up_color(kind: PowerUpKind) -> &'static str {
    match kind {
        PowerUpKind::BandwidthBoost => "#4cc9f0",
        PowerUpKind::SignalShield => "#80ffdb",
        PowerUpKind::SpectrumSpread => "#f72585",
        PowerUpKind::NetworkSurge => "#ffbe0b",
    }
}

fn power_up_letter(kind: PowerUpKind) -> &'static str {
    match kind {
        PowerUpKind::BandwidthBoost => "B",
        PowerUpKind::SignalShield => "S",
        PowerUpKind::SpectrumSpread => "W",
        PowerUpKind::NetworkSurge => "N",
    }
}

fn tint_color(tint: Tint) -> &'static str {
    match tint {
        Tint::Enemy(kind) => enemy_color(kind),
        Tint::PowerUp(kind) => power_up_color(kind),
        Tint::Ship => "#e0fbfc",
        Tint::Bomb => "#ffffff",
    }
}

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    settings: Settings,
    fps: u32,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement, settings: Settings) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("get_context failed: {:?}", e))?
            .ok_or("2d context unavailable")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "not a 2d context".to_string())?;
        Ok(Self {
            canvas,
            ctx,
            settings,
            fps: 0,
        })
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps;
    }

    fn clear(&self, snapshot: &Snapshot) {
        let ctx = &self.ctx;
        let (w, h) = (snapshot.arena.width as f64, snapshot.arena.height as f64);
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, w, h);

        ctx.set_stroke_style_str(GRID);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        let step = 80.0;
        let mut x = 0.0;
        while x <= w {
            ctx.move_to(x, 0.0);
            ctx.line_to(x, h);
            x += step;
        }
        let mut y = 0.0;
        while y <= h {
            ctx.move_to(0.0, y);
            ctx.line_to(w, y);
            y += step;
        }
        ctx.stroke();
    }

    /// Closed polygon with `sides` vertices around `at`
    fn polygon(&self, at: Vec2, radius: f32, sides: u32, rotation: f32) {
        let ctx = &self.ctx;
        ctx.begin_path();
        for i in 0..sides {
            let a = rotation as f64 + TAU * i as f64 / sides as f64;
            let x = at.x as f64 + radius as f64 * a.cos();
            let y = at.y as f64 + radius as f64 * a.sin();
            if i == 0 {
                ctx.move_to(x, y);
            } else {
                ctx.line_to(x, y);
            }
        }
        ctx.close_path();
    }

    fn circle(&self, at: Vec2, radius: f32) {
        self.ctx.begin_path();
        self.ctx
            .arc(at.x as f64, at.y as f64, radius.max(0.5) as f64, 0.0, TAU)
            .ok();
    }

    fn draw_ship(&self, view: &EntityView, at: Vec2) {
        let ctx = &self.ctx;
        let r = view.radius as f64;
        ctx.save();
        ctx.translate(at.x as f64, at.y as f64).ok();
        ctx.rotate(view.rotation as f64).ok();

        if view.flags.thrusting {
            ctx.set_fill_style_str("#ff9f1c");
            ctx.begin_path();
            ctx.move_to(-r * 0.6, -r * 0.35);
            ctx.line_to(-r * 1.5, 0.0);
            ctx.line_to(-r * 0.6, r * 0.35);
            ctx.close_path();
            ctx.fill();
        }

        ctx.set_stroke_style_str(tint_color(Tint::Ship));
        ctx.set_line_width(2.0);
        ctx.begin_path();
        ctx.move_to(r * 1.2, 0.0);
        ctx.line_to(-r * 0.8, -r * 0.75);
        ctx.line_to(-r * 0.4, 0.0);
        ctx.line_to(-r * 0.8, r * 0.75);
        ctx.close_path();
        ctx.stroke();
        ctx.restore();

        if view.flags.shielded {
            ctx.set_stroke_style_str(power_up_color(PowerUpKind::SignalShield));
            self.circle(at, view.radius * 1.6);
            ctx.stroke();
        }
    }

    fn draw_view(&self, view: &EntityView, at: Vec2) {
        let ctx = &self.ctx;
        ctx.set_global_alpha(view.alpha.clamp(0.0, 1.0) as f64);
        match view.kind {
            ViewKind::Ship => self.draw_ship(view, at),
            ViewKind::Enemy(kind) => {
                let color = enemy_color(kind);
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(if view.flags.boss { 3.0 } else { 2.0 });
                match kind {
                    EnemyKind::SignalDisruptor => self.polygon(at, view.radius, 3, view.rotation),
                    EnemyKind::DataPacket => self.polygon(at, view.radius, 4, view.rotation),
                    EnemyKind::NetworkNode => self.polygon(at, view.radius, 6, view.rotation),
                    EnemyKind::LegacyTower => self.polygon(at, view.radius, 5, view.rotation),
                    EnemyKind::SpectrumJammer => self.polygon(at, view.radius, 8, view.rotation),
                }
                ctx.stroke();
            }
            ViewKind::PlayerShot => {
                ctx.set_fill_style_str("#e0fbfc");
                self.circle(at, view.radius);
                ctx.fill();
            }
            ViewKind::EnemyShot => {
                ctx.set_fill_style_str("#ff5d8f");
                self.circle(at, view.radius);
                ctx.fill();
            }
            ViewKind::PowerUp(kind) => {
                let color = power_up_color(kind);
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(2.0);
                self.circle(at, view.radius);
                ctx.stroke();
                ctx.set_fill_style_str(color);
                ctx.set_font("bold 12px monospace");
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                ctx.fill_text(power_up_letter(kind), at.x as f64, at.y as f64).ok();
            }
            ViewKind::Particle(tint) => {
                ctx.set_fill_style_str(tint_color(tint));
                let s = view.radius as f64;
                ctx.fill_rect(at.x as f64 - s * 0.5, at.y as f64 - s * 0.5, s, s);
            }
        }
        ctx.set_global_alpha(1.0);
    }

    fn draw_hud(&self, snapshot: &Snapshot) {
        let ctx = &self.ctx;
        let hud = &snapshot.hud;
        let w = snapshot.arena.width as f64;

        ctx.set_fill_style_str(HUD_TEXT);
        ctx.set_font("16px monospace");
        ctx.set_text_baseline("top");

        ctx.set_text_align("left");
        ctx.fill_text(&format!("SCORE {:>8}", hud.score), 16.0, 12.0).ok();
        ctx.fill_text(&format!("HIGH  {:>8}", hud.high_score), 16.0, 32.0).ok();
        if hud.multiplier > 1 {
            ctx.fill_text(&format!("x{} ({:.1}s)", hud.multiplier, hud.combo_timer), 16.0, 52.0)
                .ok();
        }

        ctx.set_text_align("right");
        ctx.fill_text(&format!("WAVE {}", hud.wave), w - 16.0, 12.0).ok();
        ctx.fill_text(&format!("LIVES {}  BOMBS {}", hud.lives, hud.bombs), w - 16.0, 32.0)
            .ok();
        if self.settings.show_fps {
            ctx.fill_text(&format!("{} fps", self.fps), w - 16.0, 52.0).ok();
        }

        if let Some(health) = hud.boss_health {
            ctx.set_text_align("center");
            ctx.set_fill_style_str(enemy_color(EnemyKind::SpectrumJammer));
            ctx.fill_text(&format!("JAMMER {}", health), w / 2.0, 12.0).ok();
        }
    }

    fn draw_overlay(&self, snapshot: &Snapshot) {
        let (title, subtitle) = match snapshot.hud.phase {
            GamePhase::Playing => {
                if snapshot.hud.wave_phase == "boss_intro" {
                    ("WARNING: SPECTRUM JAMMER", "")
                } else {
                    return;
                }
            }
            GamePhase::Title => ("SIGNAL STRIKE", "Press Space to start"),
            GamePhase::Paused => ("PAUSED", "Press P or Esc to resume"),
            GamePhase::GameOver => ("GAME OVER", "Press Enter to continue"),
        };
        let ctx = &self.ctx;
        let center = snapshot.arena.center();
        let (cx, cy) = (center.x as f64, center.y as f64);

        if snapshot.hud.phase != GamePhase::Playing {
            ctx.set_fill_style_str("rgba(0, 0, 0, 0.55)");
            ctx.fill_rect(0.0, 0.0, snapshot.arena.width as f64, snapshot.arena.height as f64);
        }

        ctx.set_fill_style_str(HUD_TEXT);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_font("bold 40px monospace");
        ctx.fill_text(title, cx, cy - 20.0).ok();
        ctx.set_font("18px monospace");
        ctx.fill_text(subtitle, cx, cy + 24.0).ok();
    }
}

impl RenderSink for CanvasRenderer {
    fn present(&mut self, snapshot: &Snapshot) {
        let sx = self.canvas.width() as f64 / snapshot.arena.width as f64;
        let sy = self.canvas.height() as f64 / snapshot.arena.height as f64;
        self.ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0).ok();

        self.clear(snapshot);

        // Six frames on, six frames off
        let blink_off = self.settings.effective_blink() && (snapshot.tick / 6) % 2 == 1;
        let ghosts = self.settings.quality.wrap_ghosts();

        for view in &snapshot.entities {
            if view.flags.invulnerable && blink_off {
                continue;
            }
            self.draw_view(view, view.position);
            if ghosts && !matches!(view.kind, ViewKind::Particle(_)) {
                for at in snapshot.wrap_ghosts(view) {
                    self.draw_view(view, at);
                }
            }
        }

        self.draw_hud(snapshot);
        self.draw_overlay(snapshot);
    }
}
