//! Platform abstraction layer
//!
//! The simulation talks to the outside world through two sinks:
//! - `RenderSink` receives one `Snapshot` per frame
//! - `AudioSink` receives named sound cues and the music on/off state
//!
//! Browser implementations live in `web` (canvas 2D) and `crate::audio`
//! (Web Audio). Headless ones below serve the native runner and tests.

pub mod keyboard;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use keyboard::KeyboardState;

use std::collections::HashMap;

use crate::sim::{Hud, SoundCue, Snapshot};

/// Consumer of render snapshots
pub trait RenderSink {
    fn present(&mut self, snapshot: &Snapshot);
}

/// Consumer of sound cues
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
    fn set_music(&mut self, enabled: bool);
}

/// Renderer that keeps only the latest HUD
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    pub frames: u64,
    pub last_hud: Option<Hud>,
    /// Log the HUD every this many frames (0 = never)
    pub log_every: u64,
}

impl HeadlessRenderer {
    pub fn new(log_every: u64) -> Self {
        Self {
            log_every,
            ..Default::default()
        }
    }
}

impl RenderSink for HeadlessRenderer {
    fn present(&mut self, snapshot: &Snapshot) {
        self.frames += 1;
        if self.log_every > 0 && self.frames.is_multiple_of(self.log_every) {
            let hud = &snapshot.hud;
            log::debug!(
                "[{:>6}] {} wave {} ({}) score {} x{} lives {} bombs {} entities {}",
                snapshot.tick,
                hud.phase.label(),
                hud.wave,
                hud.wave_phase,
                hud.score,
                hud.multiplier,
                hud.lives,
                hud.bombs,
                snapshot.entities.len()
            );
        }
        self.last_hud = Some(snapshot.hud.clone());
    }
}

/// Audio sink that counts cues instead of playing them
#[derive(Debug, Default)]
pub struct CueCounter {
    pub counts: HashMap<SoundCue, u64>,
    pub music: bool,
}

impl CueCounter {
    pub fn count(&self, cue: SoundCue) -> u64 {
        self.counts.get(&cue).copied().unwrap_or(0)
    }
}

impl AudioSink for CueCounter {
    fn play(&mut self, cue: SoundCue) {
        log::trace!("cue {}", cue.name());
        *self.counts.entry(cue).or_insert(0) += 1;
    }

    fn set_music(&mut self, enabled: bool) {
        self.music = enabled;
    }
}
