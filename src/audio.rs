//! Audio system using Web Audio API
//!
//! Procedurally generated tones for every sound cue plus a low drone for
//! background music. No external files.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::platform::AudioSink;
use crate::settings::Settings;
use crate::sim::SoundCue;

/// One voice in a cue: frequency sweep, waveform, level, timing (seconds)
#[derive(Debug, Clone, Copy)]
struct Tone {
    from: f32,
    to: f32,
    wave: OscillatorType,
    level: f32,
    delay: f64,
    length: f64,
}

const fn tone(from: f32, to: f32, wave: OscillatorType, level: f32, delay: f64, length: f64) -> Tone {
    Tone {
        from,
        to,
        wave,
        level,
        delay,
        length,
    }
}

/// Web Audio sink
pub struct AudioManager {
    ctx: Option<AudioContext>,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    /// Drone oscillators and their shared gain, created on first use
    music: Option<(Vec<OscillatorNode>, GainNode)>,
    music_on: bool,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            sfx_volume: settings.sfx_gain(),
            music_volume: (settings.master_volume * settings.music_volume).clamp(0.0, 1.0),
            muted: false,
            music: None,
            music_on: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Mute/unmute everything (window blur)
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_music_gain();
    }

    fn effect_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.sfx_volume }
    }

    fn music_level(&self) -> f32 {
        if self.muted || !self.music_on {
            0.0
        } else {
            self.music_volume * 0.12
        }
    }

    /// Create an oscillator routed through its own gain
    fn create_osc(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn voice(&self, ctx: &AudioContext, vol: f32, tone: Tone) {
        let Some((osc, gain)) = self.create_osc(ctx, tone.from, tone.wave) else {
            return;
        };
        let t = ctx.current_time() + tone.delay;

        gain.gain().set_value_at_time(vol * tone.level, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + tone.length)
            .ok();
        if tone.to != tone.from {
            osc.frequency().set_value_at_time(tone.from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(tone.to, t + tone.length)
                .ok();
        }

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + tone.length + 0.05).ok();
    }

    fn tones(cue: SoundCue) -> Vec<Tone> {
        use OscillatorType::{Sawtooth, Sine, Square, Triangle};
        match cue {
            SoundCue::PlayerFire => vec![tone(900.0, 300.0, Square, 0.08, 0.0, 0.07)],
            SoundCue::EnemyDestroyed => vec![
                tone(120.0, 30.0, Sawtooth, 0.4, 0.0, 0.3),
                tone(1500.0, 1500.0, Square, 0.12, 0.0, 0.08),
            ],
            SoundCue::PlayerHit => vec![
                tone(300.0, 40.0, Sawtooth, 0.5, 0.0, 0.5),
                tone(60.0, 40.0, Sine, 0.4, 0.0, 0.3),
            ],
            SoundCue::PowerUpCollected => [600.0, 800.0, 1000.0]
                .iter()
                .enumerate()
                .map(|(i, &f)| tone(f, f, Sine, 0.25, i as f64 * 0.08, 0.15))
                .collect(),
            SoundCue::WaveComplete => [400.0, 500.0, 600.0, 800.0]
                .iter()
                .enumerate()
                .map(|(i, &f)| tone(f, f, Triangle, 0.3, i as f64 * 0.1, 0.4))
                .collect(),
            SoundCue::BombUsed => vec![
                tone(100.0, 25.0, Sawtooth, 0.6, 0.0, 0.7),
                tone(2000.0, 200.0, Square, 0.15, 0.0, 0.3),
            ],
            SoundCue::BossIncoming => [110.0, 110.0, 82.5]
                .iter()
                .enumerate()
                .map(|(i, &f)| tone(f, f * 0.9, Sawtooth, 0.35, i as f64 * 0.35, 0.3))
                .collect(),
            SoundCue::BossAttack => vec![tone(220.0, 660.0, Triangle, 0.2, 0.0, 0.2)],
            SoundCue::ShieldBlock => vec![
                tone(1200.0, 1200.0, Sine, 0.2, 0.0, 0.12),
                tone(1800.0, 1800.0, Sine, 0.15, 0.02, 0.12),
            ],
            SoundCue::ExtraLife => [500.0, 750.0, 1000.0]
                .iter()
                .enumerate()
                .map(|(i, &f)| tone(f, f, Square, 0.15, i as f64 * 0.06, 0.12))
                .collect(),
            SoundCue::GameOver => [400.0, 350.0, 300.0, 200.0]
                .iter()
                .enumerate()
                .map(|(i, &f)| tone(f, f, Sine, 0.3, i as f64 * 0.2, 0.3))
                .collect(),
            SoundCue::HighScore => [500.0, 600.0, 700.0, 800.0, 1000.0]
                .iter()
                .enumerate()
                .map(|(i, &f)| tone(f, f, Triangle, 0.25, i as f64 * 0.08, 0.25))
                .collect(),
        }
    }

    /// Start the drone the first time music is wanted
    fn ensure_music(&mut self) {
        if self.music.is_some() {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        let Ok(bus) = ctx.create_gain() else { return };
        bus.gain().set_value(0.0);
        if bus.connect_with_audio_node(&ctx.destination()).is_err() {
            return;
        }

        // Root and a detuned fifth
        let mut oscs = Vec::new();
        for (freq, wave) in [(55.0, OscillatorType::Sawtooth), (82.8, OscillatorType::Triangle)] {
            let Ok(osc) = ctx.create_oscillator() else { continue };
            osc.set_type(wave);
            osc.frequency().set_value(freq);
            if osc.connect_with_audio_node(&bus).is_ok() {
                osc.start().ok();
                oscs.push(osc);
            }
        }
        log::debug!("Music drone started ({} voices)", oscs.len());
        self.music = Some((oscs, bus));
    }

    fn apply_music_gain(&self) {
        let (Some(ctx), Some((_, bus))) = (&self.ctx, &self.music) else {
            return;
        };
        let t = ctx.current_time();
        bus.gain().cancel_scheduled_values(t).ok();
        bus.gain().set_value_at_time(bus.gain().value(), t).ok();
        bus.gain()
            .linear_ramp_to_value_at_time(self.music_level(), t + 0.3)
            .ok();
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, cue: SoundCue) {
        let vol = self.effect_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        for tone in Self::tones(cue) {
            self.voice(ctx, vol, tone);
        }
    }

    fn set_music(&mut self, enabled: bool) {
        self.music_on = enabled;
        if enabled {
            self.ensure_music();
        }
        self.apply_music_gain();
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        if let Some((oscs, _)) = &self.music {
            for osc in oscs {
                osc.stop().ok();
            }
        }
    }
}
