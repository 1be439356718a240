//! Fixed-timestep driver
//!
//! Accumulates real frame time, runs whole `SIM_DT` steps of the session,
//! routes sound cues to the audio sink, and presents one snapshot per frame.
//! The high score is read when the loop is built and written when a game
//! ends above it.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::highscores::HighScore;
use crate::persistence::ScoreStore;
use crate::platform::{AudioSink, RenderSink};
use crate::sim::{GamePhase, InputSnapshot, Session, Snapshot, SoundCue, TickOutput};
use crate::tuning::Tuning;

pub struct GameLoop<R, A, S> {
    tuning: Tuning,
    session: Session,
    high_score: HighScore,
    store: S,
    renderer: R,
    audio: A,
    accumulator: f32,
    /// Held controls plus one-shots waiting for the next substep
    input: InputSnapshot,
    music_on: bool,
    out: TickOutput,
}

impl<R: RenderSink, A: AudioSink, S: ScoreStore> GameLoop<R, A, S> {
    pub fn new(seed: u64, tuning: Tuning, store: S, renderer: R, mut audio: A, music_on: bool) -> Self {
        let high_score = HighScore::load(&store);
        audio.set_music(music_on);
        let session = Session::new(seed, &tuning);
        Self {
            tuning,
            session,
            high_score,
            store,
            renderer,
            audio,
            accumulator: 0.0,
            input: InputSnapshot::default(),
            music_on,
            out: TickOutput::default(),
        }
    }

    /// Replace held controls and latch any new one-shots
    pub fn merge_input(&mut self, input: &InputSnapshot) {
        let pending = &mut self.input;
        pending.rotate_left = input.rotate_left;
        pending.rotate_right = input.rotate_right;
        pending.turn_axis = input.turn_axis;
        pending.thrust = input.thrust;
        pending.fire = input.fire;
        pending.bomb |= input.bomb;
        pending.pause_toggle |= input.pause_toggle;
        pending.music_toggle |= input.music_toggle;
        pending.restart |= input.restart;
    }

    /// Pause if a game is running (tab hidden, window blurred)
    pub fn request_pause(&mut self) {
        if self.session.phase == GamePhase::Playing {
            self.input.pause_toggle = true;
            log::info!("Auto-paused");
        }
    }

    /// Advance by one real frame; returns the number of substeps run
    pub fn frame(&mut self, real_dt: f32) -> u32 {
        let dt = if real_dt.is_finite() && real_dt > 0.0 {
            real_dt.min(MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        let snapshot = Snapshot::capture(&self.session, self.high_score.best());
        self.renderer.present(&snapshot);
        substeps
    }

    fn step(&mut self) {
        if self.input.music_toggle {
            self.music_on = !self.music_on;
            self.audio.set_music(self.music_on);
            log::debug!("Music {}", if self.music_on { "on" } else { "off" });
        }

        let before = self.session.phase;
        self.out.clear();
        self.session.step(&self.input, &self.tuning, SIM_DT, &mut self.out);

        if before == GamePhase::Playing && self.session.phase == GamePhase::GameOver {
            let score = self.session.world.score.score;
            if self.high_score.submit(score, &mut self.store) {
                log::info!("New high score: {}", score);
                self.out.sounds.push(SoundCue::HighScore);
            }
        }

        for cue in self.out.sounds.drain(..) {
            self.audio.play(cue);
        }
        self.input.clear_one_shots();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    pub fn music_on(&self) -> bool {
        self.music_on
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::platform::{CueCounter, HeadlessRenderer};

    type TestLoop = GameLoop<HeadlessRenderer, CueCounter, MemoryStore>;

    fn new_loop(store: MemoryStore) -> TestLoop {
        GameLoop::new(
            5,
            Tuning::default(),
            store,
            HeadlessRenderer::default(),
            CueCounter::default(),
            true,
        )
    }

    fn press(f: impl FnOnce(&mut InputSnapshot)) -> InputSnapshot {
        let mut input = InputSnapshot::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_renders_once_per_frame() {
        let mut game = new_loop(MemoryStore::new());
        assert_eq!(game.frame(SIM_DT), 1);
        assert_eq!(game.frame(SIM_DT * 0.25), 0);
        assert_eq!(game.renderer().frames, 2);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut game = new_loop(MemoryStore::new());
        // 0.1 s of simulation at most
        let steps = game.frame(2.0);
        assert!(steps >= 5 && steps as f32 * SIM_DT <= MAX_FRAME_DT + 1e-6);
        assert_eq!(game.frame(f32::NAN), 0);
    }

    #[test]
    fn test_one_shot_consumed_once() {
        let mut game = new_loop(MemoryStore::new());
        game.merge_input(&press(|i| i.restart = true));
        // Not enough time for a substep: the toggle waits
        game.frame(SIM_DT * 0.1);
        assert_eq!(game.session().phase, GamePhase::Title);

        game.frame(SIM_DT * 3.0);
        assert_eq!(game.session().phase, GamePhase::Playing);
        // Only the first substep saw the restart; the rest simulated
        assert_eq!(game.session().world.tick_count, 2);
    }

    #[test]
    fn test_pause_toggle_latches_across_merges() {
        let mut game = new_loop(MemoryStore::new());
        game.merge_input(&press(|i| i.fire = true));
        game.frame(SIM_DT);
        game.merge_input(&press(|i| i.pause_toggle = true));
        game.merge_input(&InputSnapshot::default());
        game.frame(SIM_DT);
        assert_eq!(game.session().phase, GamePhase::Paused);
    }

    #[test]
    fn test_music_toggle_reaches_audio() {
        let mut game = new_loop(MemoryStore::new());
        assert!(game.audio().music);
        game.merge_input(&press(|i| i.music_toggle = true));
        game.frame(SIM_DT);
        assert!(!game.music_on());
        assert!(!game.audio().music);
    }

    #[test]
    fn test_high_score_written_on_game_over() {
        let mut store = MemoryStore::new();
        store.save(10).unwrap();
        let mut game = new_loop(store);
        assert_eq!(game.high_score(), 10);

        game.merge_input(&press(|i| i.fire = true));
        game.frame(SIM_DT);
        game.session.world.score.add_bonus(5000);
        game.session.world.lives = 0;
        game.merge_input(&InputSnapshot::default());
        game.frame(SIM_DT);

        assert_eq!(game.session().phase, GamePhase::GameOver);
        assert_eq!(game.high_score(), 5000);
        assert_eq!(game.store().load().unwrap(), 5000);
        assert_eq!(game.audio().count(SoundCue::GameOver), 1);
        assert_eq!(game.audio().count(SoundCue::HighScore), 1);

        // Idle frames on the game-over screen write nothing more
        for _ in 0..10 {
            game.frame(SIM_DT);
        }
        assert_eq!(game.audio().count(SoundCue::HighScore), 1);
    }
}
