//! Signal Strike entry point
//!
//! Web builds run the game in a canvas with keyboard input. Native builds
//! run a headless session flown by the autopilot and print a summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent};

    use signal_strike::audio::AudioManager;
    use signal_strike::consts::SIM_DT;
    use signal_strike::persistence::LocalStorageStore;
    use signal_strike::platform::KeyboardState;
    use signal_strike::platform::web::CanvasRenderer;
    use signal_strike::{GameLoop, Settings, Tuning};

    type WebLoop = GameLoop<CanvasRenderer, AudioManager, LocalStorageStore>;

    /// Browser-side state around the game loop
    struct Game {
        game: WebLoop,
        keyboard: KeyboardState,
        settings: Settings,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            // FPS over the last 60 frames
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 && time > oldest {
                let fps = (60000.0 / (time - oldest)).round() as u32;
                self.game.renderer_mut().set_fps(fps);
            }

            let input = self.keyboard.take_snapshot();
            self.game.merge_input(&input);
            self.game.frame(dt);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Signal Strike starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Use the page's canvas, or add one
        let canvas: HtmlCanvasElement = match document.get_element_by_id("canvas") {
            Some(el) => el.dyn_into()?,
            None => {
                let el: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
                el.set_id("canvas");
                document.body().ok_or("no body")?.append_child(&el)?;
                el
            }
        };

        let settings = Settings::load();
        let tuning = Tuning::default().with_particle_cap(settings.max_particles());

        // Canvas backing store follows the device pixel ratio
        let dpr = window.device_pixel_ratio();
        let (client_w, client_h) = match (canvas.client_width(), canvas.client_height()) {
            (w, h) if w > 0 && h > 0 => (w as f64, h as f64),
            _ => (tuning.arena.width as f64, tuning.arena.height as f64),
        };
        canvas.set_width((client_w * dpr) as u32);
        canvas.set_height((client_h * dpr) as u32);

        let renderer = CanvasRenderer::new(canvas, settings.clone()).map_err(|e| JsValue::from_str(&e))?;
        let audio = AudioManager::new(&settings);
        let seed = js_sys::Date::now() as u64;
        let game = GameLoop::new(
            seed,
            tuning,
            LocalStorageStore::default(),
            renderer,
            audio,
            settings.music_enabled,
        );
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            game,
            keyboard: KeyboardState::new(),
            settings,
            last_time: 0.0,
            frame_times: [0.0; 60],
            frame_index: 0,
        }));

        setup_keyboard(game.clone());
        setup_auto_pause(game.clone());
        request_animation_frame(game);

        log::info!("Signal Strike running!");
        Ok(())
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                // First key press counts as the gesture that unlocks audio
                g.game.audio().resume();
                if g.keyboard.key_down(&event.key(), event.repeat()) {
                    event.prevent_default();
                }
            });
            let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().keyboard.key_up(&event.key());
            });
            let _ = document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().game.request_pause();
                }
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.keyboard.release_all();
                g.game.request_pause();
                if g.settings.mute_on_blur {
                    g.game.audio_mut().set_muted(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().game.audio_mut().set_muted(false);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result};
    use clap::Parser;

    use signal_strike::autopilot::Autopilot;
    use signal_strike::consts::SIM_DT;
    use signal_strike::persistence::{FileStore, MemoryStore, ScoreStore};
    use signal_strike::platform::{CueCounter, HeadlessRenderer};
    use signal_strike::sim::{GamePhase, SoundCue};
    use signal_strike::{GameLoop, Tuning};

    /// Headless Signal Strike run flown by the autopilot
    #[derive(Debug, Parser)]
    #[command(name = "signal-strike", version, about)]
    pub struct Args {
        /// World seed (defaults to the current time)
        #[arg(long)]
        seed: Option<u64>,

        /// Simulated seconds to run
        #[arg(long, default_value_t = 120.0)]
        seconds: f32,

        /// JSON tuning overrides
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Persist the high score in this file (in memory otherwise)
        #[arg(long)]
        high_score_file: Option<PathBuf>,

        /// Drop logging to warnings after this many simulated seconds
        #[arg(long, value_name = "SECONDS")]
        quiet_after: Option<f32>,

        /// Log the HUD every this many frames (needs RUST_LOG=debug)
        #[arg(long, default_value_t = 600)]
        log_every: u64,
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path).with_context(|| format!("reading tuning file {}", path.display()))?;
        let tuning = Tuning::from_json(&json).with_context(|| format!("loading tuning from {}", path.display()))?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn run(args: Args) -> Result<()> {
        let tuning = load_tuning(args.tuning.as_ref())?;
        let seed = match args.seed {
            Some(seed) => seed,
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .context("system clock before 1970")?
                .as_millis() as u64,
        };

        let store: Box<dyn ScoreStore> = match &args.high_score_file {
            Some(path) => Box::new(FileStore::new(path.clone())),
            None => Box::new(MemoryStore::new()),
        };

        log::info!("Signal Strike (headless) seed {} for {}s", seed, args.seconds);

        let mut game = GameLoop::new(
            seed,
            tuning,
            store,
            HeadlessRenderer::new(args.log_every),
            CueCounter::default(),
            false,
        );
        let mut pilot = Autopilot::new();

        let frames = (args.seconds.max(0.0) / SIM_DT).round() as u64;
        let quiet_frame = args.quiet_after.map(|s| (s.max(0.0) / SIM_DT).round() as u64);
        let mut games = 0u32;
        let mut best_wave = 0u32;

        for frame in 0..frames {
            if Some(frame) == quiet_frame {
                log::info!("Quieting logs after {} frames", frame);
                log::set_max_level(log::LevelFilter::Warn);
            }

            let before = game.session().phase;
            let input = pilot.input_for(game.session(), game.tuning());
            game.merge_input(&input);
            game.frame(SIM_DT);

            let session = game.session();
            if before != GamePhase::Playing && session.phase == GamePhase::Playing {
                games += 1;
            }
            best_wave = best_wave.max(session.world.wave.number);
        }

        let session = game.session();
        let audio = game.audio();
        println!("Signal Strike headless run");
        println!("  seed:          {}", seed);
        println!("  frames:        {}", game.renderer().frames);
        println!("  games started: {}", games);
        println!("  best wave:     {}", best_wave);
        println!("  final phase:   {}", session.phase.label());
        println!("  final score:   {}", session.world.score.score);
        println!("  high score:    {}", game.high_score());
        println!(
            "  kills: {}  hits: {}  power-ups: {}  bombs: {}",
            audio.count(SoundCue::EnemyDestroyed),
            audio.count(SoundCue::PlayerHit),
            audio.count(SoundCue::PowerUpCollected),
            audio.count(SoundCue::BombUsed),
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    headless::run(headless::Args::parse())
}
