//! Night Flap entry point
//!
//! Browser builds run the playable game on a WebGPU canvas. Native builds
//! run a headless attract mode driven by the autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use night_flap::assets::SpriteSheet;
    use night_flap::audio::{AudioManager, AudioSink, play_events};
    use night_flap::renderer::{DrawList, GpuRenderer, RenderState, Renderer};
    use night_flap::runtime::{FixedStep, FpsCounter};
    use night_flap::sim::TickInput;
    use night_flap::{Game, Settings};

    /// Browser-side runtime context
    struct App {
        game: Game,
        renderer: Option<GpuRenderer>,
        audio: AudioManager,
        settings: Settings,
        step: FixedStep,
        fps: FpsCounter,
        input: TickInput,
        list: DrawList,
        music_started: bool,
        running: bool,
    }

    impl App {
        fn new(seed: u64, settings: Settings) -> Self {
            Self {
                game: Game::new(seed, &settings),
                renderer: None,
                audio: AudioManager::new(&settings),
                settings,
                step: FixedStep::new(),
                fps: FpsCounter::default(),
                input: TickInput::default(),
                list: DrawList::new(),
                music_started: false,
                running: true,
            }
        }

        /// Register a flap; the first one also unlocks browser audio
        fn jump(&mut self) {
            self.input.jump = true;
            if !self.music_started {
                self.audio.resume();
                self.audio.start_music();
                self.music_started = true;
            }
        }

        /// Flip mute and remember the choice for the next visit
        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_muted();
            self.audio.set_muted(muted);
            self.settings.save();
            log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
        }

        /// Run simulation ticks
        fn update(&mut self, time: f64) {
            let steps = self.step.frame(time);
            for _ in 0..steps {
                let input = self.input;
                let events = self.game.step(&input);
                play_events(&mut self.audio, &events);

                // Clear one-shot inputs after processing
                self.input.jump = false;
            }
            self.game.set_fps(self.fps.record(time));
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(renderer) = &mut self.renderer {
                self.game.compose(&mut self.list);
                renderer.present(&self.list);
            }
        }

        fn quit(&mut self) {
            self.running = false;
            self.audio.stop_music();
            log::info!("Thanks for playing! Final score: {}", self.game.session.score);

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("canvas") {
                let _ = el.set_attribute("class", "hidden");
            }
            if let Some(el) = document.get_element_by_id("goodbye") {
                let _ = el.set_attribute("class", "");
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Night Flap starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed, settings)));

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await;
        app.borrow_mut().renderer = Some(GpuRenderer::new(render_state, SpriteSheet::builtin()));

        setup_input_handlers(&canvas, app.clone());
        setup_visibility_handler(app.clone());

        // Start game loop
        request_animation_frame(app);

        log::info!("Night Flap running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Keyboard
        {
            let app = app.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    " " | "Enter" => {
                        event.prevent_default();
                        if !event.repeat() {
                            a.jump();
                        }
                    }
                    "Escape" => a.input.quit = true,
                    "m" | "M" if !event.repeat() => a.toggle_mute(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().jump();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                app.borrow_mut().jump();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Drop the time spent in a hidden tab instead of fast-forwarding through it
    fn setup_visibility_handler(app: Rc<RefCell<App>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Visible {
                app.borrow_mut().step.reset();
                log::info!("Tab visible again, clock reset");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            if a.input.quit {
                a.quit();
            }
            if !a.running {
                return;
            }

            a.update(time);
            a.render();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod attract {
    use std::process::ExitCode;

    use night_flap::assets::SpriteSheet;
    use night_flap::audio::SilentAudio;
    use night_flap::renderer::FrameStats;
    use night_flap::runtime::{Autopilot, Runtime};
    use night_flap::{Game, Settings};

    /// Sprite manifest looked up next to the binary's working directory
    const SPRITE_MANIFEST: &str = "assets/sprites.json";
    const DEFAULT_ROUNDS: u32 = 3;

    fn parse_arg<T: std::str::FromStr>(arg: Option<String>, name: &str) -> Result<Option<T>, String> {
        match arg {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| format!("invalid {name}: {raw:?}")),
        }
    }

    fn clock_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }

    pub fn run() -> ExitCode {
        let mut args = std::env::args().skip(1);
        let parsed = parse_arg::<u64>(args.next(), "seed")
            .and_then(|seed| Ok((seed, parse_arg::<u32>(args.next(), "rounds")?)));
        let (seed, rounds) = match parsed {
            Ok(v) => v,
            Err(e) => {
                log::error!("{e}");
                eprintln!("usage: night-flap [seed] [rounds]");
                return ExitCode::from(2);
            }
        };
        let seed = seed.unwrap_or_else(clock_seed);
        let rounds = rounds.unwrap_or(DEFAULT_ROUNDS);

        log::info!("Night Flap attract mode: seed {seed}, {rounds} rounds");

        let settings = Settings::load();
        let sprites = SpriteSheet::load(SPRITE_MANIFEST);
        let mut game = Game::new(seed, &settings);
        let mut pilot = Autopilot::new(rounds);
        let mut runtime = Runtime::new(FrameStats::new(sprites), SilentAudio).paced();

        let frames = runtime.run(&mut game, &mut pilot);

        let best = pilot.scores().iter().copied().max().unwrap_or(0);
        log::info!(
            "Done after {frames} frames ({} rendered, last frame {} vertices); best score {best}",
            runtime.renderer.frames,
            runtime.renderer.last_vertices
        );
        ExitCode::SUCCESS
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    attract::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
