//! Kargo & Kaçış entry point
//!
//! On the web: wires DOM events into the session, runs the frame loop and
//! hands each snapshot to the page's `kargoDraw` renderer.
//! Natively: runs a headless autopilot and logs the HUD.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use kargo_kacis::PlatformError;
    use kargo_kacis::Session;
    use kargo_kacis::UiAction;
    use kargo_kacis::platform::{InputState, KeyValueStore, LocalStorage, MemoryStore, RenderSurface};
    use kargo_kacis::snapshot::Snapshot;

    // Drawing lives in the page; the core only ships JSON snapshots
    #[wasm_bindgen(inline_js = "
        export function present_frame(json) {
            if (typeof window.kargoDraw === 'function') {
                window.kargoDraw(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn present_frame(json: &str);
    }

    const CANVAS_ID: &str = "c";

    struct CanvasSurface;

    impl RenderSurface for CanvasSurface {
        fn present(&mut self, snapshot: &Snapshot<'_>) {
            match snapshot.to_json() {
                Ok(json) => present_frame(&json),
                Err(e) => log::warn!("Snapshot serialization failed: {}", e),
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session<Box<dyn KeyValueStore>>,
        input: InputState,
        surface: CanvasSurface,
        last_time: f64,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            let input = self.input.to_tick_input();
            self.session.frame(dt, &input);
            self.session.render(&mut self.surface);
        }
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// Overlay button callback. Returns whether the action did anything.
    #[wasm_bindgen]
    pub fn ui_action(id: &str) -> bool {
        let Some(action) = UiAction::parse(id) else {
            log::debug!("Unknown UI action {:?}", id);
            return false;
        };
        GAME.with(|slot| match slot.borrow().as_ref() {
            Some(game) => game.borrow_mut().session.handle_action(action),
            None => false,
        })
    }

    fn open_store() -> Box<dyn KeyValueStore> {
        match LocalStorage::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{}; progress will not persist", e);
                Box::new(MemoryStore::new())
            }
        }
    }

    fn find_canvas() -> Result<HtmlCanvasElement, PlatformError> {
        let window = web_sys::window().ok_or(PlatformError::NoWindow)?;
        let document = window.document().ok_or(PlatformError::NoDocument)?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .and_then(|el| el.dyn_into().ok())
            .ok_or_else(|| PlatformError::CanvasMissing(CANVAS_ID.to_string()))?;
        match canvas.get_context("2d") {
            Ok(Some(_)) => Ok(canvas),
            _ => Err(PlatformError::ContextUnavailable),
        }
    }

    fn show_fatal(err: &PlatformError) {
        log::error!("{}", err);
        if let Some(body) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
        {
            body.set_text_content(Some(&err.to_string()));
        }
    }

    fn fit_canvas(canvas: &HtmlCanvasElement, game: &Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1280.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(720.0);
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);
        game.borrow_mut().session.set_viewport(w as f32, h as f32);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Kargo & Kaçış starting...");

        let canvas = match find_canvas() {
            Ok(canvas) => canvas,
            Err(e) => {
                show_fatal(&e);
                return;
            }
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game {
            session: Session::new(open_store(), seed),
            input: InputState::new(),
            surface: CanvasSurface,
            last_time: 0.0,
        }));
        log::info!("Session initialized with seed: {}", seed);

        fit_canvas(&canvas, &game);
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        setup_input_handlers(&canvas, game.clone());
        setup_resize(canvas, game.clone());

        request_animation_frame(game);

        log::info!("Kargo & Kaçış running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if InputState::is_game_key(&code) {
                    event.prevent_default();
                }
                game.borrow_mut().input.key_down(&code);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key-up never arrives for keys released while unfocused
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().input.release_all();
            });
            let _ = window
                .add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .input
                    .pointer_moved(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() == 0 {
                    game.borrow_mut().input.set_fire(true);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if event.button() == 0 {
                    game.borrow_mut().input.set_fire(false);
                }
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            fit_canvas(&canvas, &game);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
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
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use glam::Vec2;

    use kargo_kacis::platform::{HudLogSurface, MemoryStore};
    use kargo_kacis::sim::{Run, TickInput};
    use kargo_kacis::{Phase, QualityPreset, Session, Settings, UiAction};

    const FRAME_DT: f32 = 1.0 / 60.0;
    const KITE_DIST: f32 = 260.0;
    const DASH_DIST: f32 = 70.0;

    fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
        std::env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Aim at the nearest enemy, back off when it gets close, otherwise
    /// drift toward the arena centre
    fn steer(run: &Run) -> TickInput {
        let me = run.player.pos;
        let nearest = run
            .enemies
            .iter()
            .min_by(|a, b| me.distance_squared(a.pos).total_cmp(&me.distance_squared(b.pos)));

        let Some(target) = nearest else {
            return TickInput::default();
        };

        let to_target = target.pos - me;
        let dist = to_target.length();
        let heading = if dist < KITE_DIST {
            -to_target
        } else {
            run.arena.center() - me
        };
        let heading = if heading.length_squared() > 1.0 {
            heading.normalize()
        } else {
            Vec2::ZERO
        };

        TickInput {
            up: heading.y < -0.3,
            down: heading.y > 0.3,
            left: heading.x < -0.3,
            right: heading.x > 0.3,
            dash: dist < DASH_DIST,
            pointer: run.camera.world_to_screen(target.pos),
            fire: true,
        }
    }

    pub fn run() {
        let quality = std::env::var("KARGO_QUALITY")
            .ok()
            .and_then(|q| QualityPreset::parse(&q))
            .unwrap_or_default();
        let seed: u64 = env_or("KARGO_SEED", 0x4b41_5247_4f);
        let max_frames: u32 = env_or("KARGO_FRAMES", 60 * 60 * 5);

        log::info!(
            "Headless autopilot: quality {}, seed {}, up to {} frames",
            quality.as_str(),
            seed,
            max_frames
        );

        let mut session = Session::new(MemoryStore::new(), seed);
        session.set_settings(Settings::from_preset(quality));
        let mut surface = HudLogSurface::new(120);

        session.handle_action(UiAction::Start);

        for _ in 0..max_frames {
            match session.phase() {
                Phase::Upgrade => {
                    session.handle_action(UiAction::PickCard(0));
                }
                Phase::Dead => break,
                _ => {}
            }
            let input = steer(session.run());
            session.frame(FRAME_DT, &input);
            session.render(&mut surface);
        }

        match session.summary() {
            Some(s) => log::info!(
                "Run over: wave {}, score {}, {} coins earned, balance {}",
                s.wave,
                s.score,
                s.coins_earned,
                s.balance
            ),
            None => log::info!(
                "Autopilot survived to wave {} (score {})",
                session.run().wave,
                session.run().player.score
            ),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Kargo & Kaçış (native) starting...");
    log::info!("The playable build targets the browser; running the headless autopilot");
    autopilot::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {}
