//! Ball Jump entry point
//!
//! In the browser: mounts a session on the page and runs it from
//! `requestAnimationFrame`. Natively: replays a scripted run against an
//! in-process leaderboard.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Event, EventTarget, HtmlElement, KeyboardEvent};

    use ball_jump::consts::SIM_DT;
    use ball_jump::platform::web::HttpGateway;
    use ball_jump::sim::Key;
    use ball_jump::{PlayerId, Session, Settings};

    /// A registered DOM listener, removed again when dropped
    struct Listener {
        target: EventTarget,
        event: &'static str,
        closure: Closure<dyn FnMut(Event)>,
    }

    impl Listener {
        fn add(target: &EventTarget, event: &'static str, closure: Closure<dyn FnMut(Event)>) -> Self {
            let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            Self {
                target: target.clone(),
                event,
                closure,
            }
        }
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
        }
    }

    /// Game instance holding the session and its page bindings
    struct Game {
        session: Session<HttpGateway>,
        settings: Settings,
        last_time: f64,
        listeners: Vec<Listener>,
        frame_handle: Option<i32>,
        rendered_top: Vec<ball_jump::TopScore>,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            let player = PlayerId::load_or_create();
            let gateway = HttpGateway::new(&settings);
            let session = Session::from_settings(player, &settings, gateway);
            Self {
                session,
                settings,
                last_time: 0.0,
                listeners: Vec::new(),
                frame_handle: None,
                rendered_top: Vec::new(),
            }
        }

        /// Run due ticks for this frame
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time) / 1000.0
            } else {
                SIM_DT
            };
            self.last_time = time;
            self.session.advance(dt);
        }

        /// Update ball and HUD elements in DOM
        fn render(&mut self, document: &Document) {
            let pos = self.session.position();
            if let Some(ball) = element::<HtmlElement>(document, "ball") {
                let style = ball.style();
                let _ = style.set_property("left", &format!("{}px", pos.x));
                let _ = style.set_property("top", &format!("{}px", pos.y));
            }

            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&self.session.score().to_string()));
            }

            if let Some(el) = document.get_element_by_id("rank") {
                let text = self
                    .session
                    .projected_rank()
                    .map(|r| format!("#{}", r))
                    .unwrap_or_default();
                el.set_text_content(Some(&text));
            }

            if self.settings.show_leaderboard {
                let top = self.session.top_scores();
                if top != self.rendered_top {
                    render_leaderboard(document, &top);
                    self.rendered_top = top;
                }
            }
        }

        /// Unmount: listeners first, then the frame loop, then the session flush
        fn teardown(&mut self) {
            self.listeners.clear();
            if let Some(handle) = self.frame_handle.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(handle);
                }
            }
            if let Some(score) = self.session.teardown() {
                log::info!("Final score {} submitted", score);
            }
        }
    }

    fn element<T: JsCast>(document: &Document, id: &str) -> Option<T> {
        document.get_element_by_id(id)?.dyn_into::<T>().ok()
    }

    fn render_leaderboard(document: &Document, top: &[ball_jump::TopScore]) {
        let Some(list) = document.get_element_by_id("leaderboard") else {
            return;
        };
        list.set_text_content(None);
        for (i, entry) in top.iter().enumerate() {
            if let Ok(item) = document.create_element("li") {
                item.set_text_content(Some(&format!(
                    "{}. {} - {}",
                    i + 1,
                    entry.player_id,
                    entry.max_score
                )));
                let _ = list.append_child(&item);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Ball Jump starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };

        let settings = Settings::load();
        let game = Rc::new(RefCell::new(Game::new(settings)));
        log::info!("Playing as {}", game.borrow().session.player());

        setup_input_handlers(&window, game.clone());
        setup_teardown(&window, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Ball Jump running!");
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let target: &EventTarget = window.as_ref();
        let mut listeners = Vec::new();

        // Keyboard down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if let Some(key) = Key::from_dom(&event.key()) {
                    event.prevent_default();
                    game.borrow_mut().session.key_down(key);
                }
            });
            listeners.push(Listener::add(target, "keydown", closure));
        }

        // Keyboard up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if let Some(key) = Key::from_dom(&event.key()) {
                    game.borrow_mut().session.key_up(key);
                }
            });
            listeners.push(Listener::add(target, "keyup", closure));
        }

        // Window blur: key-up events will be lost
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                game.borrow_mut().session.release_keys();
            });
            listeners.push(Listener::add(target, "blur", closure));
        }

        game.borrow_mut().listeners = listeners;
    }

    fn setup_teardown(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // One-shot handler, freed by wasm-bindgen after it runs
        let handler = Closure::once_into_js(move |_event: Event| {
            game.borrow_mut().teardown();
        });
        let _ = window.add_event_listener_with_callback("pagehide", handler.unchecked_ref());
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let loop_game = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(loop_game, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => game.borrow_mut().frame_handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.frame_handle = None;
            if !g.session.is_running() {
                return;
            }

            g.update(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.render(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use ball_jump::consts::SIM_DT;
    use ball_jump::sim::Key;
    use ball_jump::{Gateway, LocalGateway, PlayerId, Session, Settings};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Ball Jump (native) starting...");
    log::info!("Native mode replays a scripted run - build for wasm32 to play");

    let settings = Settings::load();
    let player = PlayerId::load_or_create();
    let gateway = LocalGateway::new();
    let mut session = Session::from_settings(player, &settings, gateway.clone());

    // (frame, key, pressed)
    let script: &[(u32, Key, bool)] = &[
        (0, Key::Right, true),
        (10, Key::Jump, true),
        (12, Key::Jump, false),
        (70, Key::Jump, true),
        (71, Key::Jump, false),
        (180, Key::Right, false),
        (200, Key::Left, true),
        (260, Key::Left, false),
    ];

    let frames = 360;
    let mut events = script.iter().peekable();
    for frame in 0..frames {
        while let Some(&&(at, key, pressed)) = events.peek() {
            if at != frame {
                break;
            }
            if pressed {
                session.key_down(key);
            } else {
                session.key_up(key);
            }
            events.next();
        }
        session.advance(SIM_DT);
    }

    let state = *session.state();
    log::info!(
        "After {} ticks: pos=({:.1}, {:.1}) vel=({:.1}, {:.1}) jumping={} score={}",
        state.time_ticks,
        state.pos.x,
        state.pos.y,
        state.vel.x,
        state.vel.y,
        state.jumping,
        state.score
    );

    session.teardown();
    for (rank, entry) in gateway.top_scores().iter().enumerate() {
        println!("{:>2}. {:<20} {}", rank + 1, entry.player_id, entry.max_score);
    }
    println!("{} position reports sent", gateway.log().reports.len());
}
