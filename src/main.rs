//! Asteroid Blaster entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, KeyboardEvent};

    use asteroid_blaster::audio::AudioManager;
    use asteroid_blaster::consts::*;
    use asteroid_blaster::highscores::format_date;
    use asteroid_blaster::persistence::LocalStore;
    use asteroid_blaster::rewards::goal_message;
    use asteroid_blaster::{App, Difficulty, Screen, Settings};

    /// Browser-side game instance
    struct Game {
        app: App,
        ctx: CanvasRenderingContext2d,
        /// Pending requestAnimationFrame id
        frame_id: Option<i32>,
    }

    type SharedGame = Rc<RefCell<Game>>;

    impl Game {
        /// Anything on screen still moving
        fn is_animating(&self) -> bool {
            (self.app.screen() == Screen::Playing && !self.app.is_paused())
                || self.app.celebration().is_some()
                || self.app.badges().popup().is_some()
        }

        /// Menu keys; returns true when the key did something
        fn menu_key(&mut self, key: &str) -> bool {
            match (self.app.screen(), key) {
                (Screen::Welcome, "Enter") => self.app.start(),
                (Screen::SelectDifficulty, "1" | "2" | "3" | "4") => {
                    let index = key.parse::<usize>().unwrap_or(1) - 1;
                    Difficulty::ALL
                        .get(index)
                        .is_some_and(|d| self.app.select_difficulty(*d))
                }
                (Screen::Playing, "Escape") => {
                    let left = self.app.exit_round();
                    if left {
                        self.cancel_frame();
                    }
                    left
                }
                (Screen::GameOver { .. }, "Enter") => self.app.play_again(),
                (Screen::GameOver { .. }, "Escape") => self.app.main_menu(),
                (_, "m" | "M") => {
                    self.app.toggle_mute();
                    true
                }
                _ => false,
            }
        }

        fn cancel_frame(&mut self) {
            if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
        }

        fn text(&self, s: &str, x: f64, y: f64, size: u32, color: &str) {
            self.ctx.set_font(&format!("bold {}px monospace", size));
            self.ctx.set_text_align("center");
            self.ctx.set_fill_style_str(color);
            let _ = self.ctx.fill_text(s, x, y);
        }

        fn draw(&self) {
            let (w, h) = (GAME_WIDTH as f64, GAME_HEIGHT as f64);
            self.ctx.set_fill_style_str("#05070f");
            self.ctx.fill_rect(0.0, 0.0, w, h);

            match self.app.screen() {
                Screen::Welcome => {
                    self.text("ASTEROID BLASTER", w / 2.0, 160.0, 44, "#22d3ee");
                    self.text(
                        &format!("HIGH SCORE: {}", self.app.high_score()),
                        w / 2.0,
                        220.0,
                        20,
                        "#facc15",
                    );
                    if let Some(badge) = self.app.badges().current() {
                        self.text(&badge.title().to_uppercase(), w / 2.0, 260.0, 18, "#facc15");
                    }
                    self.text(&goal_message(self.app.high_score()), w / 2.0, 300.0, 16, "#fde68a");
                    self.text(
                        "Arrow keys to move, Space to shoot",
                        w / 2.0,
                        360.0,
                        16,
                        "#d1d5db",
                    );
                    self.text("Press Enter to start", w / 2.0, 420.0, 24, "#ffffff");
                }
                Screen::SelectDifficulty => {
                    self.text("SELECT DIFFICULTY", w / 2.0, 160.0, 36, "#22d3ee");
                    for (i, difficulty) in Difficulty::ALL.iter().enumerate() {
                        let color = if *difficulty == self.app.settings().difficulty {
                            "#facc15"
                        } else {
                            "#ffffff"
                        };
                        self.text(
                            &format!("{}  {}", i + 1, difficulty.as_str().to_uppercase()),
                            w / 2.0,
                            240.0 + i as f64 * 50.0,
                            24,
                            color,
                        );
                    }
                }
                Screen::Playing => {
                    self.draw_round();
                    if self.app.is_paused() {
                        self.text("PAUSED", w / 2.0, h / 2.0, 40, "#ffffff");
                    }
                }
                Screen::GameOver {
                    final_score,
                    new_high_score,
                } => {
                    self.draw_round();
                    self.ctx.set_fill_style_str("rgba(0, 0, 0, 0.6)");
                    self.ctx.fill_rect(0.0, 0.0, w, h);
                    self.text("GAME OVER", w / 2.0, 200.0, 48, "#f87171");
                    self.text(
                        &format!("FINAL SCORE: {}", final_score),
                        w / 2.0,
                        260.0,
                        24,
                        "#ffffff",
                    );
                    if new_high_score {
                        self.text("NEW HIGH SCORE!", w / 2.0, 300.0, 22, "#facc15");
                    }
                    self.text(
                        "Enter: play again    Esc: main menu",
                        w / 2.0,
                        350.0,
                        18,
                        "#d1d5db",
                    );
                    self.draw_leaderboard(400.0);
                }
            }

            let mute = if self.app.settings().muted { "M: unmute" } else { "M: mute" };
            self.ctx.set_font("12px monospace");
            self.ctx.set_text_align("right");
            self.ctx.set_fill_style_str("#6b7280");
            let _ = self.ctx.fill_text(mute, w - 8.0, h - 8.0);

            self.draw_confetti();
            if let Some(badge) = self.app.badges().popup() {
                self.text(
                    &format!("BADGE UNLOCKED: {}", badge.title()),
                    w / 2.0,
                    100.0,
                    22,
                    "#facc15",
                );
            }
        }

        /// Top five scores, the last round's entry highlighted
        fn draw_leaderboard(&self, top: f64) {
            let entries = &self.app.high_scores().entries;
            if entries.is_empty() {
                return;
            }
            let w = GAME_WIDTH as f64;
            self.text("TOP SCORES", w / 2.0, top, 18, "#22d3ee");
            let now = asteroid_blaster::platform::now_ms();
            for (i, entry) in entries.iter().take(5).enumerate() {
                let color = if self.app.last_rank() == Some(i + 1) {
                    "#facc15"
                } else {
                    "#d1d5db"
                };
                self.text(
                    &format!(
                        "{:>2}. {:>6}  {:<7} {}",
                        i + 1,
                        entry.score,
                        entry.difficulty.as_str(),
                        format_date(entry.timestamp, now)
                    ),
                    w / 2.0,
                    top + 26.0 * (i as f64 + 1.0),
                    15,
                    color,
                );
            }
        }

        fn draw_round(&self) {
            let Some(session) = self.app.session() else { return };
            let state = session.state();
            let ctx = &self.ctx;

            // Ship
            let ship = state.ship.rect;
            ctx.set_fill_style_str("#22d3ee");
            ctx.begin_path();
            ctx.move_to(ship.center_x() as f64, ship.pos.y as f64);
            ctx.line_to(ship.right() as f64, ship.bottom() as f64);
            ctx.line_to(ship.pos.x as f64, ship.bottom() as f64);
            ctx.close_path();
            ctx.fill();

            ctx.set_fill_style_str("#f43f5e");
            for laser in &state.lasers {
                let r = laser.rect;
                ctx.fill_rect(r.pos.x as f64, r.pos.y as f64, r.width() as f64, r.height() as f64);
            }

            ctx.set_fill_style_str("#9ca3af");
            for asteroid in &state.asteroids {
                let r = asteroid.rect;
                ctx.save();
                let _ = ctx.translate(r.center_x() as f64, (r.pos.y + r.height() / 2.0) as f64);
                let _ = ctx.rotate((asteroid.rotation as f64).to_radians());
                ctx.fill_rect(
                    -(r.width() as f64) / 2.0,
                    -(r.height() as f64) / 2.0,
                    r.width() as f64,
                    r.height() as f64,
                );
                ctx.restore();
            }

            if self.app.settings().explosions {
                for explosion in &state.explosions {
                    let life = explosion.life as f64;
                    let radius = explosion.size as f64 / 2.0 * (2.0 - life);
                    ctx.set_global_alpha(life.clamp(0.0, 1.0));
                    ctx.set_fill_style_str("#fb923c");
                    ctx.begin_path();
                    let _ = ctx.arc(
                        (explosion.pos.x + explosion.size / 2.0) as f64,
                        (explosion.pos.y + explosion.size / 2.0) as f64,
                        radius,
                        0.0,
                        TAU,
                    );
                    ctx.fill();
                }
                ctx.set_global_alpha(1.0);
            }

            // HUD
            ctx.set_font("bold 18px monospace");
            ctx.set_fill_style_str("#ffffff");
            ctx.set_text_align("left");
            let _ = ctx.fill_text(&format!("SCORE: {}", state.score), 12.0, 26.0);
            ctx.set_text_align("right");
            let _ = ctx.fill_text(
                &format!(
                    "{}  HI: {}",
                    session.difficulty().as_str().to_uppercase(),
                    self.app.high_score()
                ),
                GAME_WIDTH as f64 - 12.0,
                26.0,
            );
        }

        fn draw_confetti(&self) {
            let Some(celebration) = self.app.celebration() else { return };
            for piece in &celebration.pieces {
                let (x, y, r, tilt) = (
                    piece.x as f64,
                    piece.y as f64,
                    piece.radius as f64,
                    piece.tilt as f64,
                );
                self.ctx.begin_path();
                self.ctx.set_line_width(r);
                self.ctx
                    .set_stroke_style_str(&format!("hsl({}, 80%, 60%)", piece.hue));
                self.ctx.move_to(x + tilt + r / 3.0, y);
                self.ctx.line_to(x, y + tilt);
                self.ctx.stroke();
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Asteroid Blaster starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        canvas.set_width(GAME_WIDTH as u32);
        canvas.set_height(GAME_HEIGHT as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let store = LocalStore::new();
        let settings = Settings::load(&store);
        let audio = AudioManager::new(&settings);
        let app = App::new(Box::new(store), Box::new(audio));

        let game = Rc::new(RefCell::new(Game {
            app,
            ctx,
            frame_id: None,
        }));

        setup_input_handlers(&window, game.clone());
        setup_auto_pause(&window, &document, game.clone());

        {
            let game = game.clone();
            on(&canvas, "click", move |_event| {
                game.borrow_mut().app.start();
                wake(&game);
            });
        }

        {
            let game = game.clone();
            on(&window, "pagehide", move |_event| {
                let mut g = game.borrow_mut();
                g.cancel_frame();
                g.app.shutdown();
            });
        }

        game.borrow().draw();
        log::info!("Asteroid Blaster running!");
        Ok(())
    }

    fn on(target: &EventTarget, name: &str, handler: impl FnMut(Event) + 'static) {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_input_handlers(window: &web_sys::Window, game: SharedGame) {
        // Key down
        {
            let game = game.clone();
            on(window, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else { return };
                let key = event.key();
                let handled = {
                    let mut g = game.borrow_mut();
                    let control = g.app.handle_key(&key, true);
                    // Held keys repeat; menu actions fire once per press
                    control || (!event.repeat() && g.menu_key(&key))
                };
                if handled {
                    event.prevent_default();
                }
                wake(&game);
            });
        }

        // Key up
        on(window, "keyup", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else { return };
            if game.borrow_mut().app.handle_key(&event.key(), false) {
                event.prevent_default();
            }
        });
    }

    fn setup_auto_pause(window: &web_sys::Window, document: &web_sys::Document, game: SharedGame) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            on(document, "visibilitychange", move |_event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                {
                    let mut g = game.borrow_mut();
                    if hidden {
                        g.app.blur();
                    } else {
                        g.app.focus();
                    }
                }
                wake(&game);
            });
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            on(window, "blur", move |_event| {
                game.borrow_mut().app.blur();
                wake(&game);
            });
        }

        on(window, "focus", move |_event| {
            game.borrow_mut().app.focus();
            wake(&game);
        });
    }

    /// Redraw now and keep the frame loop going while anything moves
    fn wake(game: &SharedGame) {
        let schedule = {
            let mut g = game.borrow_mut();
            g.draw();
            if !g.is_animating() {
                g.cancel_frame();
            }
            g.is_animating() && g.frame_id.is_none()
        };
        if schedule {
            request_animation_frame(game.clone());
        }
    }

    fn request_animation_frame(game: SharedGame) {
        let Some(window) = web_sys::window() else { return };
        let handle = game.clone();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => handle.borrow_mut().frame_id = Some(id),
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    /// One simulation tick per presented frame
    fn game_loop(game: SharedGame) {
        let keep_going = {
            let mut g = game.borrow_mut();
            g.frame_id = None;
            g.app.frame();
            g.draw();
            g.is_animating()
        };

        if keep_going {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use asteroid_blaster::audio::SilentAudio;
    use asteroid_blaster::persistence::MemoryStore;
    use asteroid_blaster::session::FrameStatus;
    use asteroid_blaster::{App, Difficulty};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let difficulty = std::env::args()
        .nth(1)
        .and_then(|arg| Difficulty::from_str(&arg))
        .unwrap_or_default();
    log::info!(
        "Asteroid Blaster (native) starting - headless autopilot on {}",
        difficulty.as_str()
    );
    log::info!("Native mode has no window - build for wasm32 to play");

    let mut app = App::new(Box::new(MemoryStore::new()), Box::new(SilentAudio));
    app.start();
    app.select_difficulty(difficulty);

    // Two minutes of play at the nominal refresh rate
    let max_frames = 120 * asteroid_blaster::consts::FRAMES_PER_SECOND;
    for _ in 0..max_frames {
        autopilot(&mut app);
        if let FrameStatus::GameOver { final_score } = app.frame() {
            println!("Game over: final score {}", final_score);
            break;
        }
    }

    let survived = app
        .session()
        .filter(|s| s.is_running())
        .map(|s| s.state().score);
    if let Some(score) = survived {
        println!("Autopilot survived with score {}", score);
        app.exit_round();
    }
    match app.badges().current() {
        Some(badge) => println!("Badge: {}", badge.title()),
        None => println!("No badge yet"),
    }
}

/// Chase the lowest asteroid still above the ship and keep firing
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(app: &mut asteroid_blaster::App) {
    let Some(state) = app.session().map(|s| s.state()) else {
        return;
    };
    let ship = state.ship.rect;
    let target = state
        .asteroids
        .iter()
        .filter(|a| a.rect.bottom() < ship.pos.y)
        .max_by(|a, b| a.rect.pos.y.total_cmp(&b.rect.pos.y))
        .map(|a| a.rect.center_x());
    let (left, right) = match target {
        Some(x) if x < ship.center_x() - 4.0 => (true, false),
        Some(x) if x > ship.center_x() + 4.0 => (false, true),
        _ => (false, false),
    };

    app.handle_key("ArrowLeft", left);
    app.handle_key("ArrowRight", right);
    app.handle_key(" ", true);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
