//! Ninja Ascent entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent, TouchEvent};

    use ninja_ascent::renderer::{
        AssetId, AssetSet, AssetSource, HudSnapshot, RenderError, SpriteRenderer, compose,
    };
    use ninja_ascent::sim::{
        Autopilot, EntropySource, GameEvent, GameSession, InputResponse, SessionConfig,
    };
    use ninja_ascent::{FrameControl, FrameTarget, HighScores, LoopDriver, Settings, Tuning};

    /// How long the new-record banner stays up
    const RECORD_BANNER_MS: f64 = 2500.0;
    /// Window event the surrounding page listens on for score submission
    const SCORE_EVENT: &str = "ninja-ascent:score";

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        renderer: Option<SpriteRenderer>,
        /// Decoded images, tracked even without a GPU backend
        assets: AssetSet,
        settings: Settings,
        high_scores: HighScores,
        autopilot: Option<Autopilot>,
        /// Timestamp of the current animation frame
        now_ms: f64,
        record_banner_until: f64,
        fps: u32,
    }

    /// Game plus the driver that ticks it
    struct App {
        driver: LoopDriver,
        game: Game,
    }

    impl FrameTarget for Game {
        fn advance(&mut self, dt: f32) {
            if let Some(pilot) = self.autopilot
                && pilot.wants_switch(&self.session)
            {
                self.session.handle_input();
            }
            self.session.update(dt);
            self.handle_events();
        }

        fn render(&mut self) {
            if let Some(ref mut renderer) = self.renderer {
                let frame = compose(&self.session, &*renderer, &self.settings);
                match renderer.render(&frame) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.resize(renderer.size.0, renderer.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
            self.update_hud();
        }

        fn is_live(&self) -> bool {
            self.session.is_running()
        }
    }

    impl Game {
        fn new(session: GameSession, high_scores: HighScores) -> Self {
            Self {
                session,
                renderer: None,
                assets: AssetSet::new(),
                settings: Settings::load(),
                high_scores,
                autopilot: None,
                now_ms: 0.0,
                record_banner_until: 0.0,
                fps: 0,
            }
        }

        fn asset_ready(&self, id: AssetId) -> bool {
            match self.renderer {
                Some(ref renderer) => renderer.is_ready(id),
                None => self.assets.is_ready(id),
            }
        }

        /// React to everything the session raised this tick
        fn handle_events(&mut self) {
            for event in self.session.drain_events() {
                match event {
                    GameEvent::Started => {
                        self.record_banner_until = 0.0;
                    }
                    GameEvent::NewRecord { distance } => {
                        log::info!("Record banner at {:.0} m", distance);
                        self.record_banner_until = self.now_ms + RECORD_BANNER_MS;
                    }
                    GameEvent::GameOver { distance, .. } => {
                        self.record_banner_until = 0.0;
                        log::info!("Run over at {:.1} m", distance);
                        if let Some(rank) =
                            self.high_scores.record_session(&self.session, js_sys::Date::now())
                        {
                            log::info!("Run ranked #{}", rank);
                        }
                        self.high_scores.save();
                    }
                    GameEvent::PhaseChanged { .. }
                    | GameEvent::PowerUpCollected(_)
                    | GameEvent::ShieldAbsorbed => {}
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = HudSnapshot::capture(&self.session);

            if let Some(el) = document.query_selector("#hud-distance .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{} m", hud.distance)));
            }
            if let Some(el) = document.query_selector("#hud-best .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{} m", hud.best)));
            }
            if let Some(el) = document.get_element_by_id("hud-phase") {
                if self.settings.show_phase {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-phase .hud-value").ok().flatten() {
                        val.set_text_content(Some(hud.phase));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }
            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                        val.set_text_content(Some(&self.fps.to_string()));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            // Shield and time-slow indicators (the canvas draws them too)
            if let Some(el) = document.get_element_by_id("hud-shield") {
                let class = if hud.shield { "hud-item" } else { "hud-item hidden" };
                let _ = el.set_attribute("class", class);
            }
            if let Some(el) = document.get_element_by_id("hud-slow") {
                match hud.time_slow {
                    Some(left) => {
                        let _ = el.set_attribute("class", "hud-item");
                        el.set_text_content(Some(&format!("{:.1}s", left)));
                    }
                    None => {
                        let _ = el.set_attribute("class", "hud-item hidden");
                    }
                }
            }

            if let Some(el) = document.get_element_by_id("record-banner") {
                let class = if self.now_ms < self.record_banner_until { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }

            // Show/hide game over
            if let Some(el) = document.get_element_by_id("game-over") {
                if hud.game_over {
                    let _ = el.set_attribute("class", "");
                    if let Some(title) = document.get_element_by_id("game-over-title") {
                        title.set_text_content(Some("DOOMED"));
                    }
                    if let Some(score_el) = document.get_element_by_id("final-distance") {
                        score_el.set_text_content(Some(&format!("{} m", hud.distance)));
                    }
                    if let Some(prompt) = document.get_element_by_id("restart-prompt") {
                        prompt.set_text_content(Some("Tap to Reincarnate"));
                    }
                    self.update_leaderboard(&document);
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }

        fn update_leaderboard(&self, document: &web_sys::Document) {
            let Some(list) = document.get_element_by_id("leaderboard") else {
                return;
            };
            let rows: String = self
                .high_scores
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    format!(
                        "<li><span>{}.</span> {:.0} m <em>{}</em> <small>{}</small></li>",
                        i + 1,
                        e.distance,
                        e.phase.label(),
                        ninja_ascent::highscores::format_date(e.timestamp)
                    )
                })
                .collect();
            list.set_inner_html(&rows);
        }
    }

    /// Player label the surrounding page may have stored
    fn stored_user() -> Option<String> {
        let storage = web_sys::window()?.local_storage().ok()??;
        storage.get_item("ninja_ascent_user").ok()?
    }

    /// Optional `<script id="tuning" type="application/json">` override
    fn page_tuning(document: &web_sys::Document) -> Tuning {
        let Some(json) = document
            .get_element_by_id("tuning")
            .and_then(|el| el.text_content())
        else {
            return Tuning::default();
        };
        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning override");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning override: {}", e);
                Tuning::default()
            }
        }
    }

    /// Hand a new best distance to the page, fire-and-forget
    fn report_score(user: Option<&str>, distance: f64) {
        log::info!(
            "Reporting {:.1} m for {}",
            distance,
            user.unwrap_or("guest")
        );
        let Some(window) = web_sys::window() else {
            return;
        };
        let init = web_sys::CustomEventInit::new();
        init.set_detail(&JsValue::from_f64(distance));
        match web_sys::CustomEvent::new_with_event_init_dict(SCORE_EVENT, &init) {
            Ok(event) => {
                let _ = window.dispatch_event(&event);
            }
            Err(e) => log::warn!("Could not build score event: {:?}", e),
        }
    }

    async fn init_renderer(
        canvas: &HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<SpriteRenderer, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        SpriteRenderer::new(surface, &adapter, width, height).await
    }

    /// Canvas backing size in device pixels
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Ninja Ascent starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No <canvas id=\"canvas\"> on the page");
            return;
        };
        let (width, height) = fit_canvas(&canvas);

        let user = stored_user();
        let high_scores = HighScores::load();
        let config = SessionConfig {
            high_score: high_scores.best_for(user.as_deref()),
            user_id: user.clone(),
            tuning: page_tuning(&document),
        };
        log::info!("Baseline {:.0} m", config.high_score);

        let session = GameSession::new(config, EntropySource::from_os())
            .with_reporter(move |distance| report_score(user.as_deref(), distance));

        let app = Rc::new(RefCell::new(App {
            driver: LoopDriver::new(),
            game: Game::new(session, high_scores),
        }));

        // A missing GPU is not fatal: the DOM HUD still runs
        match init_renderer(&canvas, width, height).await {
            Ok(renderer) => app.borrow_mut().game.renderer = Some(renderer),
            Err(e) => log::error!("Renderer unavailable, continuing without it: {}", e),
        }

        load_assets(app.clone());

        setup_input_handlers(&canvas, app.clone());
        setup_resize_handler(canvas.clone(), app.clone());
        setup_start_button(app.clone());

        // Show the idle field behind the start screen
        app.borrow_mut().game.render();

        log::info!("Ninja Ascent ready");
    }

    /// Decode an image through an offscreen 2D canvas into RGBA8
    fn decode_image(img: &HtmlImageElement) -> Result<(u32, u32, Vec<u8>), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let (w, h) = (img.natural_width(), img.natural_height());
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_width(w);
        canvas.set_height(h);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        ctx.draw_image_with_html_image_element(img, 0.0, 0.0)?;
        let data = ctx.get_image_data(0.0, 0.0, w as f64, h as f64)?;
        Ok((w, h, data.data().0))
    }

    fn load_assets(app: Rc<RefCell<App>>) {
        for id in AssetId::ALL {
            let img = match HtmlImageElement::new() {
                Ok(img) => img,
                Err(e) => {
                    log::warn!("Cannot create image for {:?}: {:?}", id, e);
                    continue;
                }
            };

            {
                let app = app.clone();
                let img_clone = img.clone();
                let closure = Closure::<dyn FnMut()>::new(move || {
                    let mut a = app.borrow_mut();
                    let game = &mut a.game;
                    match decode_image(&img_clone) {
                        Ok((w, h, pixels)) => {
                            if let Some(ref mut renderer) = game.renderer
                                && let Err(e) = renderer.upload_rgba(id, w, h, &pixels)
                            {
                                log::warn!("{}", e);
                                return;
                            }
                            game.assets.mark_ready(id);
                            log::info!("Loaded {} ({})", id.path(), game.asset_ready(id));
                        }
                        Err(e) => log::warn!("Decoding {} failed: {:?}", id.path(), e),
                    }
                });
                img.set_onload(Some(closure.as_ref().unchecked_ref()));
                closure.forget();
            }

            {
                let closure = Closure::<dyn FnMut()>::new(move || {
                    log::warn!("{} unavailable, drawing placeholder", id.path());
                });
                img.set_onerror(Some(closure.as_ref().unchecked_ref()));
                closure.forget();
            }

            img.set_src(id.path());
        }
    }

    /// Tap handling shared by mouse, touch and keyboard
    fn on_input(app: &Rc<RefCell<App>>) {
        let rearm = {
            let mut a = app.borrow_mut();
            let response = a.game.session.handle_input();
            response == InputResponse::Restarted && a.driver.arm()
        };
        if rearm {
            request_animation_frame(app.clone());
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                on_input(&app);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                on_input(&app);
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        if let Some(window) = web_sys::window() {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                match event.key().as_str() {
                    " " | "ArrowLeft" | "ArrowRight" => on_input(&app),
                    "i" | "I" => {
                        let mut a = app.borrow_mut();
                        a.game.autopilot = match a.game.autopilot {
                            Some(_) => None,
                            None => Some(Autopilot::default()),
                        };
                        log::info!("Autopilot: {}", a.game.autopilot.is_some());
                    }
                    "f" | "F" => {
                        let mut a = app.borrow_mut();
                        a.game.settings.show_fps = !a.game.settings.show_fps;
                        a.game.settings.save();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = fit_canvas(&canvas);
            let mut a = app.borrow_mut();
            if let Some(ref mut renderer) = a.game.renderer {
                renderer.resize(width, height);
            }
            // Keep the paused or finished field visible at the new size
            if !a.driver.is_armed() {
                a.game.render();
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_start_button(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let rearm = {
                    let mut a = app.borrow_mut();
                    a.game.session.start() && a.driver.arm()
                };
                if let Some(screen) = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.get_element_by_id("start-screen"))
                {
                    let _ = screen.set_attribute("class", "hidden");
                }
                if rearm {
                    request_animation_frame(app.clone());
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        let control = {
            let mut a = app.borrow_mut();
            let App { driver, game } = &mut *a;
            game.now_ms = time;
            let control = driver.on_frame(time, game);
            game.fps = driver.fps();
            control
        };

        if control == FrameControl::Continue {
            request_animation_frame(app);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use ninja_ascent::renderer::{AssetSet, compose};
    use ninja_ascent::sim::{Autopilot, EntropySource, GameSession, Lifecycle, SessionConfig};
    use ninja_ascent::{FrameControl, FrameTarget, HighScores, LoopDriver, Settings, Tuning};

    /// Attract-mode run: the autopilot plays, scenes are composed but not drawn
    struct Headless {
        session: GameSession,
        pilot: Autopilot,
        assets: AssetSet,
        settings: Settings,
        frames: u64,
        draw_ops: usize,
    }

    impl FrameTarget for Headless {
        fn advance(&mut self, dt: f32) {
            if self.pilot.wants_switch(&self.session) {
                self.session.handle_input();
            }
            self.session.update(dt);
            for event in self.session.drain_events() {
                log::debug!("{:?}", event);
            }
        }

        fn render(&mut self) {
            self.frames += 1;
            self.draw_ops = compose(&self.session, &self.assets, &self.settings).ops.len();
        }

        fn is_live(&self) -> bool {
            self.session.is_running()
        }
    }

    /// Balance override from a JSON file named on the command line
    fn cli_tuning() -> Tuning {
        let Some(path) = std::env::args().nth(1) else {
            return Tuning::default();
        };
        match std::fs::read_to_string(&path).map(|json| Tuning::from_json(&json)) {
            Ok(Ok(tuning)) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Ok(Err(e)) => {
                log::warn!("Ignoring {}: {}", path, e);
                Tuning::default()
            }
            Err(e) => {
                log::warn!("Cannot read {}: {}", path, e);
                Tuning::default()
            }
        }
    }

    pub fn run() {
        const DT: f32 = 1.0 / 60.0;
        const MAX_SECONDS: f32 = 180.0;

        let mut scores = HighScores::load();
        let config = SessionConfig {
            user_id: Some("autopilot".into()),
            high_score: scores.best_for(Some("autopilot")),
            tuning: cli_tuning(),
        };
        let session = GameSession::new(config, EntropySource::from_os())
            .with_reporter(|distance| log::info!("New best: {:.1} m", distance));

        let mut target = Headless {
            session,
            pilot: Autopilot::default(),
            assets: AssetSet::new(),
            settings: Settings::load(),
            frames: 0,
            draw_ops: 0,
        };
        target.session.start();

        let mut driver = LoopDriver::new();
        driver.arm();
        let max_frames = (MAX_SECONDS / DT) as u64;
        while target.frames < max_frames && driver.step(DT, &mut target) == FrameControl::Continue {}

        let session = &target.session;
        println!(
            "Autopilot reached {:.0} m in {:.1} s ({}), {} frames, {} draw ops in the last",
            session.distance(),
            session.time_survived(),
            session.phase().label(),
            target.frames,
            target.draw_ops
        );
        // A run cut off by the time limit never finished
        if session.lifecycle() == Lifecycle::GameOver {
            scores.record_session(session, 0.0);
            scores.save();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ninja Ascent (native) starting...");
    log::info!("Native mode runs the autopilot headless - run with `trunk serve` for the web version");

    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
