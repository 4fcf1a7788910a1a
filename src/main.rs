//! Trajectory Trainer entry point
//!
//! The browser build wires the session controller to the DOM: a canvas, the
//! session buttons and selectors, the HUD and the progress panel. The native
//! build runs one headless session with a simulated player.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_trainer {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlSelectElement, MouseEvent};

    use trajectory_trainer::consts::*;
    use trajectory_trainer::persistence::{LocalStorageStore, TrialStore};
    use trajectory_trainer::platform::{
        ArmedCallback, DisplayRect, client_to_canvas, epoch_ms, local_offset, now_ms,
    };
    use trajectory_trainer::renderer::CanvasPainter;
    use trajectory_trainer::settings::ExerciseMode;
    use trajectory_trainer::sim::{
        Arena, Effect, Notice, NoticeKind, SessionBatch, SessionController, SessionMode,
        SessionPhase,
    };
    use trajectory_trainer::{ProgressReport, Settings};

    /// Trainer instance holding all state
    struct Trainer {
        controller: SessionController,
        painter: CanvasPainter,
        store: LocalStorageStore,
        settings: Settings,
        /// Outstanding requestAnimationFrame
        raf: ArmedCallback<()>,
        /// Outstanding controller wake-up, keyed by its deadline
        wake: ArmedCallback<f64>,
        /// Reused for every frame and wake-up; dropped with the trainer
        on_frame: Option<Closure<dyn FnMut(f64)>>,
        on_wake: Option<Closure<dyn FnMut()>>,
        /// Timer hiding the current notice
        notice_id: Option<i32>,
    }

    impl Trainer {
        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let state = self.controller.state();
            let stats = state.stats();

            set_text(document, "#hud-score .hud-value", &stats.total_score.to_string());
            set_text(
                document,
                "#hud-response .hud-value",
                &format!("{} ms", stats.avg_response_ms),
            );
            set_text(
                document,
                "#hud-accuracy .hud-value",
                &format!("{}%", stats.accuracy),
            );
            set_text(
                document,
                "#hud-streak .hud-value",
                &stats.consecutive_hits.to_string(),
            );

            let remaining = match state.mode {
                SessionMode::ByTime { .. } => format!("{}s", state.remaining_secs),
                SessionMode::ByReps { target } => format!("{}/{}", state.done_reps, target),
            };
            set_text(document, "#hud-remaining .hud-value", &remaining);

            if let Some(el) = document.get_element_by_id("session-progress-fill") {
                let pct = state.completion() * 100.0;
                let _ = el.set_attribute("style", &format!("width: {:.1}%", pct));
            }

            let phase = state.phase;
            if let Some(btn) = document.get_element_by_id("start-btn") {
                set_disabled(&btn, phase.is_live());
            }
            if let Some(btn) = document.get_element_by_id("pause-btn") {
                set_disabled(&btn, !phase.is_active());
                let label = if phase == SessionPhase::Paused {
                    "Reanudar"
                } else {
                    "Pausar"
                };
                btn.set_text_content(Some(label));
            }
            if let Some(btn) = document.get_element_by_id("stop-btn") {
                set_disabled(&btn, !phase.is_live());
            }
            for id in ["mode-select", "duration-select", "reps-select", "level-select"] {
                if let Some(el) = document.get_element_by_id(id) {
                    set_disabled(&el, phase.is_live());
                }
            }
        }
    }

    fn current_document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn set_disabled(el: &web_sys::Element, disabled: bool) {
        if disabled {
            let _ = el.set_attribute("disabled", "");
        } else {
            let _ = el.remove_attribute("disabled");
        }
    }

    fn select(document: &Document, id: &str) -> Option<HtmlSelectElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    /// Current selector values, falling back to the saved settings
    fn read_settings(document: &Document, current: &Settings) -> Settings {
        let mut settings = current.clone();
        if let Some(mode) = select(document, "mode-select")
            .and_then(|s| s.value().parse::<ExerciseMode>().ok())
        {
            settings.mode = mode;
        }
        if let Some(secs) = select(document, "duration-select").and_then(|s| s.value().parse().ok()) {
            settings.time_secs = secs;
        }
        if let Some(reps) = select(document, "reps-select").and_then(|s| s.value().parse().ok()) {
            settings.reps = reps;
        }
        if let Some(level) = select(document, "level-select").and_then(|s| s.value().parse().ok()) {
            settings.difficulty = level;
        }
        settings.sanitized()
    }

    /// Push settings into the selectors and show the one matching the mode
    fn write_settings(document: &Document, settings: &Settings) {
        if let Some(s) = select(document, "mode-select") {
            s.set_value(settings.mode.as_str());
        }
        if let Some(s) = select(document, "duration-select") {
            s.set_value(&settings.time_secs.to_string());
        }
        if let Some(s) = select(document, "reps-select") {
            s.set_value(&settings.reps.to_string());
        }
        if let Some(s) = select(document, "level-select") {
            s.set_value(&settings.difficulty.to_string());
        }
        let (show, hide) = match settings.mode {
            ExerciseMode::Time => ("duration-field", "reps-field"),
            ExerciseMode::Reps => ("reps-field", "duration-field"),
        };
        if let Some(el) = document.get_element_by_id(show) {
            let _ = el.set_attribute("class", "field");
        }
        if let Some(el) = document.get_element_by_id(hide) {
            let _ = el.set_attribute("class", "field hidden");
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {}", e).into());
        }

        log::info!("Trajectory Trainer starting...");

        let document = current_document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()
            .map_err(|_| "not a canvas")?;

        // Logical drawing buffer; CSS may stretch it
        canvas.set_width(CANVAS_WIDTH as u32);
        canvas.set_height(CANVAS_HEIGHT as u32);

        let painter = CanvasPainter::new(&canvas).map_err(|e| JsValue::from_str(&e))?;
        let settings = Settings::load();
        write_settings(&document, &settings);

        let seed = js_sys::Date::now() as u64;
        let controller = SessionController::new(Arena::default(), seed);
        painter.paint(&controller.idle_scene());

        let trainer = Rc::new(RefCell::new(Trainer {
            controller,
            painter,
            store: LocalStorageStore,
            settings,
            raf: ArmedCallback::default(),
            wake: ArmedCallback::default(),
            on_frame: None,
            on_wake: None,
            notice_id: None,
        }));
        install_callbacks(&trainer);
        trainer.borrow().update_hud(&document);

        log::info!("Trainer initialized with seed: {}", seed);

        setup_canvas_click(&canvas, trainer.clone());
        setup_session_buttons(&document, trainer.clone());
        setup_selectors(&document, trainer.clone());

        refresh_progress(trainer).await;

        log::info!("Trajectory Trainer running!");
        Ok(())
    }

    /// Carry out the controller's requests, then re-arm the wake-up timer
    fn apply(trainer: &Rc<RefCell<Trainer>>, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Draw(commands) => trainer.borrow().painter.paint(&commands),
                Effect::RequestFrame => request_animation_frame(trainer.clone()),
                Effect::CancelFrame => cancel_animation_frame(trainer),
                Effect::Persist(batch) => persist(trainer.clone(), batch),
            }
        }
        schedule_wake(trainer.clone());
        if let Some(document) = current_document() {
            trainer.borrow().update_hud(&document);
        }
    }

    /// Build the frame and wake-up closures once; they hold the trainer weakly
    fn install_callbacks(trainer: &Rc<RefCell<Trainer>>) {
        let weak: Weak<RefCell<Trainer>> = Rc::downgrade(trainer);
        let on_frame = Closure::<dyn FnMut(f64)>::new(move |_time: f64| {
            let Some(trainer) = weak.upgrade() else {
                return;
            };
            trainer.borrow_mut().raf.take();
            let effects = trainer.borrow_mut().controller.frame(now_ms());
            apply(&trainer, effects);
        });

        let weak: Weak<RefCell<Trainer>> = Rc::downgrade(trainer);
        let on_wake = Closure::<dyn FnMut()>::new(move || {
            let Some(trainer) = weak.upgrade() else {
                return;
            };
            trainer.borrow_mut().wake.take();
            let effects = trainer.borrow_mut().controller.wake(now_ms());
            apply(&trainer, effects);
        });

        let mut t = trainer.borrow_mut();
        t.on_frame = Some(on_frame);
        t.on_wake = Some(on_wake);
    }

    fn request_animation_frame(trainer: Rc<RefCell<Trainer>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut guard = trainer.borrow_mut();
        let t = &mut *guard;
        if t.raf.is_armed() {
            return;
        }
        let Some(callback) = t.on_frame.as_ref() else {
            return;
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => t.raf.arm(id, ()),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }

    fn cancel_animation_frame(trainer: &Rc<RefCell<Trainer>>) {
        let Some(id) = trainer.borrow_mut().raf.take() else {
            return;
        };
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(id);
        }
    }

    /// Keep one wake-up armed at the controller's next deadline, touching the
    /// timer only when that deadline changes
    fn schedule_wake(trainer: Rc<RefCell<Trainer>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut guard = trainer.borrow_mut();
        let t = &mut *guard;
        let deadline = t.controller.next_deadline();
        if !t.wake.needs_rearm(deadline) {
            return;
        }
        if let Some(id) = t.wake.take() {
            window.clear_timeout_with_handle(id);
        }
        let Some(at) = deadline else {
            return;
        };
        let Some(callback) = t.on_wake.as_ref() else {
            return;
        };

        let delay = (at - now_ms()).max(0.0).ceil() as i32;
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(id) => t.wake.arm(id, at),
            Err(e) => log::error!("setTimeout failed: {:?}", e),
        }
    }

    /// Submit a finished session, report the outcome, refresh progress
    fn persist(trainer: Rc<RefCell<Trainer>>, batch: SessionBatch) {
        let (store, user_id) = {
            let t = trainer.borrow();
            (t.store, t.settings.user_id.clone())
        };
        wasm_bindgen_futures::spawn_local(async move {
            let result = store.submit_trial_batch(&user_id, &batch.records).await;
            if let Err(e) = &result {
                log::error!("Failed to save session: {}", e);
            }
            show_notice(&trainer, &batch.notice(&result));
            if result.is_ok() {
                refresh_progress(trainer).await;
            }
        });
    }

    fn show_notice(trainer: &Rc<RefCell<Trainer>>, notice: &Notice) {
        let (Some(window), Some(document)) = (web_sys::window(), current_document()) else {
            return;
        };
        let Some(el) = document.get_element_by_id("notice") else {
            return;
        };
        el.set_text_content(Some(&notice.message));
        let class = match notice.kind {
            NoticeKind::Success => "notice success",
            NoticeKind::Error => "notice error",
        };
        let _ = el.set_attribute("class", class);

        if let Some(id) = trainer.borrow_mut().notice_id.take() {
            window.clear_timeout_with_handle(id);
        }
        let callback = trainer.clone();
        let closure = Closure::once(move || {
            callback.borrow_mut().notice_id = None;
            let _ = el.set_attribute("class", "notice hidden");
        });
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            NOTICE_DURATION_MS as i32,
        ) {
            Ok(id) => trainer.borrow_mut().notice_id = Some(id),
            Err(e) => log::warn!("Notice timer failed: {:?}", e),
        }
        closure.forget();
    }

    /// Reload history and redraw the progress panel
    async fn refresh_progress(trainer: Rc<RefCell<Trainer>>) {
        let (store, user_id) = {
            let t = trainer.borrow();
            (t.store, t.settings.user_id.clone())
        };
        match store.fetch_trial_history(&user_id).await {
            Ok(history) => {
                let report = ProgressReport::from_history(&history, local_offset());
                if let Some(document) = current_document() {
                    render_progress(&document, &report);
                }
            }
            Err(e) => log::warn!("Could not load trial history: {}", e),
        }
    }

    fn render_progress(document: &Document, report: &ProgressReport) {
        if let Some(el) = document.get_element_by_id("progress-empty") {
            let class = if report.is_empty() { "" } else { "hidden" };
            let _ = el.set_attribute("class", class);
        }
        set_text(document, "#progress-total", &report.total_trials.to_string());
        set_text(
            document,
            "#progress-best",
            &format!("{} ms", report.best_response_ms),
        );
        set_text(
            document,
            "#progress-precision",
            &format!("{}%", report.overall_precision),
        );

        if let Some(chart) = document.get_element_by_id("progress-chart") {
            let bars: String = report
                .daily
                .iter()
                .map(|day| {
                    format!(
                        "<div class=\"bar\" style=\"height: {p}%\" title=\"{d}: {p}% ({n})\"><span>{label}</span></div>",
                        p = day.precision,
                        d = day.date,
                        n = day.trials,
                        label = day.date.format("%d/%m"),
                    )
                })
                .collect();
            chart.set_inner_html(&bars);
        }
    }

    fn setup_canvas_click(canvas: &HtmlCanvasElement, trainer: Rc<RefCell<Trainer>>) {
        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let rect = canvas_clone.get_bounding_client_rect();
            let display = DisplayRect {
                left: rect.left() as f32,
                top: rect.top() as f32,
                width: rect.width() as f32,
                height: rect.height() as f32,
            };
            let point = client_to_canvas(
                Vec2::new(event.client_x() as f32, event.client_y() as f32),
                display,
                Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            );
            let (_, effects) = trainer
                .borrow_mut()
                .controller
                .click(point, now_ms(), epoch_ms());
            apply(&trainer, effects);
        });
        let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_session_buttons(document: &Document, trainer: Rc<RefCell<Trainer>>) {
        // Start
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let trainer = trainer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let Some(document) = current_document() else {
                    return;
                };
                let effects = {
                    let mut t = trainer.borrow_mut();
                    let settings = read_settings(&document, &t.settings);
                    settings.save();
                    let (mode, level) = (settings.session_mode(), settings.difficulty);
                    t.settings = settings;
                    t.controller.start(mode, level, now_ms())
                };
                apply(&trainer, effects);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pause / resume
        if let Some(btn) = document.get_element_by_id("pause-btn") {
            let trainer = trainer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let effects = trainer.borrow_mut().controller.toggle_pause(now_ms());
                apply(&trainer, effects);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Stop
        if let Some(btn) = document.get_element_by_id("stop-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let effects = trainer.borrow_mut().controller.stop();
                apply(&trainer, effects);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_selectors(document: &Document, trainer: Rc<RefCell<Trainer>>) {
        for id in ["mode-select", "duration-select", "reps-select", "level-select"] {
            let Some(el) = document.get_element_by_id(id) else {
                continue;
            };
            let trainer = trainer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(document) = current_document() else {
                    return;
                };
                let mut t = trainer.borrow_mut();
                let settings = read_settings(&document, &t.settings);
                settings.save();
                t.settings = settings;
                write_settings(&document, &t.settings);
            });
            let _ = el.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_trainer::run().await {
        log::error!("Trainer failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Trajectory Trainer (native) starting...");
    log::info!("The interactive trainer runs in the browser - use `trunk serve` for the web version");

    headless::run(trajectory_trainer::Settings::load());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// One session played by a simulated user against the in-memory store
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use trajectory_trainer::persistence::{MemoryStore, TrialStore};
    use trajectory_trainer::platform::{epoch_ms, local_offset};
    use trajectory_trainer::sim::{
        Arena, Effect, SessionBatch, SessionController, SessionPhase, TrialStage,
    };
    use trajectory_trainer::{ProgressReport, Settings};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after ten simulated minutes
    const MAX_SIM_MS: f64 = 600_000.0;

    /// Host-side bookkeeping for the simulated browser
    #[derive(Default)]
    struct Host {
        frame_pending: bool,
        draws: usize,
        batches: Vec<SessionBatch>,
    }

    impl Host {
        fn apply(&mut self, effects: Vec<Effect>) {
            for effect in effects {
                match effect {
                    Effect::Draw(_) => self.draws += 1,
                    Effect::RequestFrame => self.frame_pending = true,
                    Effect::CancelFrame => self.frame_pending = false,
                    Effect::Persist(batch) => self.batches.push(batch),
                }
            }
        }
    }

    pub fn run(settings: Settings) {
        let seed = epoch_ms() as u64;
        let mut controller = SessionController::new(Arena::default(), seed);
        let mut player = Pcg32::seed_from_u64(seed.rotate_left(17));
        let mut host = Host::default();

        let mut now = 0.0;
        host.apply(controller.start(settings.session_mode(), settings.difficulty, now));
        let zone = controller.state().profile().target_zone_width;
        log::info!(
            "Headless session: {:?}, level {}",
            settings.session_mode(),
            settings.difficulty
        );

        // Reaction planned for the trial currently awaiting a click
        let mut planned: Option<(u32, f64, Vec2)> = None;
        while controller.phase() != SessionPhase::Stopped && now < MAX_SIM_MS {
            now += FRAME_MS;
            host.apply(controller.wake(now));
            if host.frame_pending {
                host.frame_pending = false;
                host.apply(controller.frame(now));
            }

            let Some(trial) = controller.state().trial.as_ref() else {
                continue;
            };
            if let TrialStage::AwaitingClick { hidden_at, landing } = trial.stage {
                if planned.is_none_or(|(n, _, _)| n != trial.number) {
                    let reaction = player.random_range(250.0..700.0);
                    let miss = Vec2::new(
                        player.random_range(-zone..zone),
                        player.random_range(-zone..zone),
                    );
                    planned = Some((trial.number, hidden_at + reaction, landing + miss));
                }
            }
            if let Some((_, at, point)) = planned {
                let awaiting = controller
                    .state()
                    .trial
                    .as_ref()
                    .is_some_and(|t| t.is_awaiting_click());
                if now >= at && awaiting {
                    let (outcome, effects) = controller.click(point, now, epoch_ms());
                    log::debug!("Click: {:?}", outcome);
                    host.apply(effects);
                }
            }
        }
        if controller.phase() != SessionPhase::Stopped {
            log::warn!("Simulation limit reached, stopping session");
            host.apply(controller.stop());
        }

        let store = MemoryStore::new();
        let user_id = settings.user_id.as_str();
        for batch in &host.batches {
            let result = pollster::block_on(store.submit_trial_batch(user_id, &batch.records));
            println!("{}", batch.notice(&result).message);
        }

        match pollster::block_on(store.fetch_trial_history(user_id)) {
            Ok(history) => {
                let report = ProgressReport::from_history(&history, local_offset());
                println!(
                    "Trials: {}  Best response: {} ms  Mean precision: {}%  ({} draws)",
                    report.total_trials, report.best_response_ms, report.overall_precision, host.draws
                );
            }
            Err(e) => log::error!("Could not read history: {}", e),
        }
    }
}
