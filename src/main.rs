//! Star Racer entry point
//!
//! On wasm this hosts the simulation in a canvas with keyboard controls and
//! a DOM HUD. Natively it runs a headless autopilot session and prints the
//! result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec3;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent};

    use star_racer::audio::AudioManager;
    use star_racer::highscores::{HighScoreEntry, format_age};
    use star_racer::sim::{
        EngineFx, FrameScheduler, GameEvent, GamePhase, InputState, ObstacleKind,
    };
    use star_racer::{Config, HighScores, ObjectDesc, RenderTarget, SceneHandle, ShipId, Transform};

    /// Camera distance behind and above the ship (world units)
    const CAMERA_BACK: f32 = 30.0;
    const CAMERA_HEIGHT: f32 = 14.0;
    /// Objects further ahead than this are not drawn
    const DRAW_DISTANCE: f32 = 700.0;

    struct SceneObject {
        desc: ObjectDesc,
        transform: Transform,
        flash: bool,
        spike_scale: Vec3,
        engine: Option<EngineFx>,
    }

    /// Chase-camera projection of the scene onto a 2D canvas
    struct CanvasScene {
        ctx: CanvasRenderingContext2d,
        width: f64,
        height: f64,
        objects: HashMap<SceneHandle, SceneObject>,
    }

    impl RenderTarget for CanvasScene {
        fn add_object(&mut self, handle: SceneHandle, desc: ObjectDesc, transform: &Transform) {
            self.objects.insert(
                handle,
                SceneObject {
                    desc,
                    transform: *transform,
                    flash: false,
                    spike_scale: Vec3::ONE,
                    engine: None,
                },
            );
        }

        fn remove_object(&mut self, handle: SceneHandle) {
            self.objects.remove(&handle);
        }

        fn set_transform(&mut self, handle: SceneHandle, transform: &Transform) {
            if let Some(obj) = self.objects.get_mut(&handle) {
                obj.transform = *transform;
            }
        }

        fn set_flash(&mut self, handle: SceneHandle, on: bool) {
            if let Some(obj) = self.objects.get_mut(&handle) {
                obj.flash = on;
            }
        }

        fn set_spike_scale(&mut self, handle: SceneHandle, scale: Vec3) {
            if let Some(obj) = self.objects.get_mut(&handle) {
                obj.spike_scale = scale;
            }
        }

        fn set_engine(&mut self, handle: SceneHandle, engine: &EngineFx) {
            if let Some(obj) = self.objects.get_mut(&handle) {
                obj.engine = Some(engine.clone());
            }
        }
    }

    impl CanvasScene {
        /// Project a world point; returns screen position and pixels per unit
        fn project(&self, camera: Vec3, p: Vec3) -> Option<(f64, f64, f64)> {
            let depth = (camera.z - p.z) as f64;
            if depth <= 1.0 {
                return None;
            }
            let focal = self.height * 0.9;
            let scale = focal / depth;
            let x = self.width / 2.0 + (p.x - camera.x * 0.5) as f64 * scale;
            let y = self.height * 0.35 + (camera.y - p.y) as f64 * scale;
            Some((x, y, scale))
        }

        fn draw(&self, track_width: f32) {
            let ctx = &self.ctx;
            ctx.set_fill_style_str("#05030f");
            ctx.fill_rect(0.0, 0.0, self.width, self.height);

            let ship = self
                .objects
                .get(&SceneHandle::SHIP)
                .map(|o| o.transform.translation)
                .unwrap_or(Vec3::ZERO);
            let camera = Vec3::new(ship.x, ship.y + CAMERA_HEIGHT, ship.z + CAMERA_BACK);

            self.draw_track(camera, ship.z, track_width);

            // Painter's order: far to near
            let mut order: Vec<&SceneObject> = self
                .objects
                .values()
                .filter(|o| o.transform.translation.z > ship.z - DRAW_DISTANCE)
                .collect();
            order.sort_by(|a, b| a.transform.translation.z.total_cmp(&b.transform.translation.z));

            for obj in order {
                let Some((x, y, scale)) = self.project(camera, obj.transform.translation) else {
                    continue;
                };
                match obj.desc {
                    ObjectDesc::Ship(id) => self.draw_ship(x, y, scale, id, obj),
                    ObjectDesc::Obstacle(kind) => self.draw_obstacle(x, y, scale, kind, obj),
                    ObjectDesc::Coin => {
                        // Spin shows as the coin face narrowing
                        let squash = obj.transform.rotation.y.cos().abs().max(0.15) as f64;
                        ctx.set_fill_style_str("#ffd23f");
                        ctx.begin_path();
                        let _ = ctx.ellipse(
                            x,
                            y,
                            1.5 * scale * squash,
                            1.5 * scale,
                            0.0,
                            0.0,
                            std::f64::consts::TAU,
                        );
                        ctx.fill();
                    }
                }
            }
        }

        fn draw_track(&self, camera: Vec3, ship_z: f32, track_width: f32) {
            let ctx = &self.ctx;
            let half = track_width / 2.0;
            ctx.set_stroke_style_str("#3a2f7a");
            ctx.set_line_width(2.0);
            for edge in [-half, half] {
                let near = self.project(camera, Vec3::new(edge, 0.0, ship_z + 10.0));
                let far = self.project(camera, Vec3::new(edge, 0.0, ship_z - DRAW_DISTANCE));
                if let (Some(near), Some(far)) = (near, far) {
                    ctx.begin_path();
                    ctx.move_to(near.0, near.1);
                    ctx.line_to(far.0, far.1);
                    ctx.stroke();
                }
            }
        }

        fn draw_ship(&self, x: f64, y: f64, scale: f64, id: ShipId, obj: &SceneObject) {
            let ctx = &self.ctx;
            let color = match (obj.flash, id) {
                (true, _) => "#ff2a2a",
                (false, ShipId::Speeder) => "#4fd1ff",
                (false, ShipId::Bumble) => "#ffb347",
            };
            let w = 4.0 * scale;
            let h = 3.0 * scale;
            ctx.save();
            let _ = ctx.translate(x, y);
            let _ = ctx.rotate(-obj.transform.rotation.z as f64);
            if let Some(engine) = &obj.engine {
                self.draw_engine(w, h, scale, engine);
            }
            ctx.set_fill_style_str(color);
            ctx.begin_path();
            ctx.move_to(0.0, -h);
            ctx.line_to(w, h);
            ctx.line_to(-w, h);
            ctx.close_path();
            ctx.fill();
            ctx.restore();
        }

        /// Exhaust behind the hull, outer flame layers first
        fn draw_engine(&self, w: f64, h: f64, scale: f64, engine: &EngineFx) {
            const LAYER_COLORS: [&str; 3] = ["#fff3b0", "#ffa62b", "#ff6b1a"];
            let ctx = &self.ctx;
            let layers = engine.flame_scales.len();
            for (i, flame) in engine.flame_scales.iter().enumerate().rev() {
                let spread = (layers - i) as f64 / layers as f64;
                let half = w * 0.45 * spread * flame.x as f64;
                let len = 2.5 * scale * spread * flame.y as f64;
                ctx.set_fill_style_str(LAYER_COLORS[i.min(LAYER_COLORS.len() - 1)]);
                ctx.begin_path();
                ctx.move_to(-half, h);
                ctx.line_to(half, h);
                ctx.line_to(0.0, h + len);
                ctx.close_path();
                ctx.fill();
            }

            ctx.set_fill_style_str("#7fdbff");
            for (side, thrust) in [(-1.0, engine.left_thruster), (1.0, engine.right_thruster)] {
                let cx = side * w * 0.8;
                let len = 1.2 * scale * thrust as f64;
                ctx.begin_path();
                ctx.move_to(cx - 0.3 * scale, h);
                ctx.line_to(cx + 0.3 * scale, h);
                ctx.line_to(cx, h + len);
                ctx.close_path();
                ctx.fill();
            }
        }

        fn draw_obstacle(&self, x: f64, y: f64, scale: f64, kind: ObstacleKind, obj: &SceneObject) {
            let ctx = &self.ctx;
            let size = obj.transform.scale.x as f64 * 0.8 * scale;
            ctx.save();
            let _ = ctx.translate(x, y);
            let _ = ctx.rotate(obj.transform.rotation.y as f64);
            match kind {
                ObstacleKind::Cube => {
                    ctx.set_fill_style_str("#9b5de5");
                    ctx.fill_rect(-size / 2.0, -size / 2.0, size, size);
                }
                ObstacleKind::Asteroid => {
                    ctx.set_fill_style_str("#7d6b5d");
                    ctx.begin_path();
                    let _ = ctx.arc(0.0, 0.0, size / 2.0, 0.0, std::f64::consts::TAU);
                    ctx.fill();
                }
                ObstacleKind::SpikySphere => {
                    let spike = size * 0.5 * obj.spike_scale.y as f64;
                    ctx.set_fill_style_str("#f15bb5");
                    ctx.begin_path();
                    for i in 0..16 {
                        let a = i as f64 * std::f64::consts::TAU / 16.0;
                        let r = if i % 2 == 0 { size * 0.4 + spike } else { size * 0.4 };
                        ctx.line_to(a.cos() * r, a.sin() * r);
                    }
                    ctx.close_path();
                    ctx.fill();
                }
            }
            ctx.restore();
        }
    }

    struct Game {
        scheduler: FrameScheduler,
        scene: CanvasScene,
        audio: AudioManager,
        input: InputState,
        high_scores: HighScores,
        /// Rank of the last finished run, if it made the table
        last_rank: Option<usize>,
    }

    impl Game {
        fn record_run(&mut self, event: GameEvent) {
            if let GameEvent::GameOver { score, distance } = event {
                let entry = HighScoreEntry {
                    score,
                    distance,
                    ship: self.scheduler.session.ship.id,
                    timestamp: js_sys::Date::now(),
                };
                self.last_rank = self.high_scores.record(entry);
                if let Some(rank) = self.last_rank {
                    log::info!("New high score #{}: {}", rank, score);
                    self.high_scores.save();
                }
            }
        }

        fn frame(&mut self, time: f64) {
            let report = self
                .scheduler
                .frame(time, &self.input, &mut self.scene, &mut self.audio);
            for event in report.events {
                self.record_run(event);
            }
            self.scene.draw(self.scheduler.session.config.track_width);
        }

        fn start(&mut self) {
            self.audio.resume();
            self.last_rank = None;
            self.scheduler.start_session(&mut self.scene, &mut self.audio);
        }

        fn on_key(&mut self, key: &str, down: bool) {
            match key {
                "ArrowLeft" | "a" | "A" => self.input.left = down,
                "ArrowRight" | "d" | "D" => self.input.right = down,
                " " | "ArrowUp" | "w" | "W" => self.input.boost = down,
                _ if !down => {}
                "Enter" => match self.scheduler.phase() {
                    GamePhase::Start | GamePhase::ShipSelect | GamePhase::GameOver => self.start(),
                    GamePhase::Playing => {}
                },
                "s" | "S" => {
                    self.scheduler.select_ship();
                }
                "1" | "2" => {
                    let id = if key == "1" { ShipId::Speeder } else { ShipId::Bumble };
                    self.scheduler.choose_ship(id);
                }
                "m" | "M" => {
                    let muted = self.audio.toggle_muted();
                    log::info!("Audio muted: {}", muted);
                }
                "Escape" => {
                    if let Some(event) = self.scheduler.end_session(&mut self.audio) {
                        self.record_run(event);
                    } else {
                        self.scheduler.return_to_start(&mut self.scene);
                    }
                }
                _ => {}
            }
        }

        fn update_hud(&self, document: &Document) {
            let session = &self.scheduler.session;
            let set_text = |id: &str, text: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            };
            let show = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };

            set_text("hud-score", &session.score.to_string());
            set_text("hud-health", &"♥".repeat(session.health as usize));
            set_text("hud-distance", &format!("{:.0}", session.distance));

            let phase = session.phase;
            show("start-screen", phase == GamePhase::Start);
            show("ship-select", phase == GamePhase::ShipSelect);
            show("game-over", phase == GamePhase::GameOver);
            set_text("selected-ship", session.ship.id.as_str());

            if phase == GamePhase::GameOver {
                set_text("final-score", &session.score.to_string());
                set_text("final-distance", &format!("{:.0}", session.distance));
                let rank = match self.last_rank {
                    Some(rank) => format!("New high score! #{}", rank),
                    None => String::new(),
                };
                set_text("final-rank", &rank);
            }

            if phase != GamePhase::Playing {
                let now = js_sys::Date::now();
                let rows: Vec<String> = self
                    .high_scores
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| {
                        format!(
                            "{}. {} ({:.0}m, {}) {}",
                            i + 1,
                            e.score,
                            e.distance,
                            e.ship.as_str(),
                            format_age(now, e.timestamp)
                        )
                    })
                    .collect();
                set_text("highscore-list", &rows.join("\n"));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Star Racer starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let dpr = window.device_pixel_ratio();
        let width = canvas.client_width() as f64 * dpr;
        let height = canvas.client_height() as f64 * dpr;
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let config = Config::load();
        let game = Rc::new(RefCell::new(Game {
            scheduler: FrameScheduler::new(config, ShipId::default(), seed),
            scene: CanvasScene {
                ctx,
                width,
                height,
                objects: HashMap::new(),
            },
            audio: AudioManager::new(),
            input: InputState::default(),
            high_scores: HighScores::load(),
            last_rank: None,
        }));
        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(game.clone());
        request_animation_frame(game);
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        for (event_name, down) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() && down {
                    return;
                }
                game.borrow_mut().on_key(&event.key(), down);
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
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
        {
            let mut g = game.borrow_mut();
            g.frame(time);
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
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

/// Headless run: `star-racer [seed] [ship] [max_seconds]`
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use star_racer::sim::{FrameScheduler, GameEvent, InputState, SessionState};
    use star_racer::{Config, NullScene, ShipId};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let ship = args
        .next()
        .and_then(|s| ShipId::from_str(&s))
        .unwrap_or_default();
    let max_seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);

    log::info!("Star Racer (native) headless run, seed {}", seed);

    /// Dodge the nearest obstacle in the ship's lane, otherwise chase coins
    fn autopilot(session: &SessionState) -> InputState {
        let ship = session.ship.position;
        let lane = session.ship.collision_radius + session.config.obstacle_collision_radius + 1.0;
        let ahead = |z: f32| z < ship.z && ship.z - z < 60.0;

        let threat = session
            .obstacles
            .iter()
            .filter(|o| ahead(o.position.z) && (o.position.x - ship.x).abs() < lane)
            .min_by(|a, b| b.position.z.total_cmp(&a.position.z));
        let target_x = match threat {
            Some(o)
                if o.position.x > ship.x
                    || o.position.x >= session.config.lateral_bounds() - lane =>
            {
                o.position.x - lane
            }
            Some(o) => o.position.x + lane,
            None => session
                .coins
                .iter()
                .filter(|c| ahead(c.position.z))
                .max_by(|a, b| a.position.z.total_cmp(&b.position.z))
                .map_or(ship.x, |c| c.position.x),
        };

        InputState {
            left: target_x < ship.x - 0.5,
            right: target_x > ship.x + 0.5,
            boost: threat.is_none(),
        }
    }

    let mut scheduler = FrameScheduler::new(Config::load(), ship, seed);
    let mut scene = NullScene;
    let mut sink = ();
    scheduler.start_session(&mut scene, &mut sink);

    let frame_ms = 1000.0 / 60.0;
    let mut now = 0.0;
    let mut result = None;
    while now < max_seconds * 1000.0 {
        let input = autopilot(&scheduler.session);
        let report = scheduler.frame(now, &input, &mut scene, &mut sink);
        let game_over = report
            .events
            .into_iter()
            .find(|e| matches!(e, GameEvent::GameOver { .. }));
        if let Some(event) = game_over {
            result = Some(event);
            break;
        }
        now += frame_ms;
    }
    let result = result.or_else(|| scheduler.end_session(&mut sink));

    if let Some(GameEvent::GameOver { score, distance }) = result {
        println!(
            "{}: score {}, distance {:.0}, health {}, {} ticks",
            ship.as_str(),
            score,
            distance,
            scheduler.session.health,
            scheduler.session.time_ticks
        );
    }
}
