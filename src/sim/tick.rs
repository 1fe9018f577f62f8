//! Per-frame simulation tick and the session state machine
//!
//! One tick runs per rendered frame, in fixed order: movement, collisions,
//! animation, then spawn cursor advance and pruning. The scene is synced
//! last so the renderer always sees the post-tick state.

use super::animation::update_animations;
use super::collision::{CollisionOutcome, resolve_collisions};
use super::factory::build_ship;
use super::movement::integrate_ship;
use super::spawn::{advance, prune, reset_state};
use super::state::{GameEvent, GamePhase, InputState, ObstacleAnim, SessionState};
use crate::config::{Config, ShipId};
use crate::consts::MAX_HEALTH;
use crate::scene::{ObjectDesc, RenderTarget, SceneHandle, SessionSink};

/// Floor a raw frame delta at zero and cap it at `max` seconds
///
/// Non-finite deltas become zero.
pub fn clamp_delta(raw: f32, max: f32) -> f32 {
    if raw.is_finite() {
        raw.clamp(0.0, max)
    } else {
        0.0
    }
}

/// Wall-clock frame timer fed by the host's frame callback timestamps
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    /// Seconds since the previous call, clamped; the first call yields 0
    pub fn delta(&mut self, now_ms: f64, max: f32) -> f32 {
        let raw = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        clamp_delta(raw, max)
    }

    /// Forget the last timestamp so a stall is not counted as a frame
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    pub collisions: CollisionOutcome,
    /// Spawn cursor advanced this tick
    pub spawned: bool,
    /// Objects removed for falling behind
    pub pruned: usize,
}

/// Advance a playing session by `delta` seconds
///
/// Does nothing outside [`GamePhase::Playing`]. If the collision pass ends
/// the run, only the hit blink advances; the rest of animation and spawning
/// is skipped.
pub fn tick(
    session: &mut SessionState,
    input: &InputState,
    delta: f32,
    scene: &mut dyn RenderTarget,
    sink: &mut dyn SessionSink,
) -> TickReport {
    let mut report = TickReport::default();
    if !session.is_playing() {
        return report;
    }
    let delta = clamp_delta(delta, session.config.max_frame_delta);

    integrate_ship(&mut session.ship, input, &session.config, delta);
    session.time_ticks += 1;
    let start_z = session.config.ship(session.ship.id).start_position.z;
    session.distance = (start_z - session.ship.position.z).max(0.0);

    report.collisions = resolve_collisions(session, scene, sink, &mut report.events);
    if report.collisions.game_over {
        // The fatal hit still shows its first blink frame
        session.ship.blink.step();
        sync_scene(session, scene);
        return report;
    }

    update_animations(session, input, delta);

    report.spawned = advance(session, scene);
    report.pruned = prune(session, scene);

    sync_scene(session, scene);

    log::trace!(
        "tick {}: ship ({:.2}, {:.2}) v={:.3} boost={:.2} live={}",
        session.time_ticks,
        session.ship.position.x,
        session.ship.position.z,
        session.ship.lateral_velocity,
        session.ship.boost_velocity,
        session.live_objects()
    );
    report
}

/// Push every live transform and the ship's blink tint and engine to the renderer
fn sync_scene(session: &SessionState, scene: &mut dyn RenderTarget) {
    scene.set_transform(SceneHandle::SHIP, &session.ship.transform());
    scene.set_flash(SceneHandle::SHIP, session.ship.blink.tinted);
    scene.set_engine(SceneHandle::SHIP, &session.ship.engine);

    for obstacle in &session.obstacles {
        scene.set_transform(obstacle.handle(), &obstacle.transform());
        if let ObstacleAnim::SpikySphere { spike_scale, .. } = obstacle.anim {
            scene.set_spike_scale(obstacle.handle(), spike_scale);
        }
    }
    for coin in &session.coins {
        scene.set_transform(coin.handle(), &coin.transform());
    }
}

/// Owns the session and drives it from host frame callbacks
///
/// `Start -> ShipSelect (optional) -> Playing -> GameOver -> Start`
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    pub session: SessionState,
    clock: FrameClock,
}

impl FrameScheduler {
    pub fn new(config: Config, ship: ShipId, seed: u64) -> Self {
        Self {
            session: SessionState::new(config, ship, seed),
            clock: FrameClock::default(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    /// Open ship selection from the title screen
    pub fn select_ship(&mut self) -> bool {
        if self.session.phase != GamePhase::Start {
            return false;
        }
        self.session.phase = GamePhase::ShipSelect;
        true
    }

    /// Change the ship used by the next session
    pub fn choose_ship(&mut self, id: ShipId) -> bool {
        if !matches!(self.session.phase, GamePhase::Start | GamePhase::ShipSelect) {
            return false;
        }
        self.session.ship = build_ship(id, &self.session.config);
        log::info!("Selected ship {}", id.as_str());
        true
    }

    /// Begin a fresh run: full reset of score, health, ship and track
    pub fn start_session(
        &mut self,
        scene: &mut dyn RenderTarget,
        sink: &mut dyn SessionSink,
    ) -> bool {
        if self.session.phase == GamePhase::Playing {
            return false;
        }

        let session = &mut self.session;
        session.score = 0;
        session.health = MAX_HEALTH;
        session.distance = 0.0;
        session.time_ticks = 0;
        session.ship = build_ship(session.ship.id, &session.config);

        scene.remove_object(SceneHandle::SHIP);
        scene.add_object(
            SceneHandle::SHIP,
            ObjectDesc::Ship(session.ship.id),
            &session.ship.transform(),
        );
        reset_state(session, true, scene);
        session.next_spawn_z = session.ship.position.z - session.config.spawn_interval;
        session.phase = GamePhase::Playing;
        self.clock.reset();

        sink.on_session_start();
        log::info!(
            "Session started with {} (seed {})",
            session.ship.id.as_str(),
            session.seed
        );
        true
    }

    /// Force the current run to end (player quit)
    pub fn end_session(&mut self, sink: &mut dyn SessionSink) -> Option<GameEvent> {
        if self.session.phase != GamePhase::Playing {
            return None;
        }
        let session = &mut self.session;
        session.phase = GamePhase::GameOver;
        sink.on_game_over();
        log::info!(
            "Session ended early: score {}, distance {:.0}",
            session.score,
            session.distance
        );
        Some(GameEvent::GameOver {
            score: session.score,
            distance: session.distance,
        })
    }

    /// Leave game over (or ship select) for the title screen
    ///
    /// Clears the track and every per-session counter.
    pub fn return_to_start(&mut self, scene: &mut dyn RenderTarget) -> bool {
        if !matches!(self.session.phase, GamePhase::GameOver | GamePhase::ShipSelect) {
            return false;
        }

        let session = &mut self.session;
        for obstacle in session.obstacles.drain(..) {
            scene.remove_object(obstacle.handle());
        }
        for coin in session.coins.drain(..) {
            scene.remove_object(coin.handle());
        }
        session.score = 0;
        session.health = MAX_HEALTH;
        session.distance = 0.0;
        session.time_ticks = 0;
        session.ship = build_ship(session.ship.id, &session.config);
        session.next_spawn_z = session.ship.position.z - session.config.spawn_interval;
        scene.set_transform(SceneHandle::SHIP, &session.ship.transform());
        scene.set_flash(SceneHandle::SHIP, false);

        session.phase = GamePhase::Start;
        true
    }

    /// Handle one host frame callback
    ///
    /// The clock advances in every phase; only a playing session ticks.
    pub fn frame(
        &mut self,
        now_ms: f64,
        input: &InputState,
        scene: &mut dyn RenderTarget,
        sink: &mut dyn SessionSink,
    ) -> TickReport {
        let delta = self.clock.delta(now_ms, self.session.config.max_frame_delta);
        tick(&mut self.session, input, delta, scene, sink)
    }
}
