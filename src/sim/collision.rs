//! Ship vs obstacle/coin collision resolution
//!
//! The only place score and health change during play. Every object inside
//! the combined radius on a tick is resolved independently; there is no
//! ordering between simultaneous hits.

use glam::Vec3;

use super::state::{GameEvent, GamePhase, SessionState};
use crate::scene::{RenderTarget, SceneHandle, SessionSink};

/// What a collision pass did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionOutcome {
    pub coins_collected: u32,
    pub score_gained: u32,
    pub obstacles_hit: u32,
    /// Obstacles dropped for falling behind the ship
    pub despawned: u32,
    /// Health reached zero on this pass
    pub game_over: bool,
}

/// Sphere overlap test (strict, touching spheres do not collide)
#[inline]
pub fn overlaps(a: Vec3, b: Vec3, combined_radius: f32) -> bool {
    a.distance(b) < combined_radius
}

/// Resolve every ship/coin and ship/obstacle overlap for this tick
///
/// Obstacles that scrolled more than `despawn_distance` behind the ship are
/// removed in the same sweep. Does nothing outside the playing phase.
pub fn resolve_collisions(
    session: &mut SessionState,
    scene: &mut dyn RenderTarget,
    sink: &mut dyn SessionSink,
    events: &mut Vec<GameEvent>,
) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    if session.phase != GamePhase::Playing {
        return outcome;
    }

    let ship_pos = session.ship.position;
    let ship_radius = session.ship.collision_radius;

    // --- Coins ---
    let mut collected = Vec::new();
    session.coins.retain(|coin| {
        if overlaps(ship_pos, coin.position, coin.collision_radius + ship_radius) {
            collected.push((coin.id, coin.value));
            false
        } else {
            true
        }
    });
    for (id, value) in collected {
        scene.remove_object(SceneHandle(id));
        session.score += u64::from(value);
        outcome.coins_collected += 1;
        outcome.score_gained += value;
        sink.on_score_change(value);
        sink.on_coin_collected(value);
        events.push(GameEvent::CoinCollected { id, value });
        log::debug!("Coin {} collected (+{}), score {}", id, value, session.score);
    }

    // --- Obstacles ---
    let despawn_z = ship_pos.z + session.config.despawn_distance;
    let mut hits = Vec::new();
    let mut behind = Vec::new();
    session.obstacles.retain(|obstacle| {
        if overlaps(ship_pos, obstacle.position, ship_radius + obstacle.collision_radius) {
            hits.push(obstacle.id);
            false
        } else if obstacle.position.z > despawn_z {
            behind.push(obstacle.id);
            false
        } else {
            true
        }
    });

    for id in behind {
        scene.remove_object(SceneHandle(id));
        outcome.despawned += 1;
    }

    for id in hits {
        scene.remove_object(SceneHandle(id));
        outcome.obstacles_hit += 1;
        session.ship.blink.trigger();
        sink.on_obstacle_hit();

        // Health floors at zero; hits after that change nothing
        if session.health > 0 {
            session.health -= 1;
            sink.on_health_change(session.health);
            log::info!("Obstacle {} hit, health {}", id, session.health);

            if session.health == 0 {
                outcome.game_over = true;
                session.phase = GamePhase::GameOver;
                sink.on_game_over();
                log::info!(
                    "Game over: score {}, distance {:.0}",
                    session.score,
                    session.distance
                );
            }
        }
        events.push(GameEvent::ObstacleHit {
            id,
            health: session.health,
        });
    }

    if outcome.game_over {
        events.push(GameEvent::GameOver {
            score: session.score,
            distance: session.distance,
        });
    }

    outcome
}
