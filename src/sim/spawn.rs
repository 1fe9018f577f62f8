//! Spawn/despawn manager
//!
//! Keeps a populated stretch of track ahead of the ship and reclaims objects
//! once they scroll far enough behind it. Spawning is distance-driven: one
//! attempt per `spawn_interval` of forward travel, independent of speed.

use glam::Vec3;
use rand::Rng;

use super::factory::{build_coin, build_obstacle, random_obstacle_kind};
use super::state::{Obstacle, SessionState};
use crate::config::Config;
use crate::planar_distance;
use crate::scene::{ObjectDesc, RenderTarget, SceneHandle};

/// Clear the track and fill the first intervals ahead of the ship
///
/// With `initial` the ship is also put back on its configured start pose.
/// Returns the number of objects spawned.
pub fn reset_state(
    session: &mut SessionState,
    initial: bool,
    scene: &mut dyn RenderTarget,
) -> usize {
    for obstacle in session.obstacles.drain(..) {
        scene.remove_object(obstacle.handle());
    }
    for coin in session.coins.drain(..) {
        scene.remove_object(coin.handle());
    }

    if initial {
        let start = session.config.ship(session.ship.id);
        session.ship.position = start.start_position;
        session.ship.rotation = start.start_rotation;
    }

    let interval = session.config.spawn_interval;
    let mut z = session.ship.position.z - interval;
    let mut spawned = 0;
    for _ in 0..session.config.prepopulate_intervals {
        spawned += usize::from(spawn_obstacle(session, z, scene).is_some());
        spawned += usize::from(spawn_coin(session, z, scene).is_some());
        z -= interval;
    }

    log::info!(
        "Track reset (initial: {}): {} obstacles, {} coins",
        initial,
        session.obstacles.len(),
        session.coins.len()
    );
    spawned
}

/// Maybe place one obstacle `obstacle_spawn_distance` ahead of `z_base`
pub fn spawn_obstacle(
    session: &mut SessionState,
    z_base: f32,
    scene: &mut dyn RenderTarget,
) -> Option<SceneHandle> {
    let config = &session.config;
    if !session.rng.random_bool(f64::from(config.obstacle_spawn_rate)) {
        return None;
    }

    let x = (session.rng.random::<f32>() - 0.5) * config.track_width;
    let position = Vec3::new(
        x,
        config.ride_height + config.obstacle_y_offset,
        z_base - config.obstacle_spawn_distance,
    );
    let kind = random_obstacle_kind(&mut session.rng);

    let id = session.next_entity_id();
    let obstacle = build_obstacle(id, kind, position, &session.config, &mut session.rng);
    let handle = obstacle.handle();
    scene.add_object(handle, obstacle.desc(), &obstacle.transform());
    log::debug!("Spawned {:?} {} at ({:.1}, {:.1})", kind, id, position.x, position.z);
    session.obstacles.push(obstacle);
    Some(handle)
}

/// Rejection-sample a coin position clear of every live obstacle
///
/// `x` favours the outer halves of each side of the track. Gives up after
/// `attempts` tries.
pub fn find_coin_spot<R: Rng + ?Sized>(
    rng: &mut R,
    config: &Config,
    obstacles: &[Obstacle],
    z_base: f32,
    attempts: u32,
) -> Option<Vec3> {
    let clearance = config.coin_clearance();
    let y = config.ride_height + config.coin_y_offset;

    for _ in 0..attempts {
        let side = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
        let x = side * (config.track_width / 4.0 * (0.5 + rng.random::<f32>() * 0.7));
        let jitter = rng.random::<f32>() * config.coin_spawn_jitter;
        let z = z_base - config.coin_spawn_distance - jitter;
        let candidate = Vec3::new(x, y, z);

        if obstacles
            .iter()
            .all(|o| planar_distance(candidate, o.position) >= clearance)
        {
            return Some(candidate);
        }
    }
    None
}

/// Maybe place one coin `coin_spawn_distance` (plus jitter) ahead of `z_base`
pub fn spawn_coin(
    session: &mut SessionState,
    z_base: f32,
    scene: &mut dyn RenderTarget,
) -> Option<SceneHandle> {
    if !session.rng.random_bool(f64::from(session.config.coin_spawn_rate)) {
        return None;
    }

    let Some(position) = find_coin_spot(
        &mut session.rng,
        &session.config,
        &session.obstacles,
        z_base,
        session.config.coin_placement_attempts,
    ) else {
        log::debug!("No clear coin spot near z={:.0}, skipping", z_base);
        return None;
    };

    let id = session.next_entity_id();
    let coin = build_coin(id, position, &session.config);
    let handle = coin.handle();
    scene.add_object(handle, ObjectDesc::Coin, &coin.transform());
    log::debug!("Spawned coin {} at ({:.1}, {:.1})", id, position.x, position.z);
    session.coins.push(coin);
    Some(handle)
}

/// Spawn at the cursor once the ship has passed it
///
/// Returns true when the cursor moved.
pub fn advance(session: &mut SessionState, scene: &mut dyn RenderTarget) -> bool {
    if session.ship.position.z >= session.next_spawn_z {
        return false;
    }

    let z = session.next_spawn_z;
    spawn_obstacle(session, z, scene);
    spawn_coin(session, z, scene);
    session.next_spawn_z -= session.config.spawn_interval;
    true
}

/// Remove every object more than `despawn_distance` behind the ship
pub fn prune(session: &mut SessionState, scene: &mut dyn RenderTarget) -> usize {
    let limit = session.ship.position.z + session.config.despawn_distance;
    let before = session.live_objects();

    session.obstacles.retain(|obstacle| {
        let keep = obstacle.position.z <= limit;
        if !keep {
            scene.remove_object(obstacle.handle());
        }
        keep
    });
    session.coins.retain(|coin| {
        let keep = coin.position.z <= limit;
        if !keep {
            scene.remove_object(coin.handle());
        }
        keep
    });

    before - session.live_objects()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShipId;
    use crate::scene::testing::RecordingScene;
    use crate::sim::factory::build_obstacle;
    use crate::sim::state::ObstacleKind;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn session_with_rates(obstacles: f32, coins: f32, seed: u64) -> SessionState {
        let config = Config {
            obstacle_spawn_rate: obstacles,
            coin_spawn_rate: coins,
            ..Config::default()
        };
        SessionState::new(config, ShipId::Speeder, seed)
    }

    fn obstacle_at(session: &mut SessionState, z: f32) -> u32 {
        let id = session.next_entity_id();
        let pos = Vec3::new(0.0, 4.2, z);
        let obstacle =
            build_obstacle(id, ObstacleKind::Asteroid, pos, &session.config, &mut session.rng);
        session.obstacles.push(obstacle);
        id
    }

    #[test]
    fn test_advance_spawns_once_past_cursor() {
        let mut session = session_with_rates(1.0, 1.0, 3);
        let mut scene = RecordingScene::default();
        session.ship.position.z = -60.0;
        session.next_spawn_z = -50.0;

        assert!(advance(&mut session, &mut scene));

        assert_eq!(session.next_spawn_z, -100.0);
        assert_eq!(session.obstacles.len(), 1);
        assert_eq!(session.obstacles[0].position.z, -200.0);
        assert_eq!(session.coins.len(), 1);
        let coin_z = session.coins[0].position.z;
        assert!((-170.0..=-150.0).contains(&coin_z));
        assert_eq!(scene.added, 2);

        // Cursor is now ahead of the ship again
        assert!(!advance(&mut session, &mut scene));
        assert_eq!(session.live_objects(), 2);
    }

    #[test]
    fn test_advance_waits_for_ship() {
        let mut session = session_with_rates(1.0, 1.0, 3);
        let mut scene = RecordingScene::default();
        session.next_spawn_z = -50.0;
        session.ship.position.z = -50.0;

        assert!(!advance(&mut session, &mut scene));
        assert_eq!(session.next_spawn_z, -50.0);
        assert_eq!(session.live_objects(), 0);
    }

    #[test]
    fn test_prune_drops_objects_far_behind() {
        let mut session = session_with_rates(0.0, 0.0, 3);
        let mut scene = RecordingScene::default();
        session.ship.position.z = -500.0;
        let behind = obstacle_at(&mut session, -350.0);
        obstacle_at(&mut session, -450.0);
        let coin_id = session.next_entity_id();
        session
            .coins
            .push(build_coin(coin_id, Vec3::new(5.0, 3.2, -390.0), &session.config));

        assert_eq!(prune(&mut session, &mut scene), 2);

        assert_eq!(session.obstacles.len(), 1);
        assert_eq!(session.obstacles[0].position.z, -450.0);
        assert!(session.coins.is_empty());
        assert_eq!(scene.removed, vec![SceneHandle(behind), SceneHandle(coin_id)]);
    }

    #[test]
    fn test_obstacle_placement_bounds() {
        let mut session = session_with_rates(1.0, 0.0, 17);
        let mut scene = RecordingScene::default();
        for i in 0..200 {
            spawn_obstacle(&mut session, -(i as f32) * 50.0, &mut scene);
        }
        assert_eq!(session.obstacles.len(), 200);
        for obstacle in &session.obstacles {
            assert!(obstacle.position.x.abs() <= 25.0);
            assert!((obstacle.position.y - 4.2).abs() < 1e-5);
        }
    }

    #[test]
    fn test_zero_rate_never_spawns() {
        let mut session = session_with_rates(0.0, 0.0, 5);
        let mut scene = RecordingScene::default();
        for i in 0..100 {
            assert!(spawn_obstacle(&mut session, i as f32 * -50.0, &mut scene).is_none());
            assert!(spawn_coin(&mut session, i as f32 * -50.0, &mut scene).is_none());
        }
        assert_eq!(scene.added, 0);
    }

    #[test]
    fn test_coin_skipped_when_budget_exhausted() {
        let config = Config {
            obstacle_collision_radius: 500.0,
            ..Config::default()
        };
        let mut session = SessionState::new(config, ShipId::Speeder, 1);
        obstacle_at(&mut session, -160.0);
        let mut rng = Pcg32::seed_from_u64(2);

        let spot = find_coin_spot(&mut rng, &session.config, &session.obstacles, -50.0, 5);
        assert_eq!(spot, None);
    }

    #[test]
    fn test_coin_spot_favours_sides() {
        let config = Config::default();
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..500 {
            let spot = find_coin_spot(&mut rng, &config, &[], 0.0, 1).unwrap();
            // 12.5 * [0.5, 1.2)
            assert!(spot.x.abs() >= 6.25 - 1e-4 && spot.x.abs() < 15.0);
            assert!((spot.y - 3.2).abs() < 1e-5);
        }
    }

    #[test]
    fn test_reset_prepopulates_and_clears() {
        let mut session = session_with_rates(1.0, 0.0, 21);
        let mut scene = RecordingScene::default();
        session.ship.position = Vec3::new(7.0, 2.2, -900.0);

        let spawned = reset_state(&mut session, true, &mut scene);

        assert_eq!(spawned, 10);
        assert_eq!(session.obstacles.len(), 10);
        assert_eq!(session.ship.position, session.config.speeder.start_position);
        let zs: Vec<f32> = session.obstacles.iter().map(|o| o.position.z).collect();
        let expected: Vec<f32> = (0..10).map(|i| -200.0 - 50.0 * i as f32).collect();
        assert_eq!(zs, expected);

        // Second reset removes every previous object from the scene
        reset_state(&mut session, true, &mut scene);
        assert_eq!(scene.removed.len(), 10);
        assert_eq!(scene.live.len(), 10);
    }

    #[test]
    fn test_reset_without_initial_keeps_ship_pose() {
        let mut session = session_with_rates(0.5, 0.3, 21);
        let mut scene = RecordingScene::default();
        session.ship.position = Vec3::new(7.0, 2.2, -900.0);

        reset_state(&mut session, false, &mut scene);

        assert_eq!(session.ship.position, Vec3::new(7.0, 2.2, -900.0));
        assert!(session.obstacles.iter().all(|o| o.position.z <= -1100.0));
    }

    #[test]
    fn test_reset_is_idempotent_for_a_seed() {
        let counts = |seed: u64| {
            let mut session = session_with_rates(0.5, 0.3, seed);
            let mut scene = RecordingScene::default();
            reset_state(&mut session, true, &mut scene);
            let first = (session.obstacles.len(), session.coins.len(), session.ship.position);

            session.rng = Pcg32::seed_from_u64(seed);
            reset_state(&mut session, true, &mut scene);
            let second = (session.obstacles.len(), session.coins.len(), session.ship.position);
            (first, second, scene.live.len())
        };

        for seed in [1, 2, 3, 99] {
            let (first, second, live) = counts(seed);
            assert_eq!(first, second);
            assert!(first.0 <= 10 && first.1 <= 10);
            assert_eq!(live, first.0 + first.1);
        }
    }

    proptest! {
        #[test]
        fn prop_coins_clear_obstacles_at_placement(
            seed in any::<u64>(),
            obstacles in proptest::collection::vec((-25.0f32..25.0, -180.0f32..-80.0), 0..12),
        ) {
            let config = Config::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let obstacles: Vec<Obstacle> = obstacles
                .into_iter()
                .enumerate()
                .map(|(i, (x, z))| {
                    let pos = Vec3::new(x, 4.2, z);
                    build_obstacle(i as u32 + 1, ObstacleKind::Cube, pos, &config, &mut rng)
                })
                .collect();

            for _ in 0..1000 {
                let attempts = config.coin_placement_attempts;
                if let Some(spot) = find_coin_spot(&mut rng, &config, &obstacles, 0.0, attempts) {
                    for obstacle in &obstacles {
                        let gap = planar_distance(spot, obstacle.position);
                        prop_assert!(gap >= config.coin_clearance());
                    }
                }
            }
        }
    }
}
