//! Ship movement integration
//!
//! Tuning constants were authored per 60 Hz frame, so every rate is scaled by
//! `delta * 60` to behave the same at any frame rate.

use super::state::{InputState, ShipState};
use crate::config::{Config, RollAxis};
use crate::frame_scale;

/// Advance the ship's lateral and forward state by `delta` seconds
pub fn integrate_ship(ship: &mut ShipState, input: &InputState, config: &Config, delta: f32) {
    let scale = frame_scale(delta);

    // Steering: opposing inputs cancel out
    if input.left && !input.right {
        ship.lateral_velocity -= config.acceleration * scale;
    } else if input.right && !input.left {
        ship.lateral_velocity += config.acceleration * scale;
    }
    ship.lateral_velocity = ship
        .lateral_velocity
        .clamp(-config.max_lateral_speed, config.max_lateral_speed);
    ship.lateral_velocity *= config.friction.powf(scale);

    ship.boost_velocity = if input.boost {
        config.boost_speed
    } else {
        (ship.boost_velocity - config.boost_decay * scale).max(0.0)
    };

    let bounds = config.lateral_bounds();
    ship.position.x = (ship.position.x + ship.lateral_velocity * scale).clamp(-bounds, bounds);

    if !config.disable_z_movement {
        ship.position.z -= (config.forward_speed + ship.boost_velocity) * scale;
    }

    // Bank into the turn
    let roll = -ship.lateral_velocity * config.rotation_sensitivity;
    match config.ship(ship.id).roll_axis {
        RollAxis::Z => ship.rotation.z = roll,
        RollAxis::X => ship.rotation.x = roll,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShipId;
    use crate::sim::factory::build_ship;
    use proptest::prelude::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn ship() -> (ShipState, Config) {
        let config = Config::default();
        (build_ship(ShipId::Speeder, &config), config)
    }

    #[test]
    fn test_forward_motion_per_frame() {
        let (mut ship, config) = ship();
        integrate_ship(&mut ship, &InputState::default(), &config, FRAME);
        assert!((ship.position.z - (-2.5)).abs() < 1e-4);
        assert_eq!(ship.position.x, 0.0);
        assert_eq!(ship.rotation.z, 0.0);
    }

    #[test]
    fn test_steer_left_banks_right() {
        let (mut ship, config) = ship();
        let input = InputState { left: true, ..Default::default() };
        integrate_ship(&mut ship, &input, &config, FRAME);

        // -0.085 then friction 0.88
        let expected = -0.085 * 0.88;
        assert!((ship.lateral_velocity - expected).abs() < 1e-5);
        assert!(ship.position.x < 0.0);
        assert!(ship.rotation.z > 0.0);
    }

    #[test]
    fn test_opposing_inputs_cancel() {
        let (mut ship, config) = ship();
        let input = InputState { left: true, right: true, boost: false };
        integrate_ship(&mut ship, &input, &config, FRAME);
        assert_eq!(ship.lateral_velocity, 0.0);
        assert_eq!(ship.position.x, 0.0);
    }

    #[test]
    fn test_boost_sets_then_decays_linearly() {
        let (mut ship, config) = ship();
        let boost = InputState { boost: true, ..Default::default() };
        integrate_ship(&mut ship, &boost, &config, FRAME);
        assert_eq!(ship.boost_velocity, config.boost_speed);
        assert!((ship.position.z - (-(2.5 + 2.7))).abs() < 1e-4);

        integrate_ship(&mut ship, &InputState::default(), &config, FRAME);
        assert!((ship.boost_velocity - (2.7 - 0.02)).abs() < 1e-5);

        // Long coast floors at zero
        for _ in 0..1000 {
            integrate_ship(&mut ship, &InputState::default(), &config, FRAME);
        }
        assert_eq!(ship.boost_velocity, 0.0);
    }

    #[test]
    fn test_frame_rate_independent_distance() {
        let (mut a, config) = ship();
        let mut b = a.clone();
        for _ in 0..60 {
            integrate_ship(&mut a, &InputState::default(), &config, 1.0 / 60.0);
        }
        for _ in 0..30 {
            integrate_ship(&mut b, &InputState::default(), &config, 1.0 / 30.0);
        }
        assert!((a.position.z - b.position.z).abs() < 1e-2);
    }

    #[test]
    fn test_disable_z_movement() {
        let (mut ship, mut config) = ship();
        config.disable_z_movement = true;
        let input = InputState { boost: true, ..Default::default() };
        integrate_ship(&mut ship, &input, &config, FRAME);
        assert_eq!(ship.position.z, 0.0);
    }

    #[test]
    fn test_roll_axis_x() {
        let (mut ship, mut config) = ship();
        config.speeder.roll_axis = RollAxis::X;
        let input = InputState { right: true, ..Default::default() };
        integrate_ship(&mut ship, &input, &config, FRAME);
        assert!(ship.rotation.x < 0.0);
        assert_eq!(ship.rotation.z, 0.0);
    }

    #[test]
    fn test_hold_left_never_leaves_track() {
        let (mut ship, config) = ship();
        let input = InputState { left: true, ..Default::default() };
        for _ in 0..10_000 {
            integrate_ship(&mut ship, &input, &config, 0.1);
            assert!(ship.position.x.abs() <= config.track_width / 2.0);
        }
        assert_eq!(ship.position.x, -config.lateral_bounds());
    }

    proptest! {
        #[test]
        fn prop_lateral_position_stays_on_track(
            steps in proptest::collection::vec(
                (any::<bool>(), any::<bool>(), any::<bool>(), 0.0f32..0.1),
                1..400,
            )
        ) {
            let (mut ship, config) = ship();
            for (left, right, boost, delta) in steps {
                integrate_ship(&mut ship, &InputState { left, right, boost }, &config, delta);
                prop_assert!(ship.position.x.abs() <= config.lateral_bounds());
                prop_assert!(ship.lateral_velocity.abs() <= config.max_lateral_speed);
                prop_assert!(ship.boost_velocity >= 0.0);
            }
        }
    }
}
