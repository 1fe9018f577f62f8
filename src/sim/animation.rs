//! Cosmetic animation state
//!
//! Rotation, breathing, coin spin, engine flicker and the hit blink. Nothing
//! here feeds back into collisions or game state.

use glam::Vec3;

use super::state::{
    BlinkEffect, Coin, EngineFx, InputState, Obstacle, ObstacleAnim, SessionState, SpinAxis,
};
use crate::consts::*;
use crate::frame_scale;

impl BlinkEffect {
    /// Restart the blink from the top
    pub fn trigger(&mut self) {
        self.frames_left = BLINK_FRAMES;
    }

    pub fn is_active(&self) -> bool {
        self.frames_left > 0
    }

    /// Advance one rendered frame; returns whether the ship is tinted
    ///
    /// Frame-counted rather than time-based. Tinted and normal frames
    /// alternate in pairs, and the last frame always restores the ship.
    /// The tinted pair comes first so the hit shows on the frame it lands.
    pub fn step(&mut self) -> bool {
        if self.frames_left == 0 {
            self.tinted = false;
            return false;
        }
        self.frames_left -= 1;
        self.tinted = self.frames_left > 0 && (self.frames_left / 2) % 2 == 1;
        self.tinted
    }
}

/// Spin and breathe obstacles
///
/// Rates are per baseline frame and scaled by `delta * 60`, so the speed
/// does not depend on the host frame rate.
pub fn animate_obstacles(obstacles: &mut [Obstacle], delta: f32) {
    let scale = frame_scale(delta);
    for obstacle in obstacles {
        obstacle.rotation += obstacle.rotation_speed * scale;

        match &mut obstacle.anim {
            ObstacleAnim::Cube { spin_axis } => match spin_axis {
                SpinAxis::Y => obstacle.rotation.y += CUBE_SPIN_RATE * scale,
                SpinAxis::X => obstacle.rotation.x += CUBE_SPIN_RATE * scale,
            },
            ObstacleAnim::Asteroid => {}
            ObstacleAnim::SpikySphere {
                phase,
                amount,
                spike_scale,
            } => {
                *phase += SPIKY_PHASE_RATE * scale;
                *spike_scale = breathing_scale(phase.sin() * *amount);
            }
        }
    }
}

/// Spike scale for a breathing value in [-amount, amount]
fn breathing_scale(breath: f32) -> Vec3 {
    Vec3::new(
        1.0 + breath * 0.1,
        1.0 + breath.abs() * 0.3,
        1.0 + breath * 0.1,
    )
}

/// Spin coins around their Y axis, per baseline frame like obstacles
pub fn animate_coins(coins: &mut [Coin], delta: f32) {
    let scale = frame_scale(delta);
    for coin in coins {
        coin.rotation.y += coin.rotation_speed * scale;
    }
}

/// Flicker engine flames and flare the side thrusters against the turn
pub fn animate_engine(engine: &mut EngineFx, input: &InputState, delta: f32) {
    engine.time += frame_scale(delta) * ENGINE_CLOCK_RATE;
    let t = engine.time;
    let intensity = if input.boost { BOOST_FLAME_INTENSITY } else { 1.0 };

    for (i, (base, current)) in engine
        .base_scales
        .iter()
        .zip(engine.flame_scales.iter_mut())
        .enumerate()
    {
        let i = i as f32;
        let pulse = (t * (0.8 + i * 0.4)).sin() * 0.12 + 1.0;
        let flutter = (t * (3.0 + i)).sin() * 0.04 + 1.0;
        *current = Vec3::new(
            base.x * (pulse + flutter * 0.2) * intensity,
            base.y * pulse * intensity,
            base.z * (flutter * 0.6 + pulse * 0.2) * intensity,
        )
        .min(*base * FLAME_SCALE_CAP);
    }

    let idle = (t * 4.0).sin() * 0.1 + 0.95;
    // Turning right pushes with the left thruster and vice versa
    engine.left_thruster = if input.right { THRUSTER_TURN_SCALE } else { idle };
    engine.right_thruster = if input.left { THRUSTER_TURN_SCALE } else { idle };
}

/// Run every cosmetic update for one tick
pub fn update_animations(session: &mut SessionState, input: &InputState, delta: f32) {
    session.ship.blink.step();
    animate_obstacles(&mut session.obstacles, delta);
    animate_coins(&mut session.coins, delta);
    animate_engine(&mut session.ship.engine, input, delta);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sim::factory::{build_coin, build_obstacle};
    use crate::sim::state::ObstacleKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_blink_sequence_restores_ship() {
        let mut blink = BlinkEffect::default();
        assert!(!blink.step());

        blink.trigger();
        let frames: Vec<bool> = (0..6).map(|_| blink.step()).collect();
        assert_eq!(frames, vec![true, true, false, false, false, false]);
        assert!(!blink.is_active());
        assert!(!blink.tinted);
    }

    #[test]
    fn test_blink_retrigger_restarts() {
        let mut blink = BlinkEffect::default();
        blink.trigger();
        blink.step();
        blink.step();
        blink.trigger();
        assert_eq!(blink.frames_left, BLINK_FRAMES);
    }

    #[test]
    fn test_cube_spins_on_chosen_axis() {
        let config = Config::default();
        let mut rng = Pcg32::seed_from_u64(8);
        let mut cube = build_obstacle(1, ObstacleKind::Cube, Vec3::ZERO, &config, &mut rng);
        let start = cube.rotation;
        let spin_axis = match cube.anim {
            ObstacleAnim::Cube { spin_axis } => spin_axis,
            _ => unreachable!(),
        };

        animate_obstacles(std::slice::from_mut(&mut cube), FRAME);

        let d = cube.rotation - start;
        match spin_axis {
            SpinAxis::Y => assert!((d.y - (0.03 + CUBE_SPIN_RATE)).abs() < 1e-4),
            SpinAxis::X => assert!((d.x - (0.01 + CUBE_SPIN_RATE)).abs() < 1e-4),
        }
        assert!((d.z - 0.01).abs() < 1e-4);
    }

    #[test]
    fn test_spiky_breathing_stays_in_range() {
        let config = Config::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut spiky = build_obstacle(1, ObstacleKind::SpikySphere, Vec3::ZERO, &config, &mut rng);

        for _ in 0..2_000 {
            animate_obstacles(std::slice::from_mut(&mut spiky), 0.1);
            if let ObstacleAnim::SpikySphere { spike_scale, amount, .. } = spiky.anim {
                assert!(spike_scale.y >= 1.0 && spike_scale.y <= 1.0 + amount * 0.3 + 1e-5);
                assert!((spike_scale.x - 1.0).abs() <= amount * 0.1 + 1e-5);
                assert_eq!(spike_scale.x, spike_scale.z);
            }
        }
    }

    #[test]
    fn test_coin_spin_scales_with_delta() {
        let config = Config::default();
        let mut coin = build_coin(1, Vec3::ZERO, &config);
        animate_coins(std::slice::from_mut(&mut coin), 0.5);
        assert!((coin.rotation.y - 0.03 * 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_engine_flames_capped() {
        let base = [Vec3::ONE, Vec3::new(1.2, 1.2, 1.1), Vec3::new(1.5, 1.5, 1.2)];
        let mut engine = EngineFx::new(&base);
        let boost = InputState { boost: true, ..Default::default() };
        for _ in 0..500 {
            animate_engine(&mut engine, &boost, FRAME);
            for (b, s) in base.iter().zip(&engine.flame_scales) {
                assert!(s.cmple(*b * FLAME_SCALE_CAP + 1e-5).all());
                assert!(s.cmpgt(Vec3::ZERO).all());
            }
        }
        assert!((engine.time - 500.0 * ENGINE_CLOCK_RATE).abs() < 0.1);
    }

    #[test]
    fn test_thrusters_flare_against_turn() {
        let mut engine = EngineFx::new(&[Vec3::ONE]);
        animate_engine(&mut engine, &InputState { right: true, ..Default::default() }, FRAME);
        assert_eq!(engine.left_thruster, THRUSTER_TURN_SCALE);
        assert!(engine.right_thruster < THRUSTER_TURN_SCALE);

        animate_engine(&mut engine, &InputState { left: true, ..Default::default() }, FRAME);
        assert_eq!(engine.right_thruster, THRUSTER_TURN_SCALE);
        assert!((0.85..=1.05).contains(&engine.left_thruster));
    }
}
