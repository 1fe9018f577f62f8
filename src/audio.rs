//! Sound effects using the Web Audio API
//!
//! Procedurally generated tones, no asset files. The manager is created once
//! by the host and plugged into the core as a [`SessionSink`].

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::scene::SessionSink;

/// Master volume applied to every effect
const MASTER_VOLUME: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    CoinCollect,
    /// Ship crashed into an obstacle
    ObstacleHit,
    GameOver,
    SessionStart,
}

/// One oscillator note: frequency sweep plus exponential decay
struct Tone {
    osc_type: OscillatorType,
    from_hz: f32,
    to_hz: f32,
    /// Seconds after "now" the note starts
    delay: f64,
    duration: f64,
    peak: f32,
}

pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: MASTER_VOLUME,
            muted: false,
        }
    }

    /// Resume the context (browsers require a user gesture first)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn play(&self, effect: SoundEffect) {
        if self.muted || self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        for tone in Self::tones(effect) {
            self.play_tone(ctx, &tone);
        }
    }

    fn tones(effect: SoundEffect) -> Vec<Tone> {
        use OscillatorType::*;
        let note = |osc_type, hz: f32, delay: f64, duration: f64, peak: f32| Tone {
            osc_type,
            from_hz: hz,
            to_hz: hz,
            delay,
            duration,
            peak,
        };

        match effect {
            // Two-note chime
            SoundEffect::CoinCollect => vec![
                note(Square, 988.0, 0.0, 0.08, 0.15),
                note(Square, 1319.0, 0.07, 0.25, 0.15),
            ],
            // Low rumble with a sharp crack on top
            SoundEffect::ObstacleHit => vec![
                Tone {
                    osc_type: Sawtooth,
                    from_hz: 120.0,
                    to_hz: 30.0,
                    delay: 0.0,
                    duration: 0.45,
                    peak: 0.5,
                },
                note(Square, 1500.0, 0.0, 0.1, 0.2),
            ],
            SoundEffect::GameOver => [400.0, 350.0, 300.0, 200.0]
                .iter()
                .enumerate()
                .map(|(i, hz)| note(Sine, *hz, i as f64 * 0.2, 0.35, 0.3))
                .collect(),
            SoundEffect::SessionStart => [440.0, 554.0, 659.0, 880.0]
                .iter()
                .enumerate()
                .map(|(i, hz)| note(Triangle, *hz, i as f64 * 0.06, 0.15, 0.25))
                .collect(),
        }
    }

    /// Oscillator routed through a gain node to the output
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn play_tone(&self, ctx: &AudioContext, tone: &Tone) {
        let Some((osc, gain)) = self.create_osc(ctx, tone.from_hz, tone.osc_type) else {
            return;
        };
        let t = ctx.current_time() + tone.delay;
        let end = t + tone.duration;

        gain.gain().set_value_at_time(self.volume * tone.peak, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
        if tone.to_hz != tone.from_hz {
            osc.frequency().set_value_at_time(tone.from_hz, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(tone.to_hz, end)
                .ok();
        }

        osc.start_with_when(t).ok();
        osc.stop_with_when(end + 0.05).ok();
    }
}

impl SessionSink for AudioManager {
    fn on_session_start(&mut self) {
        self.play(SoundEffect::SessionStart);
    }

    fn on_coin_collected(&mut self, _value: u32) {
        self.play(SoundEffect::CoinCollect);
    }

    fn on_obstacle_hit(&mut self) {
        self.play(SoundEffect::ObstacleHit);
    }

    fn on_game_over(&mut self) {
        self.play(SoundEffect::GameOver);
    }
}
