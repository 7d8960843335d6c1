//! Audio collaborator
//!
//! The game talks to audio only through `AudioSink`. Every call is
//! fire-and-forget: implementations swallow their own failures so a missing
//! or broken audio device never changes how a round plays out.

/// Fire-and-forget audio interface handed to the session driver
pub trait AudioSink {
    /// Acquire the output device (browsers require a user gesture first)
    fn init(&mut self) {}
    /// Release the output device
    fn dispose(&mut self) {}
    fn set_muted(&mut self, muted: bool);
    fn play_shot_sound(&mut self);
    fn play_explosion_sound(&mut self);
    fn play_game_over_sound(&mut self);
    fn start_music(&mut self);
    fn stop_music(&mut self);
}

/// Audio that plays nothing (native runs, no audio device)
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn set_muted(&mut self, _muted: bool) {}
    fn play_shot_sound(&mut self) {}
    fn play_explosion_sound(&mut self) {}
    fn play_game_over_sound(&mut self) {}
    fn start_music(&mut self) {}
    fn stop_music(&mut self) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    //! Procedurally generated sound effects - no external files needed!

    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::AudioSink;
    use crate::settings::Settings;

    /// Running background drone
    struct Music {
        oscillators: Vec<OscillatorNode>,
        gain: GainNode,
    }

    /// Web Audio implementation of `AudioSink`
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        music: Option<Music>,
        /// Volumes and mute, kept in step with the app's settings
        settings: Settings,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            Self {
                ctx: None,
                music: None,
                settings: settings.clone(),
            }
        }

        /// Context ready to play, resumed if the browser suspended it
        fn live_ctx(&self) -> Option<&AudioContext> {
            let ctx = self.ctx.as_ref()?;
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            Some(ctx)
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
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

        /// Laser - quick descending zap
        fn play_laser(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 880.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(880.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(220.0, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Asteroid breaks - low rumble with a crackle on top
        fn play_explosion(ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = Self::create_osc(ctx, 120.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.4, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                    .ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(40.0, t + 0.35)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.4).ok();
            }

            if let Some((osc, gain)) = Self::create_osc(ctx, 1400.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.08, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(300.0, t + 0.1)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.12).ok();
            }
        }

        /// Game over - sad descending tones
        fn play_game_over(ctx: &AudioContext, vol: f32) {
            let notes = [392.0, 349.2, 311.1, 261.6]; // G4 F4 Eb4 C4
            let t = ctx.current_time();

            for (i, &freq) in notes.iter().enumerate() {
                let Some((osc, gain)) = Self::create_osc(ctx, freq, OscillatorType::Triangle)
                else {
                    continue;
                };
                let start = t + i as f64 * 0.25;
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain().set_value_at_time(vol * 0.4, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.35)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.4).ok();
            }
        }
    }

    impl AudioSink for AudioManager {
        fn init(&mut self) {
            if self.ctx.is_some() {
                return;
            }
            // May fail outside a secure context
            self.ctx = AudioContext::new().ok();
            if self.ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
        }

        fn dispose(&mut self) {
            self.stop_music();
            if let Some(ctx) = self.ctx.take() {
                let _ = ctx.close();
            }
        }

        fn set_muted(&mut self, muted: bool) {
            self.settings.muted = muted;
            if muted {
                self.stop_music();
            }
        }

        fn play_shot_sound(&mut self) {
            let vol = self.settings.effective_sfx_volume();
            if vol <= 0.0 {
                return;
            }
            if let Some(ctx) = self.live_ctx() {
                Self::play_laser(ctx, vol);
            }
        }

        fn play_explosion_sound(&mut self) {
            let vol = self.settings.effective_sfx_volume();
            if vol <= 0.0 {
                return;
            }
            if let Some(ctx) = self.live_ctx() {
                Self::play_explosion(ctx, vol);
            }
        }

        fn play_game_over_sound(&mut self) {
            let vol = self.settings.effective_sfx_volume();
            if vol <= 0.0 {
                return;
            }
            if let Some(ctx) = self.live_ctx() {
                Self::play_game_over(ctx, vol);
            }
        }

        /// Two detuned low oscillators, looping until stopped
        fn start_music(&mut self) {
            if !self.settings.effective_music() || self.music.is_some() {
                return;
            }
            let vol = self.settings.effective_music_volume();
            let Some(ctx) = self.live_ctx() else { return };
            let Ok(gain) = ctx.create_gain() else { return };
            if gain.connect_with_audio_node(&ctx.destination()).is_err() {
                return;
            }
            gain.gain().set_value(vol * 0.2);

            let mut oscillators = Vec::new();
            for freq in [55.0, 55.4, 82.4] {
                let Ok(osc) = ctx.create_oscillator() else { continue };
                osc.set_type(OscillatorType::Sine);
                osc.frequency().set_value(freq);
                if osc.connect_with_audio_node(&gain).is_ok() && osc.start().is_ok() {
                    oscillators.push(osc);
                }
            }
            self.music = Some(Music { oscillators, gain });
        }

        fn stop_music(&mut self) {
            if let Some(music) = self.music.take() {
                for osc in music.oscillators {
                    let _ = osc.stop();
                }
                let _ = music.gain.disconnect();
            }
        }
    }
}
