//! Sound effects and background music
//!
//! The game asks for sounds by name and never depends on them playing.
//! In the browser, named files are tried first; if none loads, the effect
//! is synthesized with Web Audio oscillators from its [`ToneRecipe`].

use crate::sim::GameEvent;

/// Background music files, in lookup order
pub const MUSIC_FILES: [&str; 4] = [
    "bg_music.mp3",
    "bg_music.wav",
    "background.mp3",
    "background.wav",
];
/// Background music volume
pub const MUSIC_VOLUME: f32 = 0.4;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Bird flaps
    Jump,
    /// Bird dies
    Dead,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 2] = [SoundEffect::Jump, SoundEffect::Dead];

    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Jump => "jump",
            SoundEffect::Dead => "dead",
        }
    }

    /// Candidate file names, in lookup order
    pub fn files(&self) -> &'static [&'static str] {
        match self {
            SoundEffect::Jump => &["jump_sound.mp3", "jump_sound.wav", "jump.mp3", "jump.wav"],
            SoundEffect::Dead => &[
                "dead_sound.mp3",
                "dead_sound.wav",
                "die.mp3",
                "die.wav",
                "game_over.mp3",
                "game_over.wav",
            ],
        }
    }

    /// Playback volume, applied to loaded and synthesized sounds alike
    pub fn volume(&self) -> f32 {
        match self {
            SoundEffect::Jump => 0.5,
            SoundEffect::Dead => 1.0,
        }
    }

    /// Recipe for the synthesized fallback
    pub fn tone(&self) -> ToneRecipe {
        match self {
            SoundEffect::Jump => ToneRecipe {
                start_hz: 660.0,
                end_hz: 660.0,
                duration: 0.15,
                amplitude: 0.5,
                vibrato_hz: 0.0,
                vibrato_depth: 0.0,
            },
            SoundEffect::Dead => ToneRecipe {
                start_hz: 440.0,
                end_hz: 220.0,
                duration: 0.6,
                amplitude: 0.6,
                vibrato_hz: 4.0,
                vibrato_depth: 0.1,
            },
        }
    }
}

/// A sine tone with a linear pitch glide, linear decay and optional vibrato
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneRecipe {
    pub start_hz: f32,
    pub end_hz: f32,
    /// Seconds
    pub duration: f32,
    /// Peak amplitude at t = 0
    pub amplitude: f32,
    pub vibrato_hz: f32,
    /// Fraction of amplitude the vibrato removes at its trough
    pub vibrato_depth: f32,
}

impl ToneRecipe {
    /// Pitch at time `t` seconds
    pub fn frequency_at(&self, t: f32) -> f32 {
        let k = (t / self.duration).clamp(0.0, 1.0);
        self.start_hz + (self.end_hz - self.start_hz) * k
    }

    /// Amplitude envelope at time `t`, vibrato included
    pub fn envelope_at(&self, t: f32) -> f32 {
        if t < 0.0 || t >= self.duration {
            return 0.0;
        }
        let decay = 1.0 - t / self.duration;
        let vibrato = 1.0 - self.vibrato_depth
            + self.vibrato_depth * (t * self.vibrato_hz * std::f32::consts::TAU).sin();
        self.amplitude * decay * vibrato
    }
}

/// How far a media element has come toward playing, from its DOM state codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipReadiness {
    /// No source could be loaded (404, unsupported codec)
    Broken,
    /// Still fetching; `play()` would start late or not at all
    Loading,
    /// Enough data buffered to start right away
    Ready,
}

impl ClipReadiness {
    /// `HTMLMediaElement.NETWORK_NO_SOURCE`
    const NETWORK_NO_SOURCE: u16 = 3;
    /// `HTMLMediaElement.HAVE_FUTURE_DATA`
    const HAVE_FUTURE_DATA: u16 = 3;

    pub fn from_media(network_state: u16, ready_state: u16) -> Self {
        if network_state == Self::NETWORK_NO_SOURCE {
            ClipReadiness::Broken
        } else if ready_state >= Self::HAVE_FUTURE_DATA {
            ClipReadiness::Ready
        } else {
            ClipReadiness::Loading
        }
    }
}

/// Anything that can make the game's noises
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
    fn start_music(&mut self);
    fn stop_music(&mut self);
}

/// Audio sink for headless runs
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, effect: SoundEffect) {
        log::trace!("(silent) {}", effect.name());
    }

    fn start_music(&mut self) {}

    fn stop_music(&mut self) {}
}

/// Route simulation events to sound cues
pub fn play_events<A: AudioSink + ?Sized>(audio: &mut A, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Jumped => audio.play(SoundEffect::Jump),
            GameEvent::Died { .. } => audio.play(SoundEffect::Dead),
            GameEvent::GameOver { .. } => audio.stop_music(),
            GameEvent::Restarted => audio.start_music(),
            GameEvent::Scored { .. } => {}
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

    use super::{AudioSink, ClipReadiness, MUSIC_FILES, MUSIC_VOLUME, SoundEffect, ToneRecipe};
    use crate::settings::Settings;

    /// A file-backed sound; `failed` flips when the browser cannot load it
    struct Clip {
        element: HtmlAudioElement,
        failed: Rc<Cell<bool>>,
        _on_error: Closure<dyn FnMut()>,
    }

    impl Clip {
        fn open(src: &str) -> Option<Self> {
            let element = HtmlAudioElement::new_with_src(src).ok()?;
            element.set_preload("auto");

            let failed = Rc::new(Cell::new(false));
            let on_error = {
                let failed = failed.clone();
                let src = src.to_string();
                Closure::wrap(Box::new(move || {
                    log::info!("Could not load {src}");
                    failed.set(true);
                }) as Box<dyn FnMut()>)
            };
            element.set_onerror(Some(on_error.as_ref().unchecked_ref()));

            Some(Self {
                element,
                failed,
                _on_error: on_error,
            })
        }

        fn readiness(&self) -> ClipReadiness {
            if self.failed.get() {
                return ClipReadiness::Broken;
            }
            ClipReadiness::from_media(self.element.network_state(), self.element.ready_state())
        }
    }

    /// Browser audio: HTML audio clips with oscillator fallback
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        /// Every candidate file per effect; the first usable one plays
        clips: HashMap<SoundEffect, Vec<Clip>>,
        music: Vec<Clip>,
        /// Music was requested and not stopped since
        music_on: bool,
        master_volume: f32,
        sfx_volume: f32,
        music_volume: f32,
        muted: bool,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - synthesized sounds disabled");
            }

            let clips = SoundEffect::ALL
                .iter()
                .map(|effect| {
                    let clips = effect.files().iter().filter_map(|f| Clip::open(f)).collect();
                    (*effect, clips)
                })
                .collect();

            let music: Vec<Clip> = MUSIC_FILES.iter().filter_map(|f| Clip::open(f)).collect();
            for clip in &music {
                clip.element.set_loop(true);
            }

            Self {
                ctx,
                clips,
                music,
                music_on: false,
                master_volume: settings.master_volume,
                sfx_volume: settings.sfx_volume,
                music_volume: settings.music_volume,
                muted: settings.muted,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Mute/unmute all audio; unmuting restarts the music if it was on
        pub fn set_muted(&mut self, muted: bool) {
            let resume_music = self.muted && !muted && self.music_on;
            self.muted = muted;
            if muted {
                for clip in &self.music {
                    let _ = clip.element.pause();
                }
            } else if resume_music {
                self.start_music();
            }
        }

        fn effective_volume(&self, channel: f32) -> f32 {
            if self.muted {
                0.0
            } else {
                (self.master_volume * channel).clamp(0.0, 1.0)
            }
        }


        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(OscillatorType::Sine);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Synthesize a recipe: pitch glide, vibrato steps and a linear fade
        fn synthesize(&self, recipe: &ToneRecipe, vol: f32) {
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let Some((osc, gain)) = Self::create_osc(ctx, recipe.start_hz) else {
                return;
            };
            let t = ctx.current_time();
            let d = recipe.duration as f64;

            gain.gain()
                .set_value_at_time(vol * recipe.envelope_at(0.0), t)
                .ok();
            if recipe.vibrato_depth > 0.0 {
                // Sample the envelope at 20 ms steps to carry the vibrato
                let steps = (recipe.duration / 0.02) as usize;
                for i in 1..steps {
                    let dt = i as f32 * 0.02;
                    gain.gain()
                        .linear_ramp_to_value_at_time(vol * recipe.envelope_at(dt), t + dt as f64)
                        .ok();
                }
            }
            gain.gain().linear_ramp_to_value_at_time(0.0, t + d).ok();

            osc.frequency().set_value_at_time(recipe.start_hz, t).ok();
            osc.frequency()
                .linear_ramp_to_value_at_time(recipe.end_hz, t + d)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + d).ok();
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, effect: SoundEffect) {
            let vol = self.effective_volume(self.sfx_volume) * effect.volume();
            if vol <= 0.0 {
                return;
            }

            // A clip still loading would play late; the tone plays now
            let clips = self.clips.get(&effect).map(Vec::as_slice).unwrap_or(&[]);
            let ready = clips.iter().find(|c| c.readiness() == ClipReadiness::Ready);
            if let Some(clip) = ready {
                clip.element.set_volume(vol as f64);
                clip.element.set_current_time(0.0);
                if clip.element.play().is_ok() {
                    return;
                }
            }

            self.synthesize(&effect.tone(), vol);
        }

        fn start_music(&mut self) {
            self.music_on = true;
            let vol = self.effective_volume(self.music_volume) * MUSIC_VOLUME;
            if vol <= 0.0 {
                return;
            }
            // Looping music may start once it finishes loading
            let playable = self
                .music
                .iter()
                .find(|c| c.readiness() != ClipReadiness::Broken);
            if let Some(clip) = playable {
                clip.element.set_volume(vol as f64);
                clip.element.set_current_time(0.0);
                if let Err(e) = clip.element.play() {
                    log::warn!("Music playback failed: {e:?}");
                }
            }
        }

        fn stop_music(&mut self) {
            self.music_on = false;
            for clip in &self.music {
                let _ = clip.element.pause();
            }
        }
    }
}
