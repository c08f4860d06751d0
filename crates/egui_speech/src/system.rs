#[cfg(feature = "tts")]
use std::time::Duration;

#[cfg(feature = "tts")]
use egui::emath::lerp;
#[cfg(feature = "tts")]
use web_time::Instant;

use crate::{SpeechEngine, Utterance, UtteranceId};

/// How long a freshly submitted utterance may stay silent before it counts
/// as finished. Platforms take a moment to actually start speaking.
#[cfg(feature = "tts")]
const START_GRACE: Duration = Duration::from_millis(1500);

/// [`SpeechEngine`] backed by the platform's own text-to-speech support,
/// through the [`tts`](https://docs.rs/tts) crate.
///
/// Construction never fails: when the platform has no usable speech support
/// the engine just reports itself as unavailable. Platform errors are logged
/// as warnings and otherwise swallowed.
///
/// Requires the `tts` cargo feature. Without it this type still exists, but
/// reports the capability as permanently unavailable.
pub struct SystemSpeech {
    #[cfg(feature = "tts")]
    tts: Option<tts::Tts>,

    #[cfg(feature = "tts")]
    next_id: u64,

    #[cfg(feature = "tts")]
    current: Option<Current>,
}

/// The utterance most recently handed to the platform.
#[cfg(feature = "tts")]
struct Current {
    id: UtteranceId,
    submitted: Instant,

    /// Did we ever observe the platform speaking this utterance?
    heard: bool,
}

#[cfg(not(feature = "tts"))]
impl SystemSpeech {
    /// Connect to the platform's text-to-speech support, if there is any.
    pub fn new() -> Self {
        log::debug!("Compiled without the \"tts\" feature; speech is unavailable.");
        Self {}
    }
}

#[cfg(feature = "tts")]
impl SystemSpeech {
    /// Connect to the platform's text-to-speech support, if there is any.
    pub fn new() -> Self {
        let tts = match tts::Tts::default() {
            Ok(tts) => {
                log::debug!("Initialized text-to-speech.");
                Some(tts)
            }
            Err(err) => {
                log::warn!("Failed to load text-to-speech support: {err}");
                None
            }
        };
        Self {
            tts,
            next_id: 0,
            current: None,
        }
    }
}

impl Default for SystemSpeech {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(feature = "tts"))]
impl SpeechEngine for SystemSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn is_speaking(&self) -> bool {
        false
    }

    fn speak(&mut self, _utterance: Utterance) -> Option<UtteranceId> {
        None
    }

    fn pause(&mut self) {}

    fn cancel(&mut self) {}

    fn take_paused(&mut self, _utterance: UtteranceId) -> bool {
        true
    }
}

#[cfg(feature = "tts")]
impl SpeechEngine for SystemSpeech {
    fn is_available(&self) -> bool {
        self.tts.is_some()
    }

    fn is_speaking(&self) -> bool {
        self.tts
            .as_ref()
            .is_some_and(|tts| tts.is_speaking().unwrap_or(false))
    }

    fn speak(&mut self, utterance: Utterance) -> Option<UtteranceId> {
        let tts = self.tts.as_mut()?;

        // Each platform exposes its own parameter ranges. 1.0 on the engine
        // scale is the platform's "normal", the extremes interpolate towards
        // its min/max.
        let pitch = platform_range(
            utterance.pitch,
            tts.min_pitch(),
            tts.normal_pitch(),
            tts.max_pitch(),
        );
        if let Err(err) = tts.set_pitch(pitch) {
            log::warn!("Failed to set speech pitch: {err}");
        }

        let rate = platform_range(
            utterance.rate,
            tts.min_rate(),
            tts.normal_rate(),
            tts.max_rate(),
        );
        if let Err(err) = tts.set_rate(rate) {
            log::warn!("Failed to set speech rate: {err}");
        }

        let volume = lerp(
            tts.min_volume()..=tts.max_volume(),
            utterance.volume.clamp(0.0, 1.0),
        );
        if let Err(err) = tts.set_volume(volume) {
            log::warn!("Failed to set speech volume: {err}");
        }

        match tts.speak(utterance.text, false) {
            Ok(_) => {
                self.next_id += 1;
                let id = UtteranceId::new(self.next_id);
                self.current = Some(Current {
                    id,
                    submitted: Instant::now(),
                    heard: false,
                });
                Some(id)
            }
            Err(err) => {
                log::warn!("Failed to speak: {err}");
                None
            }
        }
    }

    fn pause(&mut self) {
        // The tts crate has no pause operation. Harmless: the widget always
        // follows a pause with `cancel` one settle delay later, and that
        // stops the platform for real.
    }

    fn cancel(&mut self) {
        if let Some(tts) = &mut self.tts {
            if let Err(err) = tts.stop() {
                log::warn!("Failed to stop speech: {err}");
            }
        }
        self.current = None;
    }

    fn take_paused(&mut self, utterance: UtteranceId) -> bool {
        let speaking = self.is_speaking();

        let Some(current) = &mut self.current else {
            // Cancelled, or never accepted. Either way it is over.
            return true;
        };
        if current.id != utterance {
            // Superseded by a newer utterance.
            return true;
        }

        if speaking {
            current.heard = true;
            return false;
        }

        // The platform is quiet, so the utterance is over if it ever started.
        // A fresh submission gets some grace to spin up.
        if current.heard || current.submitted.elapsed() > START_GRACE {
            self.current = None;
            true
        } else {
            false
        }
    }
}

/// Maps `value` on the engine scale (`0.0..=2.0` with `1.0` the default) onto
/// a platform parameter range.
#[cfg(feature = "tts")]
fn platform_range(value: f32, min: f32, normal: f32, max: f32) -> f32 {
    let value = value.clamp(0.0, 2.0);
    if value <= 1.0 {
        lerp(min..=normal, value)
    } else {
        lerp(normal..=max, value - 1.0)
    }
}
