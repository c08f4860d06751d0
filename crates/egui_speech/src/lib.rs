#![doc = include_str!("../README.md")]
//!
//! ## Feature flags
#![cfg_attr(feature = "document-features", doc = document_features::document_features!())]
//!

mod engine;
mod speech_toggle;
mod system;

pub use engine::{SpeechEngine, Utterance, UtteranceId};
pub use speech_toggle::{SETTLE_DELAY, SpeechToggle, SpeechToggleState};
pub use system::SystemSpeech;
