//! The speech capability a [`SpeechToggle`](crate::SpeechToggle) talks to.

/// One unit of text-to-speech work.
///
/// Built fresh every time speech starts and handed to the engine, which owns
/// it from then on.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    /// What to say.
    pub text: String,

    /// Voice pitch, where `1.0` is the engine default.
    /// Most engines accept roughly `0.0..=2.0`.
    pub pitch: f32,

    /// Speaking rate, where `1.0` is the engine default.
    /// Most engines accept roughly `0.0..=2.0`.
    pub rate: f32,

    /// Loudness in `0.0..=1.0`.
    pub volume: f32,
}

impl Default for Utterance {
    fn default() -> Self {
        Self {
            text: String::new(),
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
        }
    }
}

/// Identifies one submitted [`Utterance`].
///
/// Minted by the engine when it accepts an utterance. The widget keeps it
/// around to ask [`SpeechEngine::take_paused`] about that particular
/// utterance later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UtteranceId(u64);

impl UtteranceId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// A text-to-speech capability, as [`SpeechToggle`](crate::SpeechToggle)
/// sees it.
///
/// All calls are fire-and-forget: nothing blocks, and there is no error
/// channel. Engines that can fail are expected to log and carry on, like
/// [`SystemSpeech`](crate::SystemSpeech) does.
///
/// One engine is typically shared by every widget in the application.
/// The engine serializes utterances itself: at most one is ever speaking.
pub trait SpeechEngine {
    /// Is text-to-speech present at all in this environment?
    ///
    /// When this returns `false` the widget shows a notice instead of
    /// trying to speak.
    fn is_available(&self) -> bool;

    /// Is some utterance currently being spoken, no matter who submitted it?
    fn is_speaking(&self) -> bool;

    /// Start speaking `utterance`, without waiting for it to finish.
    ///
    /// Returns a handle to poll with [`Self::take_paused`],
    /// or `None` if the utterance was not accepted.
    fn speak(&mut self, utterance: Utterance) -> Option<UtteranceId>;

    /// Ask the engine to pause the current utterance.
    ///
    /// Pausing is not guaranteed to take effect immediately, or at all.
    /// Callers that need certainty follow up with [`Self::cancel`].
    fn pause(&mut self);

    /// Drop whatever the engine is currently speaking.
    fn cancel(&mut self);

    /// Has `utterance` stopped being spoken?
    ///
    /// Reports pause, cancellation and natural completion alike; the causes
    /// are deliberately not distinguished. The notification is consumed:
    /// once this has returned `true` for an utterance, the engine may forget
    /// about it.
    fn take_paused(&mut self, utterance: UtteranceId) -> bool;
}
