use std::time::Duration;

use egui::{Button, Color32, Context, Id, Modal, Response, Sides, Ui, Vec2, Widget, WidgetText};

use crate::{SpeechEngine, Utterance, UtteranceId};

/// How long a click-initiated pause gets to settle before the engine is
/// cancelled and the next state is decided.
///
/// Overridable per widget with [`SpeechToggle::settle_delay`].
pub const SETTLE_DELAY: Duration = Duration::from_millis(1);

/// Shown when the environment has no text-to-speech support at all.
const UNSUPPORTED_NOTICE: &str = "Browser not supported! Try some other browser";

/// A button that reads a piece of text out loud.
///
/// Clicking it starts text-to-speech for the given string, and clicking it
/// again stops it. When another toggle's utterance is playing, a click takes
/// the engine over and reads this toggle's text instead.
///
/// The speech engine is passed in explicitly. Use
/// [`SystemSpeech`](crate::SystemSpeech) for the platform's own support, or
/// bring any [`SpeechEngine`] of your own.
///
/// ```
/// # egui::__run_test_ui(|ui| {
/// # let mut speech = egui_speech::SystemSpeech::new();
/// ui.add(egui_speech::SpeechToggle::new(&mut speech, "Hello world!"));
/// # });
/// ```
#[must_use = "You should put this widget in a ui with `ui.add(widget);`"]
pub struct SpeechToggle<'a> {
    engine: &'a mut dyn SpeechEngine,
    text: &'a str,
    id: Option<Id>,
    start_icon: WidgetText,
    stop_icon: WidgetText,
    pitch: u8,
    rate: u8,
    volume: u8,
    settle_delay: Duration,
    fill: Option<Color32>,
    frame: Option<bool>,
    small: bool,
    min_size: Vec2,
}

impl<'a> SpeechToggle<'a> {
    /// Read `text` out loud through `engine` when clicked.
    pub fn new(engine: &'a mut dyn SpeechEngine, text: &'a str) -> Self {
        Self {
            engine,
            text,
            id: None,
            start_icon: "Start Speech".into(),
            stop_icon: "Stop Speech".into(),
            pitch: 5,
            rate: 5,
            volume: 10,
            settle_delay: SETTLE_DELAY,
            fill: None,
            frame: None,
            small: false,
            min_size: Vec2::ZERO,
        }
    }

    /// Identifies this toggle among the instances sharing an engine.
    /// Must be set if multiple speech toggles are in the same [`Ui`].
    ///
    /// When a click pauses an utterance that belongs to a toggle with a
    /// different id, the engine is taken over instead of just stopped.
    #[inline]
    pub fn id(mut self, id: impl std::hash::Hash) -> Self {
        self.id = Some(Id::new(id));
        self
    }

    /// Button label while idle. Default: "Start Speech".
    #[inline]
    pub fn start_icon(mut self, icon: impl Into<WidgetText>) -> Self {
        self.start_icon = icon.into();
        self
    }

    /// Button label while this toggle is the one speaking. Default: "Stop Speech".
    #[inline]
    pub fn stop_icon(mut self, icon: impl Into<WidgetText>) -> Self {
        self.stop_icon = icon.into();
        self
    }

    /// Voice pitch on a 0–10 scale, where 5 is the engine default.
    #[inline]
    pub fn pitch(mut self, pitch: u8) -> Self {
        self.pitch = pitch;
        self
    }

    /// Speaking rate on a 0–10 scale, where 5 is the engine default.
    #[inline]
    pub fn rate(mut self, rate: u8) -> Self {
        self.rate = rate;
        self
    }

    /// Loudness on a 0–10 scale, where 10 (the default) is full volume.
    #[inline]
    pub fn volume(mut self, volume: u8) -> Self {
        self.volume = volume;
        self
    }

    /// How long a click-initiated pause gets to settle before the engine is
    /// cancelled and the next state is decided. Default: [`SETTLE_DELAY`].
    ///
    /// Pausing a platform engine is not instantaneous, so the cancel and the
    /// idle-or-take-over decision wait this long after the click.
    #[inline]
    pub fn settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Override the button's background fill color.
    #[inline]
    pub fn fill(mut self, fill: impl Into<Color32>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Turn off the button frame.
    #[inline]
    pub fn frame(mut self, frame: bool) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Show a small button, suitable for embedding into text.
    #[inline]
    pub fn small(mut self) -> Self {
        self.small = true;
        self
    }

    /// Set the minimum size of the button.
    #[inline]
    pub fn min_size(mut self, min_size: Vec2) -> Self {
        self.min_size = min_size;
        self
    }
}

impl Widget for SpeechToggle<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let Self {
            engine,
            text,
            id,
            start_icon,
            stop_icon,
            pitch,
            rate,
            volume,
            settle_delay,
            fill,
            frame,
            small,
            min_size,
        } = self;

        let start_speaking = |engine: &mut dyn SpeechEngine, state: &mut SpeechToggleState| {
            state.icon = SpeechIcon::Stop;
            state.active_id = id;
            state.utterance = engine.speak(Utterance {
                text: collapse_whitespace(text),
                pitch: engine_pitch_rate(pitch),
                rate: engine_pitch_rate(rate),
                volume: engine_volume(volume),
            });
        };

        let state_id = ui.make_persistent_id(id.unwrap_or_else(|| Id::new("speech_toggle")));

        let mut state = match SpeechToggleState::load(ui.ctx(), state_id) {
            Some(state) => state,
            None => {
                // First frame. Leftover speech from before this widget
                // existed would confuse the toggle, so silence the engine.
                if engine.is_available() {
                    engine.cancel();
                }
                SpeechToggleState::default()
            }
        };

        // An engine-initiated pause/completion notification, if one arrived.
        if let Some(utterance) = state.utterance {
            if engine.take_paused(utterance) {
                state.revert_to_idle();
            }
        }

        // A pause from an earlier click that has settled by now.
        let now = ui.input(|i| i.time);
        if let Some(pending) = state.pending {
            if now - pending.armed_at >= settle_delay.as_secs_f64() {
                state.pending = None;
                engine.cancel();
                if should_restart(pending.active_id, id) {
                    // Somebody else was speaking; the click wanted this text
                    // spoken instead.
                    start_speaking(engine, &mut state);
                } else {
                    state.revert_to_idle();
                }
            }
        }

        let label = match state.icon {
            SpeechIcon::Start => start_icon,
            SpeechIcon::Stop => stop_icon,
        };
        let mut button = Button::new(label).min_size(min_size);
        if let Some(fill) = fill {
            button = button.fill(fill);
        }
        if let Some(frame) = frame {
            button = button.frame(frame);
        }
        if small {
            button = button.small();
        }
        let mut response = ui.add(button);

        if response.clicked() {
            if !engine.is_available() {
                state.alert_open = true;
            } else if engine.is_speaking() {
                // Ask for a pause now, cancel and decide once it has settled.
                engine.pause();
                state.pending = Some(PendingCancel {
                    active_id: state.active_id,
                    armed_at: now,
                });
                response.mark_changed();
            } else {
                start_speaking(engine, &mut state);
                response.mark_changed();
            }
        }

        if state.alert_open {
            let modal = Modal::new(state_id.with("alert")).show(ui.ctx(), |ui| {
                ui.set_width(260.0);
                ui.label(UNSUPPORTED_NOTICE);
                ui.separator();
                Sides::new().show(
                    ui,
                    |_ui| {},
                    |ui| {
                        if ui.button("OK").clicked() {
                            ui.close();
                        }
                    },
                );
            });
            if modal.should_close() {
                state.alert_open = false;
            }
        }

        // Notifications and the settle step are only observed on later frame
        // passes, so keep those frames coming while anything is in flight.
        if state.utterance.is_some() || state.pending.is_some() {
            ui.ctx().request_repaint();
        }

        state.store(ui.ctx(), state_id);

        response
    }
}

/// What [`SpeechToggle`] remembers between frames.
///
/// Stored in temporary [`Context`] memory, keyed by
/// `ui.make_persistent_id(Id::new(toggle_id))` for the toggle's configured
/// id (`"speech_toggle"` when it has none), so callers can [`load`][Self::load]
/// it back from the same [`Ui`]. Utterance handles are runtime-only, so
/// nothing here is ever persisted to disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpeechToggleState {
    icon: SpeechIcon,
    active_id: Option<Id>,
    utterance: Option<UtteranceId>,
    pending: Option<PendingCancel>,
    alert_open: bool,
}

impl SpeechToggleState {
    pub fn load(ctx: &Context, id: Id) -> Option<Self> {
        ctx.data_mut(|d| d.get_temp(id))
    }

    pub fn store(self, ctx: &Context, id: Id) {
        ctx.data_mut(|d| d.insert_temp(id, self));
    }

    /// Does this toggle believe it is the one currently driving playback?
    pub fn is_speaking(&self) -> bool {
        self.icon == SpeechIcon::Stop
    }

    /// Pause, cancellation and natural completion all end up here.
    fn revert_to_idle(&mut self) {
        self.icon = SpeechIcon::Start;
        self.active_id = None;
        self.utterance = None;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum SpeechIcon {
    #[default]
    Start,
    Stop,
}

/// A click asked for a pause; once the settle delay has passed, the engine
/// is cancelled and the next state is decided.
#[derive(Clone, Copy, Debug)]
struct PendingCancel {
    /// Who this toggle believed was speaking when it was clicked.
    ///
    /// Captured at click time on purpose: the engine's pause notification
    /// may clear the live state before the settle delay runs out, and that
    /// must not change the decision.
    active_id: Option<Id>,

    /// [`Context`] time at the click, in seconds.
    armed_at: f64,
}

/// Should a settled pause restart speech, or finish it?
///
/// Restart when the pause hit somebody else's utterance: the click wanted
/// this toggle's text instead. Toggles without an id all look the same here,
/// so between those a takeover finishes instead of restarting.
fn should_restart(active_at_click: Option<Id>, own_id: Option<Id>) -> bool {
    active_at_click != own_id
}

/// Collapses every run of whitespace to a single space.
///
/// Idempotent, and deliberately not trimming: a leading or trailing run
/// still becomes one space.
fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_run {
                collapsed.push(' ');
            }
            in_run = true;
        } else {
            collapsed.push(ch);
            in_run = false;
        }
    }
    collapsed
}

/// 0–10 scale → engine scale, where 5 is the engine default (1.0).
fn engine_pitch_rate(value: u8) -> f32 {
    f32::from(value) / 5.0
}

/// 0–10 scale → the engine's 0.0–1.0 volume scale.
fn engine_volume(value: u8) -> f32 {
    f32::from(value) / 10.0
}
