use std::time::Duration;

use egui::{Id, Ui};
use egui_kittest::Harness;
use egui_kittest::kittest::Queryable;
use egui_speech::{SpeechEngine, SpeechToggle, SpeechToggleState, Utterance, UtteranceId};

const NOTICE: &str = "Browser not supported! Try some other browser";

#[derive(Clone, Debug, PartialEq, Eq)]
enum EngineCall {
    Speak,
    Pause,
    Cancel,
}

/// Scripted [`SpeechEngine`] that records every call.
#[derive(Default)]
struct MockEngine {
    available: bool,
    speaking: bool,
    next_id: u64,
    current: Option<UtteranceId>,
    paused: Vec<UtteranceId>,
    calls: Vec<EngineCall>,
    spoken: Vec<Utterance>,
}

impl MockEngine {
    fn present() -> Self {
        Self {
            available: true,
            ..Self::default()
        }
    }

    fn absent() -> Self {
        Self::default()
    }

    /// The platform finished (or paused) the current utterance on its own.
    fn finish_current(&mut self) {
        if let Some(current) = self.current.take() {
            self.paused.push(current);
        }
        self.speaking = false;
    }

    fn count(&self, call: &EngineCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl SpeechEngine for MockEngine {
    fn is_available(&self) -> bool {
        self.available
    }

    fn is_speaking(&self) -> bool {
        self.speaking
    }

    fn speak(&mut self, utterance: Utterance) -> Option<UtteranceId> {
        self.calls.push(EngineCall::Speak);
        self.spoken.push(utterance);
        self.next_id += 1;
        let id = UtteranceId::new(self.next_id);
        self.current = Some(id);
        self.speaking = true;
        Some(id)
    }

    fn pause(&mut self) {
        // A paused utterance still counts as the engine being busy.
        self.calls.push(EngineCall::Pause);
    }

    fn cancel(&mut self) {
        self.calls.push(EngineCall::Cancel);
        self.current = None;
        self.speaking = false;
    }

    fn take_paused(&mut self, utterance: UtteranceId) -> bool {
        if let Some(index) = self.paused.iter().position(|&paused| paused == utterance) {
            self.paused.remove(index);
            true
        } else {
            false
        }
    }
}

/// The scripted engine, plus whatever the toggle stored on the latest pass.
struct SpeechApp {
    engine: MockEngine,
    toggle: Option<SpeechToggleState>,
}

/// Reads back what the toggle identified by `id` stored, keyed the way the
/// widget keys it.
fn stored_state(ui: &Ui, id: &str) -> Option<SpeechToggleState> {
    SpeechToggleState::load(ui.ctx(), ui.make_persistent_id(Id::new(id)))
}

// The widget requests repaints while speech is in flight, so frames are
// driven one explicit `step` at a time rather than with `run`.
fn single_toggle(engine: MockEngine) -> Harness<'static, SpeechApp> {
    Harness::new_ui_state(
        |ui, app: &mut SpeechApp| {
            ui.add(SpeechToggle::new(&mut app.engine, "Hello   egui\tworld").id("reader"));
            app.toggle = stored_state(ui, "reader");
        },
        SpeechApp {
            engine,
            toggle: None,
        },
    )
}

#[test]
fn missing_engine_shows_unsupported_notice() {
    let mut harness = single_toggle(MockEngine::absent());

    harness.get_by_label("Start Speech").click();
    harness.step();

    assert!(
        harness.query_by_label(NOTICE).is_some(),
        "the notice should be on screen"
    );
    // Nothing else happened: the icon is unchanged and the engine was never called.
    let _ = harness.get_by_label("Start Speech");
    assert!(harness.state().engine.calls.is_empty());
}

#[test]
fn unsupported_notice_is_dismissable() {
    let mut harness = single_toggle(MockEngine::absent());

    harness.get_by_label("Start Speech").click();
    harness.step();
    assert!(harness.query_by_label(NOTICE).is_some());

    harness.get_by_label("OK").click();
    harness.step();
    harness.step();

    assert!(harness.query_by_label(NOTICE).is_none());
    let _ = harness.get_by_label("Start Speech");
    assert!(harness.state().engine.calls.is_empty());
}

#[test]
fn click_starts_speaking_with_normalized_parameters() {
    let mut harness = Harness::new_ui_state(
        |ui, app: &mut SpeechApp| {
            ui.add(
                SpeechToggle::new(&mut app.engine, "Hello   egui\tworld")
                    .id("reader")
                    .pitch(10)
                    .rate(0)
                    .volume(5),
            );
            app.toggle = stored_state(ui, "reader");
        },
        SpeechApp {
            engine: MockEngine::present(),
            toggle: None,
        },
    );

    harness.get_by_label("Start Speech").click();
    harness.step();

    // The click frame renders the button before dispatching the click, so
    // the label runs one frame behind the engine and the stored state.
    assert!(
        harness
            .state()
            .toggle
            .is_some_and(|toggle| toggle.is_speaking())
    );
    let engine = &harness.state().engine;
    // One cancel from the first frame, then the speak.
    assert_eq!(engine.calls, vec![EngineCall::Cancel, EngineCall::Speak]);
    assert_eq!(
        engine.spoken,
        vec![Utterance {
            text: "Hello egui world".to_owned(),
            pitch: 2.0,
            rate: 0.0,
            volume: 0.5,
        }]
    );

    harness.step();
    let _ = harness.get_by_label("Stop Speech");
}

#[test]
fn clicking_while_speaking_pauses_then_cancels() {
    let mut harness = single_toggle(MockEngine::present());

    harness.get_by_label("Start Speech").click();
    harness.step();
    harness.step();

    harness.get_by_label("Stop Speech").click();
    harness.step(); // the pause is requested here...
    harness.step(); // ...and the settled cancel runs one frame later

    let _ = harness.get_by_label("Start Speech");
    assert!(
        harness
            .state()
            .toggle
            .is_some_and(|toggle| !toggle.is_speaking())
    );
    assert_eq!(
        harness.state().engine.calls,
        vec![
            EngineCall::Cancel,
            EngineCall::Speak,
            EngineCall::Pause,
            EngineCall::Cancel,
        ]
    );
}

#[test]
fn clicking_takes_over_anothers_utterance() {
    let mut harness = Harness::new_ui_state(
        |ui, app: &mut SpeechApp| {
            ui.add(
                SpeechToggle::new(&mut app.engine, "The first passage.")
                    .id("a")
                    .start_icon("Read A")
                    .stop_icon("Stop A"),
            );
            ui.add(
                SpeechToggle::new(&mut app.engine, "The second passage.")
                    .id("b")
                    .start_icon("Read B")
                    .stop_icon("Stop B"),
            );
        },
        SpeechApp {
            engine: MockEngine::present(),
            toggle: None,
        },
    );

    harness.get_by_label("Read A").click();
    harness.step();
    harness.step();
    let _ = harness.get_by_label("Stop A");

    harness.get_by_label("Read B").click();
    harness.step();
    harness.step();

    // B paused A's utterance, cancelled it after the settle delay, and then
    // started its own.
    let _ = harness.get_by_label("Stop B");
    assert_eq!(
        harness.state().engine.calls,
        vec![
            EngineCall::Cancel, // first frame of A
            EngineCall::Cancel, // first frame of B
            EngineCall::Speak,
            EngineCall::Pause,
            EngineCall::Cancel,
            EngineCall::Speak,
        ]
    );
    assert_eq!(harness.state().engine.spoken[1].text, "The second passage.");

    // A finds out through the engine that its utterance is gone.
    harness.state_mut().engine.paused.push(UtteranceId::new(1));
    harness.step();
    let _ = harness.get_by_label("Read A");
    let _ = harness.get_by_label("Stop B");
}

#[test]
fn engine_completion_reverts_to_idle() {
    let mut harness = single_toggle(MockEngine::present());

    harness.get_by_label("Start Speech").click();
    harness.step();
    harness.step();
    let _ = harness.get_by_label("Stop Speech");

    harness.state_mut().engine.finish_current();
    harness.step();

    let _ = harness.get_by_label("Start Speech");
    // No pause and no cancel beyond the first-frame one: the engine stopped
    // on its own.
    assert_eq!(
        harness.state().engine.calls,
        vec![EngineCall::Cancel, EngineCall::Speak]
    );
}

#[test]
fn pause_notification_before_settle_does_not_restart() {
    let mut harness = single_toggle(MockEngine::present());

    harness.get_by_label("Start Speech").click();
    harness.step();
    harness.step();
    harness.get_by_label("Stop Speech").click();
    harness.step();

    // The engine reports the pause before the settle delay has run out. The
    // click still means "stop": it must not turn into a restart just because
    // the live state was cleared first.
    harness.state_mut().engine.finish_current();
    harness.step();

    let _ = harness.get_by_label("Start Speech");
    assert_eq!(harness.state().engine.count(&EngineCall::Speak), 1);
    assert_eq!(harness.state().engine.count(&EngineCall::Cancel), 2);
}

#[test]
fn first_frame_silences_the_engine_once() {
    let mut harness = single_toggle(MockEngine::present());

    harness.step();
    harness.step();
    harness.step();

    assert_eq!(harness.state().engine.count(&EngineCall::Cancel), 1);
}

#[test]
fn settle_delay_is_honored() {
    let mut harness = Harness::new_ui_state(
        |ui, app: &mut SpeechApp| {
            ui.add(
                SpeechToggle::new(&mut app.engine, "Patience is a virtue.")
                    .id("reader")
                    .settle_delay(Duration::from_secs(100)),
            );
            app.toggle = stored_state(ui, "reader");
        },
        SpeechApp {
            engine: MockEngine::present(),
            toggle: None,
        },
    );

    harness.get_by_label("Start Speech").click();
    harness.step();
    harness.step();
    harness.get_by_label("Stop Speech").click();
    harness.step();
    harness.step();

    // The pause went out immediately, but the cancel is still waiting.
    let _ = harness.get_by_label("Stop Speech");
    assert!(
        harness
            .state()
            .toggle
            .is_some_and(|toggle| toggle.is_speaking())
    );
    assert_eq!(
        harness.state().engine.calls,
        vec![EngineCall::Cancel, EngineCall::Speak, EngineCall::Pause]
    );
}
