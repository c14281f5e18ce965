//! Scripted recognizer for headless runs and tests.
//!
//! Each `start()` consumes the next scripted outcome. When the script is
//! empty (or the outcome is [`ScriptedOutcome::Hold`]) the invocation stays
//! outstanding until [`ScriptedEngineProbe::deliver`] is called, which lets a
//! terminal front-end feed typed lines in place of speech.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::{RecognitionEngine, RecognitionErrorKind, RecognitionEvent, RecognitionListener};
use crate::SpeechError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    /// Recognize `text` immediately.
    Say(String),
    /// Fail immediately with `kind`.
    Fail(RecognitionErrorKind),
    /// Stay outstanding until a probe delivers the terminal event.
    Hold,
}

#[derive(Default)]
struct ScriptState {
    script: VecDeque<ScriptedOutcome>,
    outstanding: Option<RecognitionListener>,
    starts: usize,
    stops: usize,
    releases: usize,
    destroyed: bool,
}

/// Recognition engine driven by a script instead of a microphone.
pub struct ScriptedEngine {
    state: Arc<Mutex<ScriptState>>,
    available: bool,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState::default())),
            available: true,
        }
    }

    pub fn with_script(outcomes: impl IntoIterator<Item = ScriptedOutcome>) -> Self {
        let engine = Self::new();
        engine.lock().script.extend(outcomes);
        engine
    }

    /// Engine that reports the capability as absent.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Handle for inspecting and feeding the engine after it has been moved
    /// into a controller.
    pub fn probe(&self) -> ScriptedEngineProbe {
        ScriptedEngineProbe {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().expect("scripted engine mutex poisoned")
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&mut self, listener: RecognitionListener) -> crate::Result<()> {
        if !self.available {
            return Err(SpeechError::Unavailable);
        }

        let terminal = {
            let mut state = self.lock();
            if state.destroyed {
                return Err(SpeechError::Destroyed);
            }
            if state.outstanding.is_some() {
                return Err(SpeechError::Busy);
            }
            state.starts += 1;

            match state.script.pop_front() {
                Some(ScriptedOutcome::Say(text)) => Some(RecognitionEvent::Result(text)),
                Some(ScriptedOutcome::Fail(kind)) => Some(RecognitionEvent::Error(kind)),
                Some(ScriptedOutcome::Hold) | None => {
                    state.outstanding = Some(Arc::clone(&listener));
                    None
                }
            }
        };

        listener(RecognitionEvent::Ready);
        listener(RecognitionEvent::Listening);
        if let Some(event) = terminal {
            tracing::debug!(?event, "Scripted recognition outcome");
            listener(event);
        }
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.lock();
        state.stops += 1;
        state.outstanding = None;
    }

    fn destroy(&mut self) {
        let mut state = self.lock();
        if state.destroyed {
            return;
        }
        state.destroyed = true;
        state.outstanding = None;
        state.releases += 1;
        tracing::debug!("Scripted engine released");
    }
}

/// Shared view of a [`ScriptedEngine`].
#[derive(Clone)]
pub struct ScriptedEngineProbe {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedEngineProbe {
    pub fn push(&self, outcome: ScriptedOutcome) {
        self.lock().script.push_back(outcome);
    }

    pub fn say(&self, text: impl Into<String>) {
        self.push(ScriptedOutcome::Say(text.into()));
    }

    pub fn fail(&self, kind: RecognitionErrorKind) {
        self.push(ScriptedOutcome::Fail(kind));
    }

    /// Deliver `event` to the outstanding invocation. Terminal events close
    /// it. Returns false when nothing is outstanding.
    pub fn deliver(&self, event: RecognitionEvent) -> bool {
        let listener = {
            let mut state = self.lock();
            let listener = match state.outstanding.as_ref() {
                Some(listener) => Arc::clone(listener),
                None => return false,
            };
            if event.is_terminal() {
                state.outstanding = None;
            }
            listener
        };
        listener(event);
        true
    }

    pub fn is_listening(&self) -> bool {
        self.lock().outstanding.is_some()
    }

    pub fn starts(&self) -> usize {
        self.lock().starts
    }

    pub fn stops(&self) -> usize {
        self.lock().stops
    }

    /// Number of times resources were actually released.
    pub fn releases(&self) -> usize {
        self.lock().releases
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().expect("scripted engine mutex poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (RecognitionListener, Arc<Mutex<Vec<RecognitionEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let listener: RecognitionListener = Arc::new(move |event| {
            sink.lock().unwrap().push(event);
        });
        (listener, events)
    }

    #[test]
    fn test_scripted_result_sequence() {
        let mut engine = ScriptedEngine::with_script([ScriptedOutcome::Say("start".into())]);
        let (listener, events) = recorder();

        engine.start(listener).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                RecognitionEvent::Ready,
                RecognitionEvent::Listening,
                RecognitionEvent::Result("start".into()),
            ]
        );
        assert!(!engine.probe().is_listening());
    }

    #[test]
    fn test_hold_then_deliver() {
        let mut engine = ScriptedEngine::new();
        let probe = engine.probe();
        let (listener, events) = recorder();

        engine.start(listener.clone()).unwrap();
        assert!(probe.is_listening());
        assert_eq!(engine.start(listener), Err(SpeechError::Busy));

        assert!(probe.deliver(RecognitionEvent::Result("ten".into())));
        assert!(!probe.is_listening());
        assert!(!probe.deliver(RecognitionEvent::Result("again".into())));
        assert_eq!(events.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_stop_closes_invocation() {
        let mut engine = ScriptedEngine::new();
        let probe = engine.probe();
        let (listener, _events) = recorder();

        engine.start(listener.clone()).unwrap();
        engine.stop();
        assert!(!probe.is_listening());
        assert!(engine.start(listener).is_ok());
        assert_eq!(probe.starts(), 2);
        assert_eq!(probe.stops(), 1);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut engine = ScriptedEngine::new();
        let probe = engine.probe();

        engine.destroy();
        engine.destroy();

        assert_eq!(probe.releases(), 1);
        let (listener, _events) = recorder();
        assert_eq!(engine.start(listener), Err(SpeechError::Destroyed));
    }

    #[test]
    fn test_unavailable_engine() {
        let mut engine = ScriptedEngine::unavailable();
        let (listener, events) = recorder();
        assert!(!engine.is_available());
        assert_eq!(engine.start(listener), Err(SpeechError::Unavailable));
        assert!(events.lock().unwrap().is_empty());
    }
}
