//! The session state machine.
//!
//! Two independent axes: the run state (Idle → Running ⇄ Paused → Finished)
//! and the voice mode (Inactive, AwaitingCommand, AwaitingSetInput). All
//! inputs arrive on one inbox and are applied serially: user actions,
//! recognition events tagged with their attempt id, re-prompt timers tagged
//! with their generation, and permission answers.

use std::sync::Arc;

use liftvox_events::{
    event_names, EventBusExt, EventBusRef, ExerciseRow, NoticeEvent, ParseFailedEvent,
    SessionFinishedEvent, SessionSnapshotEvent, SetEntryRequestedEvent, SetRecordedEvent,
    SetSource, UnrecognizedCommandEvent, VoiceErrorEvent, VoicePromptEvent, VoiceTargetPayload,
};
use liftvox_parse::{CommandParser, ControlCommand, SetInputParser};
use liftvox_speech::{
    PermissionGateRef, RecognitionEngine, RecognitionErrorKind, RecognitionEvent,
    RecognitionListener, SpeechError,
};
use liftvox_workout::{CompletedSession, SessionRepository, SetRecord, Workout};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::clock::{RunState, SessionClock};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::progress::{ExerciseId, ExerciseProgressStore};
use crate::timer::RepromptTimer;
use crate::voice::{VoiceMode, VoiceRequest, VoiceTarget};

/// Something the user did, as sent through a [`SessionHandle`].
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    ToggleRun,
    Finish,
    ListenForCommand,
    VoiceEnterSet,
    CancelVoice,
    RequestSetEntry { exercise: String },
    SubmitManualSet { exercise: String, weight: f64, reps: u32 },
}

#[derive(Debug)]
pub(crate) enum SessionInput {
    User(UserAction),
    Recognition { attempt: u64, event: RecognitionEvent },
    RepromptDue { generation: u64 },
    PermissionResolved { granted: bool },
    Shutdown,
}

/// Cloneable sender for driving a controller that runs on its own task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inbox: mpsc::UnboundedSender<SessionInput>,
}

impl SessionHandle {
    /// Queues `action`. Returns false once the controller is gone.
    pub fn send(&self, action: UserAction) -> bool {
        self.inbox.send(SessionInput::User(action)).is_ok()
    }

    /// Asks [`SessionController::run`] to release the engine and return.
    pub fn shutdown(&self) -> bool {
        self.inbox.send(SessionInput::Shutdown).is_ok()
    }
}

/// External collaborators of a session.
pub struct SessionServices<R> {
    pub engine: Box<dyn RecognitionEngine>,
    pub permission: PermissionGateRef,
    pub repository: Arc<R>,
    pub bus: EventBusRef,
}

/// Owns one session end to end.
///
/// Must be used inside a tokio runtime: re-prompt timers and permission
/// requests run as spawned tasks that report back through the inbox.
pub struct SessionController<R: SessionRepository> {
    workout_name: String,
    user: String,
    config: SessionConfig,
    commands: CommandParser,
    set_input: SetInputParser,
    store: ExerciseProgressStore,
    clock: SessionClock,
    voice: VoiceMode,
    timer: RepromptTimer,
    engine: Box<dyn RecognitionEngine>,
    permission: PermissionGateRef,
    repository: Arc<R>,
    bus: EventBusRef,
    inbox_tx: mpsc::UnboundedSender<SessionInput>,
    inbox_rx: mpsc::UnboundedReceiver<SessionInput>,
    last_attempt: u64,
    /// Attempt id of the recognition currently outstanding.
    outstanding: Option<u64>,
    /// User-initiated request parked until permission is granted.
    awaiting_permission: Option<VoiceRequest>,
    permission_in_flight: bool,
    parse_failures: u32,
    completed: Option<CompletedSession>,
    released: bool,
}

impl<R: SessionRepository> SessionController<R> {
    pub fn new(
        workout: Workout,
        user: impl Into<String>,
        config: SessionConfig,
        services: SessionServices<R>,
    ) -> Self {
        let user = user.into();
        let Workout {
            name: workout_name,
            exercises,
            ..
        } = workout;
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let mut store = ExerciseProgressStore::new(exercises);
        match services.repository.last_session_for(&workout_name, &user) {
            Ok(Some(previous)) => {
                let ids: Vec<ExerciseId> = store.ids().collect();
                for id in ids {
                    let sets = previous
                        .exercise(store.name(id))
                        .map(|outcome| outcome.recorded_sets.clone());
                    if let Some(sets) = sets {
                        store.set_previous_sets(id, sets);
                    }
                }
                tracing::debug!(session_id = %previous.id, "Loaded previous session for reference");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(workout = %workout_name, error = %e, "Failed to load previous session, continuing without history");
            }
        }

        let controller = Self {
            commands: CommandParser::new(&config.vocabulary.commands),
            set_input: SetInputParser::new(&config.vocabulary.set_input),
            workout_name,
            user,
            config,
            store,
            clock: SessionClock::new(),
            voice: VoiceMode::Inactive,
            timer: RepromptTimer::default(),
            engine: services.engine,
            permission: services.permission,
            repository: services.repository,
            bus: services.bus,
            inbox_tx,
            inbox_rx,
            last_attempt: 0,
            outstanding: None,
            awaiting_permission: None,
            permission_in_flight: false,
            parse_failures: 0,
            completed: None,
            released: false,
        };

        tracing::info!(
            workout = %controller.workout_name,
            user = %controller.user,
            exercises = controller.store.len(),
            "Session opened"
        );
        if !controller.engine.is_available() {
            controller.notice(
                event_names::VOICE_UNAVAILABLE,
                RecognitionErrorKind::Unavailable.message(),
            );
        }
        controller.publish_snapshot();
        controller
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            inbox: self.inbox_tx.clone(),
        }
    }

    pub fn run_state(&self) -> RunState {
        self.clock.state()
    }

    pub fn voice_mode(&self) -> VoiceMode {
        self.voice
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.clock.elapsed()
    }

    pub fn progress(&self) -> &ExerciseProgressStore {
        &self.store
    }

    pub fn is_recognizing(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn reprompt_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// The record built at finish, kept even if saving it failed.
    pub fn completed_session(&self) -> Option<&CompletedSession> {
        self.completed.as_ref()
    }

    // --- Event loop -------------------------------------------------------

    /// Applies everything already queued without waiting. Returns how many
    /// inputs were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(input) = self.inbox_rx.try_recv() {
            self.dispatch(input);
            handled += 1;
        }
        handled
    }

    /// Waits for one input and applies it. Returns false on shutdown.
    pub async fn step(&mut self) -> bool {
        match self.inbox_rx.recv().await {
            Some(SessionInput::Shutdown) | None => {
                self.shutdown();
                false
            }
            Some(input) => {
                self.dispatch(input);
                true
            }
        }
    }

    /// Serves the inbox until [`SessionHandle::shutdown`].
    pub async fn run(mut self) {
        while self.step().await {}
        tracing::info!(workout = %self.workout_name, "Session controller stopped");
    }

    fn dispatch(&mut self, input: SessionInput) {
        match input {
            SessionInput::User(action) => {
                if let Err(e) = self.apply(action.clone()) {
                    tracing::warn!(?action, error = %e, "Action rejected");
                    self.notice(event_names::ACTION_REJECTED, e.to_string());
                }
            }
            SessionInput::Recognition { attempt, event } => self.on_recognition(attempt, event),
            SessionInput::RepromptDue { generation } => self.on_reprompt_due(generation),
            SessionInput::PermissionResolved { granted } => self.on_permission_resolved(granted),
            SessionInput::Shutdown => self.shutdown(),
        }
    }

    pub fn apply(&mut self, action: UserAction) -> Result<()> {
        match action {
            UserAction::ToggleRun => self.toggle_run().map(|_| ()),
            UserAction::Finish => self.finish().map(|_| ()),
            UserAction::ListenForCommand => self.listen_for_command(),
            UserAction::VoiceEnterSet => self.voice_enter_set(),
            UserAction::CancelVoice => self.cancel_voice(),
            UserAction::RequestSetEntry { exercise } => self.request_set_entry(&exercise),
            UserAction::SubmitManualSet {
                exercise,
                weight,
                reps,
            } => self.submit_manual_set(&exercise, weight, reps),
        }
    }

    // --- Manual controls --------------------------------------------------

    /// Idle/Paused → Running, Running → Paused.
    pub fn toggle_run(&mut self) -> Result<RunState> {
        self.ensure_open()?;
        if self.clock.state() == RunState::Running {
            self.clock.pause();
        } else {
            self.clock.start();
        }
        tracing::info!(state = %self.clock.state(), "Run state changed");
        self.publish_snapshot();
        Ok(self.clock.state())
    }

    pub fn listen_for_command(&mut self) -> Result<()> {
        self.begin_manual(VoiceRequest::Command)
    }

    /// Starts voice set input for the first incomplete exercise.
    pub fn voice_enter_set(&mut self) -> Result<()> {
        self.ensure_open()?;
        match self.store.next_incomplete() {
            Some(id) => self.begin_manual(VoiceRequest::SetInput(id)),
            None => {
                self.announce_all_complete();
                Ok(())
            }
        }
    }

    /// Stops any outstanding recognition and drops pending re-prompts.
    pub fn cancel_voice(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.timer.cancel();
        self.awaiting_permission = None;
        self.parse_failures = 0;
        self.close_recognition();
        self.publish_snapshot();
        Ok(())
    }

    /// Asks the renderer to open the set dialog for `exercise`.
    pub fn request_set_entry(&mut self, exercise: &str) -> Result<()> {
        self.ensure_open()?;
        let id = self.lookup(exercise)?;
        if self.store.is_complete(id) {
            return Err(SessionError::ExerciseComplete(exercise.to_string()));
        }
        self.open_set_entry(id);
        Ok(())
    }

    /// Commits a set from the manual dialog. While the exercise still needs
    /// sets the dialog is requested again straight away.
    pub fn submit_manual_set(&mut self, exercise: &str, weight: f64, reps: u32) -> Result<()> {
        self.ensure_open()?;
        let id = self.lookup(exercise)?;
        let record = SetRecord::new(weight, reps)?;
        if self.store.is_complete(id) {
            return Err(SessionError::ExerciseComplete(exercise.to_string()));
        }

        self.parse_failures = 0;
        let listening_here = self.voice.target().is_some_and(|t| t.exercise == id);
        self.commit(id, record, SetSource::Manual);
        if !self.store.is_complete(id) {
            self.open_set_entry(id);
        } else if self.store.all_complete() {
            self.timer.cancel();
            // commit closed the voice input on it and already announced
            if !listening_here {
                self.announce_all_complete();
            }
        }
        self.publish_snapshot();
        Ok(())
    }

    /// Ends the session and hands the record to the repository.
    ///
    /// Pending re-prompts and any outstanding recognition are closed first.
    /// If saving fails the session still ends; the record stays available
    /// through [`Self::completed_session`].
    pub fn finish(&mut self) -> Result<CompletedSession> {
        self.ensure_open()?;
        self.timer.cancel();
        self.awaiting_permission = None;
        self.close_recognition();

        let duration = self.clock.finish().unwrap_or_default();
        let session = CompletedSession {
            id: Uuid::new_v4(),
            workout_name: self.workout_name.clone(),
            exercises: self.store.snapshot(),
            started_at: self.clock.started_at(),
            duration_ms: duration.as_millis() as u64,
            user: self.user.clone(),
        };
        self.completed = Some(session.clone());
        let saved = self.repository.save_completed_session(&session);
        self.publish_snapshot();

        match saved {
            Ok(()) => {
                tracing::info!(
                    session_id = %session.id,
                    duration_ms = session.duration_ms,
                    total_sets = session.total_sets(),
                    "Session finished"
                );
                self.bus.publish(
                    event_names::SESSION_FINISHED,
                    &SessionFinishedEvent {
                        session_id: session.id,
                        workout_name: session.workout_name.clone(),
                        duration_ms: session.duration_ms,
                        total_sets: session.total_sets(),
                    },
                );
                Ok(session)
            }
            Err(e) => {
                tracing::error!(session_id = %session.id, error = %e, "Failed to save session");
                self.notice(
                    event_names::SAVE_FAILED,
                    format!("Workout finished but could not be saved: {e}"),
                );
                Err(SessionError::Persistence(e.to_string()))
            }
        }
    }

    /// Releases the recognition engine. Safe to call more than once; the
    /// engine is destroyed exactly once.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.timer.cancel();
        self.awaiting_permission = None;
        if self.outstanding.take().is_some() {
            self.engine.stop();
        }
        self.voice = VoiceMode::Inactive;
        self.engine.destroy();
        tracing::debug!("Recognition engine released");
    }

    // --- Recognition ------------------------------------------------------

    fn begin_manual(&mut self, request: VoiceRequest) -> Result<()> {
        self.ensure_open()?;
        if self.outstanding.is_some() {
            return Err(SessionError::RecognitionInProgress);
        }
        self.timer.cancel();
        self.parse_failures = 0;
        self.awaiting_permission = None;
        self.request_voice(request, true)
    }

    /// Gatekeeper in front of the engine: availability, then permission.
    fn request_voice(&mut self, request: VoiceRequest, user_initiated: bool) -> Result<()> {
        if self.released {
            return Err(SpeechError::Destroyed.into());
        }
        if !self.engine.is_available() {
            self.notice(
                event_names::VOICE_UNAVAILABLE,
                RecognitionErrorKind::Unavailable.message(),
            );
            return Err(SessionError::VoiceUnavailable);
        }
        if !self.permission.has_permission() {
            if user_initiated {
                self.awaiting_permission = Some(request);
            }
            self.request_permission();
            return Err(SessionError::PermissionDenied);
        }
        self.begin_recognition(request)
    }

    fn request_permission(&mut self) {
        self.notice(
            event_names::PERMISSION_REQUIRED,
            RecognitionErrorKind::PermissionDenied.message(),
        );
        if self.permission_in_flight {
            return;
        }
        self.permission_in_flight = true;

        let gate = Arc::clone(&self.permission);
        let inbox = self.inbox_tx.clone();
        tokio::spawn(async move {
            let granted = gate.request_permission().await;
            let _ = inbox.send(SessionInput::PermissionResolved { granted });
        });
    }

    fn begin_recognition(&mut self, request: VoiceRequest) -> Result<()> {
        self.timer.cancel();
        let mode = match request {
            VoiceRequest::Command => VoiceMode::AwaitingCommand,
            VoiceRequest::SetInput(id) => VoiceMode::AwaitingSetInput(VoiceTarget {
                exercise: id,
                set_number: self.store.next_set_number(id),
            }),
        };

        self.last_attempt += 1;
        let attempt = self.last_attempt;
        let inbox = self.inbox_tx.clone();
        let listener: RecognitionListener = Arc::new(move |event| {
            let _ = inbox.send(SessionInput::Recognition { attempt, event });
        });

        if let Err(e) = self.engine.start(listener) {
            tracing::warn!(attempt, error = %e, "Failed to start recognition");
            self.voice = VoiceMode::Inactive;
            match e {
                SpeechError::Unavailable => self.notice(
                    event_names::VOICE_UNAVAILABLE,
                    RecognitionErrorKind::Unavailable.message(),
                ),
                _ => self.bus.publish(
                    event_names::VOICE_ERROR,
                    &VoiceErrorEvent {
                        kind: RecognitionErrorKind::ClientError.label().to_string(),
                        message: e.to_string(),
                    },
                ),
            }
            self.publish_snapshot();
            return Err(e.into());
        }

        self.outstanding = Some(attempt);
        self.voice = mode;
        tracing::debug!(attempt, mode = mode.label(), "Recognition started");
        if let VoiceMode::AwaitingSetInput(target) = mode {
            self.prompt(target);
        }
        self.publish_snapshot();
        Ok(())
    }

    /// Stops the outstanding attempt, if any, and goes Inactive.
    fn close_recognition(&mut self) {
        if self.outstanding.take().is_some() {
            self.engine.stop();
        }
        self.voice = VoiceMode::Inactive;
    }

    fn on_recognition(&mut self, attempt: u64, event: RecognitionEvent) {
        if self.outstanding != Some(attempt) {
            tracing::debug!(attempt, ?event, "Ignoring event from a closed recognition attempt");
            return;
        }

        match event {
            RecognitionEvent::Ready => self.notice(event_names::VOICE_READY, "Ready"),
            RecognitionEvent::Listening => self.notice(event_names::VOICE_LISTENING, "Listening..."),
            RecognitionEvent::Result(text) => {
                self.outstanding = None;
                match std::mem::take(&mut self.voice) {
                    VoiceMode::AwaitingCommand => self.on_command(&text),
                    VoiceMode::AwaitingSetInput(target) => self.on_set_input(target, &text),
                    VoiceMode::Inactive => {
                        tracing::debug!(attempt, "Result arrived with voice inactive");
                    }
                }
                self.publish_snapshot();
            }
            RecognitionEvent::Error(kind) => {
                self.outstanding = None;
                self.voice = VoiceMode::Inactive;
                self.timer.cancel();
                if kind.is_silent() {
                    tracing::debug!(attempt, %kind, "Recognition ended without speech");
                } else {
                    tracing::warn!(attempt, %kind, "Recognition error");
                    self.bus.publish(
                        event_names::VOICE_ERROR,
                        &VoiceErrorEvent {
                            kind: kind.label().to_string(),
                            message: kind.message().to_string(),
                        },
                    );
                }
                self.publish_snapshot();
            }
        }
    }

    fn on_command(&mut self, text: &str) {
        let command = self.commands.classify(text);
        tracing::info!(%command, text, "Voice command");

        match command {
            ControlCommand::Start => {
                if self.clock.start() {
                    tracing::info!(state = %self.clock.state(), "Run state changed");
                }
            }
            ControlCommand::Stop => {
                if self.clock.pause() {
                    tracing::info!(state = %self.clock.state(), "Run state changed");
                }
            }
            ControlCommand::Finish => {
                if let Err(e) = self.finish() {
                    tracing::warn!(error = %e, "Voice finish did not complete cleanly");
                }
            }
            ControlCommand::AdvanceToNextIncomplete => match self.store.next_incomplete() {
                Some(id) => self.open_set_entry(id),
                None => self.announce_all_complete(),
            },
            ControlCommand::SwitchToVoiceSetInput => match self.store.next_incomplete() {
                Some(id) => {
                    self.parse_failures = 0;
                    if let Err(e) = self.request_voice(VoiceRequest::SetInput(id), true) {
                        tracing::warn!(error = %e, "Could not switch to voice set input");
                    }
                }
                None => self.announce_all_complete(),
            },
            ControlCommand::Unknown => {
                self.bus.publish(
                    event_names::UNRECOGNIZED_COMMAND,
                    &UnrecognizedCommandEvent {
                        text: text.to_string(),
                    },
                );
            }
        }
    }

    fn on_set_input(&mut self, target: VoiceTarget, text: &str) {
        let id = target.exercise;
        let Some(record) = self.set_input.parse(text).to_record() else {
            self.on_parse_failure(target, text);
            return;
        };

        self.parse_failures = 0;
        self.commit(id, record, SetSource::Voice);

        let next = if self.store.is_complete(id) {
            self.store.next_incomplete()
        } else {
            Some(id)
        };
        match next {
            Some(next) => {
                self.timer
                    .schedule(self.config.reprompt_delay(), next, &self.inbox_tx);
            }
            None => self.announce_all_complete(),
        }
    }

    fn on_parse_failure(&mut self, target: VoiceTarget, text: &str) {
        self.parse_failures += 1;
        let name = self.store.name(target.exercise).to_string();

        if self.config.retries_exhausted(self.parse_failures) {
            tracing::warn!(exercise = %name, failures = self.parse_failures, "Giving up on voice set input");
            self.parse_failures = 0;
            self.notice(
                event_names::RETRIES_EXHAUSTED,
                format!("Could not understand the set for {name}. Enter it manually or try again."),
            );
            return;
        }

        tracing::warn!(exercise = %name, text, attempt = self.parse_failures, "Could not parse set input");
        self.bus.publish(
            event_names::PARSE_FAILED,
            &ParseFailedEvent {
                exercise: name.clone(),
                text: text.to_string(),
                attempt: self.parse_failures,
                message: format!("Didn't catch that for {name}, try again"),
            },
        );
        self.timer
            .schedule(self.config.retry_delay(), target.exercise, &self.inbox_tx);
    }

    fn on_reprompt_due(&mut self, generation: u64) {
        let Some(target) = self.timer.take_if_current(generation) else {
            tracing::debug!(generation, "Stale re-prompt ignored");
            return;
        };
        if self.clock.is_finished() || self.outstanding.is_some() {
            return;
        }

        match self.live_target(target) {
            Some(id) => {
                if let Err(e) = self.request_voice(VoiceRequest::SetInput(id), false) {
                    tracing::warn!(generation, error = %e, "Re-prompt could not start recognition");
                }
            }
            None => {
                tracing::debug!(generation, "Nothing left to re-prompt");
                self.publish_snapshot();
            }
        }
    }

    fn on_permission_resolved(&mut self, granted: bool) {
        self.permission_in_flight = false;
        let parked = self.awaiting_permission.take();

        if !granted {
            tracing::warn!("Microphone permission denied");
            let kind = RecognitionErrorKind::PermissionDenied;
            self.bus.publish(
                event_names::VOICE_ERROR,
                &VoiceErrorEvent {
                    kind: kind.label().to_string(),
                    message: kind.message().to_string(),
                },
            );
            return;
        }

        tracing::info!("Microphone permission granted");
        if self.clock.is_finished() || self.outstanding.is_some() {
            return;
        }
        let request = match parked {
            Some(VoiceRequest::SetInput(id)) => match self.live_target(id) {
                Some(id) => VoiceRequest::SetInput(id),
                None => {
                    self.announce_all_complete();
                    return;
                }
            },
            Some(VoiceRequest::Command) => VoiceRequest::Command,
            None => return,
        };
        if let Err(e) = self.request_voice(request, false) {
            tracing::warn!(error = %e, "Could not resume recognition after permission grant");
        }
    }

    // --- Helpers ----------------------------------------------------------

    fn commit(&mut self, id: ExerciseId, record: SetRecord, source: SetSource) {
        let count = self.store.add_set(id, record);
        let name = self.store.name(id).to_string();
        tracing::info!(
            exercise = %name,
            set = count,
            weight = record.weight(),
            reps = record.reps(),
            ?source,
            "Set recorded"
        );
        self.bus.publish(
            event_names::SET_RECORDED,
            &SetRecordedEvent {
                exercise: name.clone(),
                set_number: count as u32,
                weight: record.weight(),
                reps: record.reps(),
                source,
                message: format!("Set {count} for {name}: {record}"),
            },
        );
        self.retarget_voice(id);
    }

    /// Keeps an outstanding set-input target pointing at an exercise that
    /// still needs sets after `changed` received one.
    fn retarget_voice(&mut self, changed: ExerciseId) {
        let VoiceMode::AwaitingSetInput(target) = self.voice else {
            return;
        };
        if target.exercise != changed {
            return;
        }

        match self.live_target(changed) {
            Some(id) => {
                let target = VoiceTarget {
                    exercise: id,
                    set_number: self.store.next_set_number(id),
                };
                self.voice = VoiceMode::AwaitingSetInput(target);
                self.prompt(target);
            }
            None => {
                self.close_recognition();
                self.announce_all_complete();
            }
        }
    }

    /// `id` if it still needs sets, else the next exercise that does.
    fn live_target(&self, id: ExerciseId) -> Option<ExerciseId> {
        if self.store.is_complete(id) {
            self.store.next_incomplete()
        } else {
            Some(id)
        }
    }

    fn prompt(&self, target: VoiceTarget) {
        let exercise = self.store.exercise(target.exercise);
        self.bus.publish(
            event_names::VOICE_PROMPT,
            &VoicePromptEvent {
                exercise: exercise.name.clone(),
                set_number: target.set_number,
                message: format!(
                    "Set {} of {} for {}: say weight and reps",
                    target.set_number, exercise.target_sets, exercise.name
                ),
            },
        );
    }

    fn open_set_entry(&self, id: ExerciseId) {
        self.bus.publish(
            event_names::SET_ENTRY_REQUESTED,
            &SetEntryRequestedEvent {
                exercise: self.store.name(id).to_string(),
                position: id.position(),
                set_number: self.store.next_set_number(id),
            },
        );
    }

    fn announce_all_complete(&self) {
        tracing::info!(workout = %self.workout_name, "All exercises complete");
        self.notice(event_names::ALL_COMPLETE, "All exercises complete");
    }

    fn notice(&self, topic: &str, message: impl Into<String>) {
        self.bus.publish(topic, &NoticeEvent::new(message));
    }

    fn ensure_open(&self) -> Result<()> {
        if self.clock.is_finished() {
            return Err(SessionError::Finished);
        }
        Ok(())
    }

    fn lookup(&self, exercise: &str) -> Result<ExerciseId> {
        self.store
            .find(exercise)
            .ok_or_else(|| SessionError::UnknownExercise(exercise.to_string()))
    }

    /// Render state for the current moment.
    pub fn snapshot(&self) -> SessionSnapshotEvent {
        let exercises = self
            .store
            .ids()
            .map(|id| {
                let exercise = self.store.exercise(id);
                ExerciseRow {
                    name: exercise.name.clone(),
                    target_sets: exercise.target_sets,
                    recorded_sets: self.store.sets_for(id).to_vec(),
                    previous_sets: exercise.previous_sets.clone(),
                    percent: self.store.completion_percent(id),
                    complete: self.store.is_complete(id),
                }
            })
            .collect();

        SessionSnapshotEvent {
            workout_name: self.workout_name.clone(),
            run_state: self.clock.state().label().to_string(),
            elapsed_ms: self.clock.elapsed().as_millis() as u64,
            voice_mode: self.voice.label().to_string(),
            voice_target: self.voice.target().map(|target| VoiceTargetPayload {
                exercise: self.store.name(target.exercise).to_string(),
                position: target.exercise.position(),
                set_number: target.set_number,
            }),
            voice_available: self.engine.is_available(),
            exercises,
            overall_percent: self.store.overall_completion_percent(),
        }
    }

    fn publish_snapshot(&self) {
        self.bus
            .publish(event_names::SESSION_SNAPSHOT, &self.snapshot());
    }
}

impl<R: SessionRepository> Drop for SessionController<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
