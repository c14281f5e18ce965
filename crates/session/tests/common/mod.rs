#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use liftvox_events::{event_names, EventBusRef, InMemoryEventBus, SessionSnapshotEvent};
use liftvox_session::{SessionConfig, SessionController, SessionServices};
use liftvox_speech::{PermissionGate, ScriptedEngine, ScriptedEngineProbe, StaticPermission};
use liftvox_storage::Database;
use liftvox_workout::{Exercise, SessionRepository, Workout};

pub struct Harness<R: SessionRepository = Database> {
    pub controller: SessionController<R>,
    pub probe: ScriptedEngineProbe,
    pub bus: Arc<InMemoryEventBus>,
    pub repository: Arc<R>,
}

pub struct HarnessBuilder<R: SessionRepository = Database> {
    exercises: Vec<(String, u32)>,
    config: SessionConfig,
    engine: ScriptedEngine,
    permission: Arc<dyn PermissionGate>,
    repository: Arc<R>,
}

pub fn builder() -> HarnessBuilder<Database> {
    HarnessBuilder {
        exercises: vec![("squat".to_string(), 2), ("bench".to_string(), 1)],
        config: SessionConfig::default(),
        engine: ScriptedEngine::new(),
        permission: Arc::new(StaticPermission::granted()),
        repository: Arc::new(Database::open_in_memory().unwrap()),
    }
}

impl<R: SessionRepository> HarnessBuilder<R> {
    pub fn exercises(mut self, exercises: &[(&str, u32)]) -> Self {
        self.exercises = exercises
            .iter()
            .map(|(name, sets)| (name.to_string(), *sets))
            .collect();
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn engine(mut self, engine: ScriptedEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn permission(mut self, permission: StaticPermission) -> Self {
        self.permission = Arc::new(permission);
        self
    }

    pub fn repository<S: SessionRepository>(self, repository: Arc<S>) -> HarnessBuilder<S> {
        HarnessBuilder {
            exercises: self.exercises,
            config: self.config,
            engine: self.engine,
            permission: self.permission,
            repository,
        }
    }

    pub fn build(self) -> Harness<R> {
        let exercises = self
            .exercises
            .iter()
            .map(|(name, sets)| Exercise::new(name.as_str(), *sets).unwrap())
            .collect();
        let workout = Workout::new("legs", exercises, "anna").unwrap();

        let probe = self.engine.probe();
        let bus = Arc::new(InMemoryEventBus::new());
        let services = SessionServices {
            engine: Box::new(self.engine),
            permission: self.permission,
            repository: Arc::clone(&self.repository),
            bus: Arc::clone(&bus) as EventBusRef,
        };

        Harness {
            controller: SessionController::new(workout, "anna", self.config, services),
            probe,
            bus,
            repository: self.repository,
        }
    }
}

impl<R: SessionRepository> Harness<R> {
    /// Waits for the next timer or permission input. False if nothing
    /// arrived within a generous (virtual) minute.
    pub async fn step(&mut self) -> bool {
        tokio::time::timeout(Duration::from_secs(60), self.controller.step())
            .await
            .is_ok()
    }

    pub fn snapshot(&self) -> SessionSnapshotEvent {
        self.bus
            .last(event_names::SESSION_SNAPSHOT)
            .expect("a snapshot was published")
    }
}
