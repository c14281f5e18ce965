//! Event bus abstraction for decoupled event emission.
//!
//! The controller only knows about this trait, so the same state machine can
//! drive a terminal renderer, a GUI, or a test recorder.

use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Trait for emitting events to subscribers.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload.
    ///
    /// # Arguments
    /// * `topic` - Event name (e.g., "session:snapshot")
    /// * `payload` - JSON payload to emit
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Typed emission on top of [`EventBus`].
pub trait EventBusExt {
    /// Serialize `payload` and emit it. Serialization failures are logged
    /// and the event is dropped.
    fn publish<T: Serialize>(&self, topic: &str, payload: &T);
}

impl<B: EventBus + ?Sized> EventBusExt for B {
    fn publish<T: Serialize>(&self, topic: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => self.emit(topic, value),
            Err(e) => tracing::warn!(topic, "Failed to serialize event payload: {}", e),
        }
    }
}

/// A captured event from [`InMemoryEventBus`].
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// In-memory event bus that records every event, for tests and replay.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.lock().clone()
    }

    /// Get events for a specific topic, oldest first.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.lock()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Most recent payload on `topic`, deserialized.
    pub fn last<T: serde::de::DeserializeOwned>(&self, topic: &str) -> Option<T> {
        self.lock()
            .iter()
            .rev()
            .find(|e| e.topic == topic)
            .and_then(|e| serde_json::from_value(e.payload.clone()).ok())
    }

    pub fn count(&self, topic: &str) -> usize {
        self.lock().iter().filter(|e| e.topic == topic).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().expect("event bus mutex poisoned")
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.lock().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// No-op event bus that discards all events.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{event_names, NoticeEvent};
    use serde_json::json;

    #[test]
    fn test_in_memory_event_bus_filters_by_topic() {
        let bus = InMemoryEventBus::new();

        bus.emit("session:snapshot", json!({"n": 1}));
        bus.emit("voice:ready", json!({}));
        bus.emit("session:snapshot", json!({"n": 2}));

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.count("session:snapshot"), 2);
        assert_eq!(bus.events_for("voice:ready").len(), 1);
        assert!(bus.events_for("voice:missing").is_empty());
    }

    #[test]
    fn test_publish_and_last() {
        let bus = InMemoryEventBus::new();
        bus.publish(event_names::ALL_COMPLETE, &NoticeEvent::new("first"));
        bus.publish(event_names::ALL_COMPLETE, &NoticeEvent::new("second"));

        let last: NoticeEvent = bus.last(event_names::ALL_COMPLETE).unwrap();
        assert_eq!(last.message, "second");
    }

    #[test]
    fn test_publish_through_trait_object() {
        let bus = Arc::new(InMemoryEventBus::new());
        let shared: EventBusRef = bus.clone();
        shared.publish(event_names::VOICE_READY, &NoticeEvent::new("ready"));
        assert_eq!(bus.count(event_names::VOICE_READY), 1);
    }

    #[test]
    fn test_clear() {
        let bus = InMemoryEventBus::new();
        bus.emit("voice:ready", json!({}));
        assert!(!bus.is_empty());
        bus.clear();
        assert!(bus.is_empty());
    }

    #[test]
    fn test_null_event_bus() {
        NullEventBus.publish(event_names::VOICE_READY, &NoticeEvent::new("ignored"));
    }
}
