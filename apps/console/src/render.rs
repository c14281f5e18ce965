//! Prints controller events to the terminal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use liftvox_events::{
    event_names, EventBus, ExerciseRow, NoticeEvent, ParseFailedEvent, SessionFinishedEvent,
    SessionSnapshotEvent, SetEntryRequestedEvent, SetRecordedEvent, UnrecognizedCommandEvent,
    VoiceErrorEvent, VoicePromptEvent,
};
use serde::de::DeserializeOwned;

/// Event bus that renders to stdout.
#[derive(Default)]
pub struct TerminalBus {
    last_snapshot: Mutex<Option<SessionSnapshotEvent>>,
    finished: Arc<AtomicBool>,
}

impl TerminalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set once the session has ended, saved or not.
    pub fn finished_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.finished)
    }

    fn render_snapshot(&self, snapshot: SessionSnapshotEvent) {
        let mut last = self.last_snapshot.lock().expect("snapshot mutex poisoned");
        if !needs_redraw(last.as_ref(), &snapshot) {
            return;
        }

        let secs = snapshot.elapsed_ms / 1000;
        let voice = match &snapshot.voice_target {
            Some(target) => format!(
                "{} ({} set {})",
                snapshot.voice_mode, target.exercise, target.set_number
            ),
            None => snapshot.voice_mode.clone(),
        };
        println!(
            "[{} {:02}:{:02}] {} | voice: {}{} | {}%",
            snapshot.run_state,
            secs / 60,
            secs % 60,
            snapshot.workout_name,
            voice,
            if snapshot.voice_available { "" } else { " (unavailable)" },
            snapshot.overall_percent
        );
        for row in &snapshot.exercises {
            println!("    {}", format_row(row));
        }
        *last = Some(snapshot);
    }
}

/// Elapsed time alone is not worth a redraw.
fn needs_redraw(previous: Option<&SessionSnapshotEvent>, snapshot: &SessionSnapshotEvent) -> bool {
    match previous {
        Some(previous) => {
            (SessionSnapshotEvent {
                elapsed_ms: snapshot.elapsed_ms,
                ..previous.clone()
            }) != *snapshot
        }
        None => true,
    }
}

fn format_row(row: &ExerciseRow) -> String {
    let mark = if row.complete { "x" } else { " " };
    let sets: Vec<String> = row.recorded_sets.iter().map(|s| s.to_string()).collect();
    let mut line = format!(
        "[{mark}] {} {}/{}: {}",
        row.name,
        row.recorded_sets.len(),
        row.target_sets,
        if sets.is_empty() { "-".to_string() } else { sets.join(", ") }
    );
    if !row.previous_sets.is_empty() {
        let previous: Vec<String> = row.previous_sets.iter().map(|s| s.to_string()).collect();
        line.push_str(&format!("  (last time: {})", previous.join(", ")));
    }
    line
}

fn decode<T: DeserializeOwned>(topic: &str, payload: serde_json::Value) -> Option<T> {
    match serde_json::from_value(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(topic, "Failed to decode event for display: {}", e);
            None
        }
    }
}

impl EventBus for TerminalBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        match topic {
            event_names::SESSION_SNAPSHOT => {
                if let Some(snapshot) = decode(topic, payload) {
                    self.render_snapshot(snapshot);
                }
            }
            event_names::SET_RECORDED => {
                if let Some(event) = decode::<SetRecordedEvent>(topic, payload) {
                    println!("+ {}", event.message);
                }
            }
            event_names::SET_ENTRY_REQUESTED => {
                if let Some(event) = decode::<SetEntryRequestedEvent>(topic, payload) {
                    println!(
                        "> {} set {}: type :set {} <weight> <reps>",
                        event.exercise, event.set_number, event.exercise
                    );
                }
            }
            event_names::VOICE_PROMPT => {
                if let Some(event) = decode::<VoicePromptEvent>(topic, payload) {
                    println!("~ {}", event.message);
                }
            }
            event_names::VOICE_LISTENING => println!("~ listening..."),
            event_names::VOICE_ERROR => {
                if let Some(event) = decode::<VoiceErrorEvent>(topic, payload) {
                    println!("! {} ({})", event.message, event.kind);
                }
            }
            event_names::UNRECOGNIZED_COMMAND => {
                if let Some(event) = decode::<UnrecognizedCommandEvent>(topic, payload) {
                    println!("? didn't understand \"{}\"", event.text);
                }
            }
            event_names::PARSE_FAILED => {
                if let Some(event) = decode::<ParseFailedEvent>(topic, payload) {
                    println!("? {} (attempt {})", event.message, event.attempt);
                }
            }
            event_names::SESSION_FINISHED => {
                if let Some(event) = decode::<SessionFinishedEvent>(topic, payload) {
                    let secs = event.duration_ms / 1000;
                    println!(
                        "Finished {}: {} sets in {:02}:{:02}. Press Enter to exit.",
                        event.workout_name,
                        event.total_sets,
                        secs / 60,
                        secs % 60
                    );
                }
                self.finished.store(true, Ordering::SeqCst);
            }
            event_names::SAVE_FAILED => {
                if let Some(event) = decode::<NoticeEvent>(topic, payload) {
                    println!("! {}", event.message);
                }
                self.finished.store(true, Ordering::SeqCst);
            }
            event_names::VOICE_READY => {}
            _ => {
                if let Some(event) = decode::<NoticeEvent>(topic, payload) {
                    println!("* {}", event.message);
                }
            }
        }
    }
}
