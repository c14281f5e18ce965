//! Session run state and elapsed time.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    /// Terminal.
    Finished,
}

impl RunState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Finished => "finished",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Monotonic stopwatch that only accumulates while Running.
///
/// Elapsed time uses `tokio::time::Instant` so paused-clock tests control it;
/// the wall-clock start is kept separately for the persisted record.
#[derive(Debug)]
pub struct SessionClock {
    state: RunState,
    accumulated: Duration,
    running_since: Option<Instant>,
    opened_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            accumulated: Duration::ZERO,
            running_since: None,
            opened_at: Utc::now(),
            started_at: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == RunState::Finished
    }

    /// Idle/Paused -> Running. Returns false if nothing changed.
    pub fn start(&mut self) -> bool {
        match self.state {
            RunState::Idle | RunState::Paused => {
                self.running_since = Some(Instant::now());
                self.started_at.get_or_insert_with(Utc::now);
                self.state = RunState::Running;
                true
            }
            RunState::Running | RunState::Finished => false,
        }
    }

    /// Running -> Paused, keeping the accumulated time.
    pub fn pause(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
        self.state = RunState::Paused;
        true
    }

    /// Moves to Finished and captures the duration exactly once.
    ///
    /// The duration is the elapsed time if the clock was Running, and zero
    /// if it was Idle or Paused. Returns `None` if already finished.
    pub fn finish(&mut self) -> Option<Duration> {
        let duration = match self.state {
            RunState::Finished => return None,
            RunState::Running => self.elapsed(),
            RunState::Idle | RunState::Paused => Duration::ZERO,
        };
        self.running_since = None;
        self.accumulated = duration;
        self.state = RunState::Finished;
        Some(duration)
    }

    pub fn elapsed(&self) -> Duration {
        self.accumulated + self.running_since.map(|s| s.elapsed()).unwrap_or_default()
    }

    /// Wall-clock time of the first start, or of opening if never started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at.unwrap_or(self.opened_at)
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_accumulates_only_while_running() {
        let mut clock = SessionClock::new();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(clock.elapsed(), Duration::ZERO);

        assert!(clock.start());
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(clock.pause());
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(clock.elapsed(), Duration::from_secs(10));

        assert!(clock.start());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(clock.elapsed(), Duration::from_secs(12));
        assert_eq!(clock.finish(), Some(Duration::from_secs(12)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_while_paused_records_zero() {
        let mut clock = SessionClock::new();
        clock.start();
        tokio::time::advance(Duration::from_secs(10)).await;
        clock.pause();

        assert_eq!(clock.finish(), Some(Duration::ZERO));
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_finish_from_idle_is_zero_and_terminal() {
        let mut clock = SessionClock::new();
        assert_eq!(clock.finish(), Some(Duration::ZERO));
        assert_eq!(clock.finish(), None);
        assert!(!clock.start());
        assert!(!clock.pause());
        assert_eq!(clock.state(), RunState::Finished);
    }

    #[test]
    fn test_started_at_defaults_to_open_time() {
        let clock = SessionClock::new();
        assert_eq!(clock.started_at(), clock.opened_at);
    }
}
