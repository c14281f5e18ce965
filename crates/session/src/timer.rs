//! Cancellable re-prompt timer keyed by generation.
//!
//! Every schedule or cancel bumps the generation. A timer that fires with a
//! generation other than the one still pending is stale and does nothing,
//! so a prompt can never land on a finished session or a changed target.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::controller::SessionInput;
use crate::progress::ExerciseId;

#[derive(Debug)]
struct Pending {
    generation: u64,
    target: ExerciseId,
    token: CancellationToken,
}

#[derive(Debug, Default)]
pub(crate) struct RepromptTimer {
    generation: u64,
    pending: Option<Pending>,
}

impl RepromptTimer {
    /// Replaces any pending re-prompt with one for `target` after `delay`.
    pub fn schedule(
        &mut self,
        delay: Duration,
        target: ExerciseId,
        inbox: &UnboundedSender<SessionInput>,
    ) -> u64 {
        self.cancel();
        let generation = self.generation;
        let token = CancellationToken::new();

        let cancelled = token.clone();
        let inbox = inbox.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = inbox.send(SessionInput::RepromptDue { generation });
                }
            }
        });

        tracing::debug!(generation, ?target, delay_ms = delay.as_millis() as u64, "Re-prompt scheduled");
        self.pending = Some(Pending {
            generation,
            target,
            token,
        });
        generation
    }

    /// Invalidates whatever is pending. Returns true if something was.
    pub fn cancel(&mut self) -> bool {
        self.generation += 1;
        match self.pending.take() {
            Some(pending) => {
                pending.token.cancel();
                tracing::debug!(generation = pending.generation, "Re-prompt cancelled");
                true
            }
            None => false,
        }
    }

    /// Claims the pending target if `generation` is still current.
    pub fn take_if_current(&mut self, generation: u64) -> Option<ExerciseId> {
        match &self.pending {
            Some(pending) if pending.generation == generation => {
                self.pending.take().map(|p| p.target)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[cfg(test)]
    fn pending_target(&self) -> Option<ExerciseId> {
        self.pending.as_ref().map(|p| p.target)
    }
}

impl Drop for RepromptTimer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
    }
}
