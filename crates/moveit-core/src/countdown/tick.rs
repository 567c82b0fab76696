//! The single outstanding tick of a countdown.
//!
//! A tick is represented by its deadline rather than by a spawned task.
//! The event loop waits on whatever deadline the handle holds at the top
//! of each iteration, so clearing the handle inside a transition removes
//! the tick before anything can observe it.

use std::time::Duration;

use tokio::time::Instant;

/// Spacing between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Deadline of the next scheduled tick, if any.
#[derive(Debug, Clone, Default)]
pub struct TickHandle {
    due: Option<Instant>,
}

impl TickHandle {
    /// Schedule a tick one interval from now, cancelling any previous one.
    pub fn arm(&mut self) {
        self.cancel();
        self.due = Some(Instant::now() + TICK_INTERVAL);
    }

    /// Schedule the following tick one interval after the one that just
    /// fired, so long cycles don't drift.
    pub fn advance(&mut self) {
        match self.due {
            Some(due) => self.due = Some(due + TICK_INTERVAL),
            None => self.arm(),
        }
    }

    /// Cancel the pending tick if present. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.due.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }
}

/// Resolve when `due` is reached. Never resolves for `None`.
pub async fn wait_for_tick(due: Option<Instant>) {
    match due {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
