//! Countdown state machine.
//!
//! The countdown does not own a thread or a task. It records the deadline
//! of its next tick in a [`TickHandle`]; whoever drives it waits for that
//! deadline and then calls `tick()`.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Finished
//!    ^          |          |
//!    +--reset---+---reset--+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut countdown = Countdown::new(DEFAULT_DURATION_SECS);
//! countdown.start();
//! // When countdown.next_tick_due() elapses:
//! countdown.tick(&mut listener);
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::tick::TickHandle;
use crate::events::Event;

/// Length of a cycle: 25 minutes.
pub const DEFAULT_DURATION_SECS: u64 = 25 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownPhase {
    Stopped,
    Running,
    Finished,
}

/// Receives the end of a cycle.
///
/// The countdown calls this exactly once per cycle, in the same step that
/// moves it to `Finished`.
pub trait CycleListener {
    fn on_cycle_finished(&mut self) -> Vec<Event>;
}

/// Serializable view of a countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownView {
    pub phase: CountdownPhase,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub is_running: bool,
    pub has_finished: bool,
}

/// One-shot countdown over a fixed duration.
#[derive(Debug, Clone)]
pub struct Countdown {
    total_secs: u64,
    remaining_secs: u64,
    phase: CountdownPhase,
    ticks: TickHandle,
}

impl Countdown {
    /// Create a stopped countdown. A zero duration is raised to one second.
    pub fn new(total_secs: u64) -> Self {
        let total_secs = total_secs.max(1);
        Self {
            total_secs,
            remaining_secs: total_secs,
            phase: CountdownPhase::Stopped,
            ticks: TickHandle::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == CountdownPhase::Running
    }

    pub fn has_finished(&self) -> bool {
        self.phase == CountdownPhase::Finished
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn minutes(&self) -> u64 {
        self.remaining_secs / 60
    }

    pub fn seconds(&self) -> u64 {
        self.remaining_secs % 60
    }

    /// `MM:SS`, zero padded.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.minutes(), self.seconds())
    }

    /// What the primary action does in the current phase.
    pub fn action_label(&self) -> &'static str {
        match self.phase {
            CountdownPhase::Stopped => "Start a cycle",
            CountdownPhase::Running => "Abandon cycle",
            CountdownPhase::Finished => "Cycle ended",
        }
    }

    /// Deadline of the pending tick, if one is scheduled.
    pub fn next_tick_due(&self) -> Option<Instant> {
        self.ticks.due()
    }

    pub fn view(&self) -> CountdownView {
        CountdownView {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            minutes: self.minutes(),
            seconds: self.seconds(),
            is_running: self.is_running(),
            has_finished: self.has_finished(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a cycle. Only valid from `Stopped`.
    pub fn start(&mut self) -> Option<Event> {
        match self.phase {
            CountdownPhase::Stopped => {
                self.phase = CountdownPhase::Running;
                self.ticks.arm();
                tracing::debug!(remaining_secs = self.remaining_secs, "Countdown started");
                Some(Event::CountdownStarted {
                    duration_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            CountdownPhase::Running | CountdownPhase::Finished => None,
        }
    }

    /// Apply one elapsed second.
    ///
    /// Ignored unless running, so a tick that outlives a reset is harmless.
    /// Reaching zero finishes the cycle and notifies `listener` in the
    /// same call.
    pub fn tick(&mut self, listener: &mut dyn CycleListener) -> Vec<Event> {
        if self.phase != CountdownPhase::Running {
            return Vec::new();
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        let mut events = vec![Event::CountdownTicked {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }];

        if self.remaining_secs == 0 {
            self.ticks.cancel();
            self.phase = CountdownPhase::Finished;
            tracing::debug!("Countdown finished");
            events.push(Event::CountdownFinished { at: Utc::now() });
            events.extend(listener.on_cycle_finished());
        } else {
            self.ticks.advance();
        }
        events
    }

    /// Abandon the cycle from any phase and restore the full duration.
    pub fn reset(&mut self) -> Event {
        let cancelled = self.ticks.cancel();
        self.phase = CountdownPhase::Stopped;
        self.remaining_secs = self.total_secs;
        tracing::debug!(cancelled_tick = cancelled, "Countdown reset");
        Event::CountdownReset { at: Utc::now() }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        calls: usize,
    }

    impl CycleListener for Counter {
        fn on_cycle_finished(&mut self) -> Vec<Event> {
            self.calls += 1;
            Vec::new()
        }
    }

    #[test]
    fn starts_stopped_at_full_duration() {
        let countdown = Countdown::default();
        assert_eq!(countdown.phase(), CountdownPhase::Stopped);
        assert_eq!(countdown.remaining_secs(), 1500);
        assert_eq!(countdown.display(), "25:00");
        assert_eq!(countdown.action_label(), "Start a cycle");
        assert!(countdown.next_tick_due().is_none());
    }

    #[test]
    fn start_arms_a_tick_once() {
        let mut countdown = Countdown::default();
        assert!(countdown.start().is_some());
        assert!(countdown.is_running());
        assert!(countdown.next_tick_due().is_some());
        assert!(countdown.start().is_none());
    }

    #[test]
    fn tick_decrements_and_rearms() {
        let mut countdown = Countdown::new(90);
        let mut listener = Counter::default();
        countdown.start();
        let first_due = countdown.next_tick_due().unwrap();
        let events = countdown.tick(&mut listener);
        assert_eq!(countdown.remaining_secs(), 89);
        assert_eq!(countdown.minutes(), 1);
        assert_eq!(countdown.seconds(), 29);
        assert_eq!(events.len(), 1);
        assert!(countdown.next_tick_due().unwrap() > first_due);
        assert_eq!(listener.calls, 0);
    }

    #[test]
    fn one_second_cycle_finishes_after_one_tick() {
        let mut countdown = Countdown::new(1);
        let mut listener = Counter::default();
        countdown.start();
        let events = countdown.tick(&mut listener);

        assert!(countdown.has_finished());
        assert!(!countdown.is_running());
        assert_eq!(countdown.remaining_secs(), 0);
        assert!(countdown.next_tick_due().is_none());
        assert_eq!(listener.calls, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::CountdownFinished { .. })));
        assert_eq!(countdown.action_label(), "Cycle ended");

        // Further ticks and starts are ignored.
        assert!(countdown.tick(&mut listener).is_empty());
        assert!(countdown.start().is_none());
        assert_eq!(listener.calls, 1);
    }

    #[test]
    fn reset_from_every_phase() {
        let mut listener = Counter::default();

        let mut stopped = Countdown::default();
        stopped.reset();

        let mut running = Countdown::default();
        running.start();
        running.tick(&mut listener);

        let mut finished = Countdown::new(1);
        finished.start();
        finished.tick(&mut listener);

        for mut countdown in [stopped, running, finished] {
            countdown.reset();
            let view = countdown.view();
            assert_eq!(view.remaining_secs, countdown.total_secs());
            assert!(!view.is_running);
            assert!(!view.has_finished);
            assert!(countdown.next_tick_due().is_none());
        }
    }

    #[test]
    fn tick_after_reset_never_applies() {
        let mut countdown = Countdown::default();
        let mut listener = Counter::default();
        countdown.start();
        assert!(countdown.next_tick_due().is_some());
        countdown.reset();
        // The previously scheduled tick fires late.
        assert!(countdown.tick(&mut listener).is_empty());
        assert_eq!(countdown.remaining_secs(), DEFAULT_DURATION_SECS);
        assert_eq!(countdown.phase(), CountdownPhase::Stopped);
    }

    #[test]
    fn running_and_finished_are_exclusive() {
        let mut countdown = Countdown::new(3);
        let mut listener = Counter::default();
        countdown.start();
        for _ in 0..5 {
            countdown.tick(&mut listener);
            assert!(!(countdown.is_running() && countdown.has_finished()));
        }
        assert_eq!(listener.calls, 1);
    }

    #[test]
    fn zero_duration_is_raised() {
        assert_eq!(Countdown::new(0).total_secs(), 1);
    }

    #[test]
    fn view_serializes_phase_lowercase() {
        let json = serde_json::to_value(Countdown::default().view()).unwrap();
        assert_eq!(json["phase"], "stopped");
        assert_eq!(json["minutes"], 25);
    }
}
