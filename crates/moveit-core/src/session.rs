//! A running move.it session.
//!
//! Owns the countdown and the leveling state machines and is the only
//! place that mutates them. Front ends either call the command methods
//! directly or hand the session to [`Session::run`] and talk to it over a
//! channel; both paths go through the same methods one at a time.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::challenge::ChallengeCatalog;
use crate::countdown::{wait_for_tick, Countdown, CountdownView};
use crate::events::Event;
use crate::leveling::{selection_rng, ChallengeEngine, LevelingView, Sinks};
use crate::storage::{Config, ProgressStore};

/// Requests accepted by [`Session::run`].
#[derive(Debug)]
pub enum Command {
    StartCycle,
    AbandonCycle,
    CompleteChallenge,
    ForfeitChallenge,
    DismissLevelUp,
    Snapshot(oneshot::Sender<Snapshot>),
    Quit,
}

/// Point-in-time view of both state machines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub leveling: LevelingView,
    pub countdown: CountdownView,
}

pub struct Session {
    countdown: Countdown,
    challenges: ChallengeEngine,
}

impl Session {
    pub fn new(countdown: Countdown, challenges: ChallengeEngine) -> Self {
        Self {
            countdown,
            challenges,
        }
    }

    /// Build a session from configuration: cycle length and selection seed.
    pub fn from_config(
        config: &Config,
        catalog: ChallengeCatalog,
        store: Box<dyn ProgressStore>,
        sinks: Sinks,
    ) -> Self {
        let countdown = Countdown::new(config.countdown.duration_secs);
        let challenges = ChallengeEngine::new(
            catalog,
            store,
            sinks,
            selection_rng(config.challenges.seed),
        );
        Self::new(countdown, challenges)
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn challenges(&self) -> &ChallengeEngine {
        &self.challenges
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            leveling: self.challenges.view(),
            countdown: self.countdown.view(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Whether the finished cycle is still waiting on its challenge.
    /// Only completing or forfeiting the challenge moves on from here.
    fn awaiting_challenge(&self) -> bool {
        self.countdown.has_finished() || self.challenges.active_challenge().is_some()
    }

    /// Begin a cycle. No-op while a challenge is pending.
    pub fn start_cycle(&mut self) -> Vec<Event> {
        if self.awaiting_challenge() {
            tracing::debug!("Challenge pending, not starting a cycle");
            return Vec::new();
        }
        self.countdown.start().into_iter().collect()
    }

    /// Reset the countdown, cancelling its pending tick. No-op once the
    /// cycle has ended and its challenge is pending.
    pub fn abandon_cycle(&mut self) -> Vec<Event> {
        if self.awaiting_challenge() {
            tracing::debug!("Challenge pending, cycle cannot be abandoned");
            return Vec::new();
        }
        vec![self.countdown.reset()]
    }

    /// Complete the active challenge and start over with a fresh countdown.
    /// No-op without an active challenge.
    pub fn complete_challenge(&mut self) -> Vec<Event> {
        let mut events = self.challenges.complete_challenge();
        if !events.is_empty() {
            events.push(self.countdown.reset());
        }
        events
    }

    /// Forfeit the active challenge and start over with a fresh countdown.
    /// No-op without an active challenge.
    pub fn forfeit_challenge(&mut self) -> Vec<Event> {
        let mut events = self.challenges.forfeit_challenge();
        if !events.is_empty() {
            events.push(self.countdown.reset());
        }
        events
    }

    pub fn dismiss_level_up(&mut self) -> Vec<Event> {
        self.challenges.dismiss_level_up().into_iter().collect()
    }

    /// Apply one elapsed second to the countdown.
    pub fn tick(&mut self) -> Vec<Event> {
        self.countdown.tick(&mut self.challenges)
    }

    fn handle(&mut self, command: Command) -> Vec<Event> {
        match command {
            Command::StartCycle => self.start_cycle(),
            Command::AbandonCycle => self.abandon_cycle(),
            Command::CompleteChallenge => self.complete_challenge(),
            Command::ForfeitChallenge => self.forfeit_challenge(),
            Command::DismissLevelUp => self.dismiss_level_up(),
            Command::Snapshot(reply) => {
                if reply.send(self.snapshot()).is_err() {
                    tracing::debug!("Snapshot requester went away");
                }
                Vec::new()
            }
            // Handled by the run loop.
            Command::Quit => Vec::new(),
        }
    }

    /// Drive the session until `commands` closes or `Quit` arrives.
    ///
    /// Waits on either the next command or the countdown's pending tick.
    /// Commands win ties. Because the tick deadline is read fresh from the
    /// countdown on every iteration, a reset drops the pending tick before
    /// it can be awaited again.
    ///
    /// Returns the session so callers can inspect the final state.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        tracing::debug!("Session loop started");
        loop {
            let due = self.countdown.next_tick_due();
            let produced = tokio::select! {
                biased;
                command = commands.recv() => match command {
                    None | Some(Command::Quit) => break,
                    Some(command) => self.handle(command),
                },
                _ = wait_for_tick(due) => self.tick(),
            };

            for event in produced {
                if events.send(event).is_err() {
                    tracing::debug!("Event receiver dropped");
                }
            }
        }
        tracing::debug!("Session loop ended");
        self
    }
}
