//! Leveling state machine.
//!
//! Holds the player's level, experience and completed-challenge count,
//! plus at most one active challenge.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start_new_challenge--> ChallengeActive
//! ChallengeActive --complete_challenge | forfeit_challenge--> Idle
//! ```
//!
//! Every other call is a silent no-op. Progress is written to the store
//! after each change; a failing store is logged and otherwise ignored.

use chrono::Utc;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::challenge::{Challenge, ChallengeCatalog};
use crate::countdown::CycleListener;
use crate::events::Event;
use crate::notify::{AudioCue, Notifier, Permission, Silent};
use crate::storage::{Progress, ProgressStore};

const NEW_CHALLENGE_TITLE: &str = "New Challenge!";

/// Experience needed to leave `level`: `((level + 1) * 4)^2`.
pub fn experience_to_next_level(level: u32) -> u64 {
    let base = (u64::from(level) + 1).saturating_mul(4);
    base.saturating_mul(base)
}

/// Move experience at or above the threshold into levels. At the top
/// level the excess is dropped so experience stays below the threshold.
fn roll_over(progress: &mut Progress) {
    loop {
        let threshold = experience_to_next_level(progress.level);
        if progress.current_experience < threshold {
            return;
        }
        match progress.level.checked_add(1) {
            Some(next) => {
                progress.current_experience -= threshold;
                progress.level = next;
            }
            None => {
                progress.current_experience = threshold - 1;
                return;
            }
        }
    }
}

/// RNG used for challenge selection. A seed makes selection repeatable.
pub fn selection_rng(seed: Option<u64>) -> Mcg128Xsl64 {
    match seed {
        Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
        None => Mcg128Xsl64::from_entropy(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelingPhase {
    Idle,
    ChallengeActive,
}

/// Serializable view of the leveling state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelingView {
    pub phase: LevelingPhase,
    pub level: u32,
    pub current_experience: u64,
    pub experience_to_next_level: u64,
    pub percent_to_next_level: u8,
    pub challenges_completed: u64,
    pub active_challenge: Option<Challenge>,
    pub level_up_pending: bool,
}

/// Side-effect sinks used when a challenge arrives.
pub struct Sinks {
    pub notifier: Box<dyn Notifier>,
    pub audio: Box<dyn AudioCue>,
}

impl Sinks {
    pub fn new(notifier: impl Notifier + 'static, audio: impl AudioCue + 'static) -> Self {
        Self {
            notifier: Box::new(notifier),
            audio: Box::new(audio),
        }
    }

    pub fn silent() -> Self {
        Self::new(Silent, Silent)
    }
}

/// The leveling state machine and its collaborators.
pub struct ChallengeEngine {
    progress: Progress,
    active: Option<Challenge>,
    level_up_pending: bool,
    catalog: ChallengeCatalog,
    rng: Mcg128Xsl64,
    store: Box<dyn ProgressStore>,
    sinks: Sinks,
}

impl ChallengeEngine {
    /// Restore progress from `store` and ask for notification permission.
    ///
    /// An unreadable store starts from defaults. Stored experience at or
    /// above the threshold is rolled into levels so the invariant holds
    /// from the first transition.
    pub fn new(
        catalog: ChallengeCatalog,
        store: Box<dyn ProgressStore>,
        mut sinks: Sinks,
        rng: Mcg128Xsl64,
    ) -> Self {
        let mut progress = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read stored progress, starting fresh");
            Progress::default()
        });
        progress.level = progress.level.max(1);
        let stored = progress;
        roll_over(&mut progress);
        if progress != stored {
            tracing::warn!(
                level = stored.level,
                current_experience = stored.current_experience,
                rolled_to = progress.level,
                "Stored experience exceeds threshold, rolling over"
            );
        }

        let permission = sinks.notifier.request_permission();
        tracing::debug!(?permission, "Notification permission");

        Self {
            progress,
            active: None,
            level_up_pending: false,
            catalog,
            rng,
            store,
            sinks,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> LevelingPhase {
        if self.active.is_some() {
            LevelingPhase::ChallengeActive
        } else {
            LevelingPhase::Idle
        }
    }

    pub fn level(&self) -> u32 {
        self.progress.level
    }

    pub fn current_experience(&self) -> u64 {
        self.progress.current_experience
    }

    pub fn experience_to_next_level(&self) -> u64 {
        experience_to_next_level(self.progress.level)
    }

    pub fn challenges_completed(&self) -> u64 {
        self.progress.challenges_completed
    }

    pub fn active_challenge(&self) -> Option<&Challenge> {
        self.active.as_ref()
    }

    pub fn level_up_pending(&self) -> bool {
        self.level_up_pending
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn catalog(&self) -> &ChallengeCatalog {
        &self.catalog
    }

    /// Share of the current level already earned, rounded, 0..=100.
    pub fn percent_to_next_level(&self) -> u8 {
        let threshold = self.experience_to_next_level();
        if threshold == 0 {
            return 0;
        }
        let pct = (self.progress.current_experience as f64 / threshold as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    pub fn view(&self) -> LevelingView {
        LevelingView {
            phase: self.phase(),
            level: self.level(),
            current_experience: self.current_experience(),
            experience_to_next_level: self.experience_to_next_level(),
            percent_to_next_level: self.percent_to_next_level(),
            challenges_completed: self.challenges_completed(),
            active_challenge: self.active.clone(),
            level_up_pending: self.level_up_pending,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Select a random challenge. Only valid while idle.
    pub fn start_new_challenge(&mut self) -> Vec<Event> {
        if let Some(active) = &self.active {
            tracing::debug!(
                description = %active.description,
                "Challenge already active, not selecting another"
            );
            return Vec::new();
        }

        let challenge = self.catalog.pick(&mut self.rng).clone();

        if let Err(e) = self.sinks.audio.play() {
            tracing::warn!(error = %e, "Could not play challenge sound");
        }
        if self.sinks.notifier.permission() == Permission::Granted {
            let body = format!("Worth {}xp!", challenge.amount);
            if let Err(e) = self.sinks.notifier.notify(NEW_CHALLENGE_TITLE, &body) {
                tracing::warn!(error = %e, "Could not show challenge notification");
            }
        }

        tracing::info!(
            category = %challenge.category,
            amount = challenge.amount,
            "New challenge"
        );
        self.active = Some(challenge.clone());
        vec![Event::ChallengeStarted {
            challenge,
            at: Utc::now(),
        }]
    }

    /// Award the active challenge. No-op while idle.
    pub fn complete_challenge(&mut self) -> Vec<Event> {
        let Some(challenge) = self.active.take() else {
            return Vec::new();
        };

        let from_level = self.progress.level;
        self.progress.current_experience =
            self.progress.current_experience.saturating_add(challenge.amount);
        roll_over(&mut self.progress);
        let level_ups: Vec<Event> = (from_level..self.progress.level)
            .map(|reached| self.level_up(reached + 1))
            .collect();
        self.progress.challenges_completed = self.progress.challenges_completed.saturating_add(1);
        self.persist();

        let mut events = vec![Event::ChallengeCompleted {
            challenge,
            current_experience: self.progress.current_experience,
            challenges_completed: self.progress.challenges_completed,
            at: Utc::now(),
        }];
        events.extend(level_ups);
        events
    }

    /// Drop the active challenge without reward. No-op while idle.
    pub fn forfeit_challenge(&mut self) -> Vec<Event> {
        match self.active.take() {
            Some(challenge) => {
                tracing::debug!(description = %challenge.description, "Challenge forfeited");
                vec![Event::ChallengeForfeited {
                    challenge,
                    at: Utc::now(),
                }]
            }
            None => Vec::new(),
        }
    }

    /// Hide the level-up acknowledgment.
    pub fn dismiss_level_up(&mut self) -> Option<Event> {
        if !std::mem::take(&mut self.level_up_pending) {
            return None;
        }
        Some(Event::LevelUpDismissed { at: Utc::now() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn level_up(&mut self, level: u32) -> Event {
        self.level_up_pending = true;
        tracing::info!(level, "Level up");
        Event::LevelUp {
            level,
            at: Utc::now(),
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.progress) {
            tracing::warn!(error = %e, "Could not persist progress");
        }
    }
}

impl CycleListener for ChallengeEngine {
    fn on_cycle_finished(&mut self) -> Vec<Event> {
        self.start_new_challenge()
    }
}
