use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::Challenge;

/// Every state change in a session produces an Event.
/// Front ends render from these; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CountdownStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownTicked {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The cycle ran out. A challenge is selected in the same step.
    CountdownFinished {
        at: DateTime<Utc>,
    },
    CountdownReset {
        at: DateTime<Utc>,
    },
    ChallengeStarted {
        challenge: Challenge,
        at: DateTime<Utc>,
    },
    ChallengeCompleted {
        challenge: Challenge,
        current_experience: u64,
        challenges_completed: u64,
        at: DateTime<Utc>,
    },
    ChallengeForfeited {
        challenge: Challenge,
        at: DateTime<Utc>,
    },
    LevelUp {
        level: u32,
        at: DateTime<Utc>,
    },
    LevelUpDismissed {
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short human-readable rendering for terminal output.
    pub fn describe(&self) -> String {
        match self {
            Event::CountdownStarted { duration_secs, .. } => {
                format!("Cycle started ({:02}:{:02})", duration_secs / 60, duration_secs % 60)
            }
            Event::CountdownTicked { remaining_secs, .. } => {
                format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
            }
            Event::CountdownFinished { .. } => "Cycle ended".to_string(),
            Event::CountdownReset { .. } => "Countdown reset".to_string(),
            Event::ChallengeStarted { challenge, .. } => format!(
                "New challenge [{}] earn {} xp: {}",
                challenge.category, challenge.amount, challenge.description
            ),
            Event::ChallengeCompleted {
                challenge,
                current_experience,
                ..
            } => format!(
                "Challenge completed (+{} xp, now {} xp)",
                challenge.amount, current_experience
            ),
            Event::ChallengeForfeited { .. } => "Challenge forfeited".to_string(),
            Event::LevelUp { level, .. } => {
                format!("Congratulations! You leveled up to level {level}.")
            }
            Event::LevelUpDismissed { .. } => "Level-up dismissed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengeCategory;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::LevelUp {
            level: 3,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "LevelUp");
        assert_eq!(json["level"], 3);
    }

    #[test]
    fn describe_formats_countdown_as_minutes_seconds() {
        let event = Event::CountdownTicked {
            remaining_secs: 61,
            at: Utc::now(),
        };
        assert_eq!(event.describe(), "01:01");
    }

    #[test]
    fn describe_mentions_challenge_reward() {
        let event = Event::ChallengeStarted {
            challenge: Challenge::new(ChallengeCategory::Eye, "Blink", 50),
            at: Utc::now(),
        };
        assert!(event.describe().contains("earn 50 xp"));
    }
}
