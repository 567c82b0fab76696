mod catalog;

pub use catalog::{challenge_index, ChallengeCatalog};

use serde::{Deserialize, Serialize};

/// What a challenge exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeCategory {
    Body,
    Eye,
}

impl std::fmt::Display for ChallengeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Body => write!(f, "body"),
            Self::Eye => write!(f, "eye"),
        }
    }
}

/// A single exercise prompt with its experience reward.
///
/// Serialized with the catalog field names: `type`, `description`, `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(rename = "type")]
    pub category: ChallengeCategory,
    pub description: String,
    /// Experience awarded on completion. Always positive.
    pub amount: u64,
}

impl Challenge {
    pub fn new(category: ChallengeCategory, description: impl Into<String>, amount: u64) -> Self {
        Self {
            category,
            description: description.into(),
            amount,
        }
    }
}
