//! Challenge catalog loading and uniform selection.
//!
//! The catalog is read once at startup and is read-only afterwards. A
//! catalog is always non-empty, so selection can never fail.

use std::path::Path;

use rand::Rng;
use serde::Serialize;

use super::Challenge;
use crate::error::{CatalogError, ValidationError};

const BUILTIN_CATALOG: &str = include_str!("../../assets/challenges.json");

/// Map a uniform sample in `[0, 1)` onto a catalog slot.
///
/// Uses `floor`, never `round`, so the result stays within `[0, len - 1]`.
/// The clamp covers samples that land on exactly `1.0` after float error.
/// `len` must be non-zero.
pub fn challenge_index(sample: f64, len: usize) -> usize {
    debug_assert!(len > 0, "challenge_index called with an empty catalog");
    let idx = (sample * len as f64).floor();
    if idx.is_nan() || idx < 0.0 {
        return 0;
    }
    (idx as usize).min(len.saturating_sub(1))
}

/// Ordered, non-empty list of challenges.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ChallengeCatalog {
    challenges: Vec<Challenge>,
}

impl ChallengeCatalog {
    /// Validate and wrap a list of challenges.
    ///
    /// # Errors
    /// Returns an error if the list is empty or any challenge is worth 0 xp.
    pub fn new(challenges: Vec<Challenge>) -> Result<Self, ValidationError> {
        if challenges.is_empty() {
            return Err(ValidationError::EmptyCollection("challenge catalog".into()));
        }
        if let Some(pos) = challenges.iter().position(|c| c.amount == 0) {
            return Err(ValidationError::InvalidValue {
                field: format!("challenges[{pos}].amount"),
                message: "must be greater than zero".into(),
            });
        }
        Ok(Self { challenges })
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        // The bundled file is covered by tests; falling back keeps this infallible.
        Self::from_json(BUILTIN_CATALOG).unwrap_or_else(|_| Self {
            challenges: vec![Challenge::new(
                super::ChallengeCategory::Eye,
                "Look at something far away for 20 seconds.",
                50,
            )],
        })
    }

    /// Parse a JSON array of challenges.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let challenges: Vec<Challenge> = serde_json::from_str(json)?;
        Ok(Self::new(challenges)?)
    }

    /// Load a catalog file from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Challenge> {
        self.challenges.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Challenge> {
        self.challenges.iter()
    }

    /// Pick one challenge uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &Challenge {
        let sample: f64 = rng.gen();
        let idx = challenge_index(sample, self.challenges.len());
        &self.challenges[idx]
    }
}

impl Default for ChallengeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengeCategory;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    #[test]
    fn builtin_catalog_parses() {
        let catalog = ChallengeCatalog::from_json(BUILTIN_CATALOG).unwrap();
        assert_eq!(catalog.len(), 12);
        assert!(catalog.iter().any(|c| c.category == ChallengeCategory::Body));
        assert!(catalog.iter().any(|c| c.category == ChallengeCategory::Eye));
    }

    #[test]
    fn index_boundaries() {
        assert_eq!(challenge_index(0.0, 5), 0);
        assert_eq!(challenge_index(0.999_999_999, 5), 4);
        // round() would have produced 5 here.
        assert_eq!(challenge_index(0.95, 5), 4);
        assert_eq!(challenge_index(1.0, 5), 4);
        assert_eq!(challenge_index(f64::NAN, 5), 0);
    }

    #[test]
    fn rejects_empty_catalog() {
        let err = ChallengeCatalog::from_json("[]").unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Invalid(ValidationError::EmptyCollection(_))
        ));
    }

    #[test]
    fn rejects_zero_amount() {
        let json = r#"[{"type": "eye", "description": "Blink", "amount": 0}]"#;
        let err = ChallengeCatalog::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Invalid(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_unknown_category() {
        let json = r#"[{"type": "mind", "description": "Meditate", "amount": 10}]"#;
        assert!(matches!(
            ChallengeCatalog::from_json(json),
            Err(CatalogError::ParseFailed(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ChallengeCatalog::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CatalogError::ReadFailed { .. }));
    }

    #[test]
    fn seeded_pick_is_deterministic() {
        let catalog = ChallengeCatalog::builtin();
        let mut a = Mcg128Xsl64::seed_from_u64(7);
        let mut b = Mcg128Xsl64::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(catalog.pick(&mut a), catalog.pick(&mut b));
        }
    }

    #[test]
    fn pick_reaches_every_slot() {
        let catalog = ChallengeCatalog::builtin();
        let mut rng = Mcg128Xsl64::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            seen.insert(catalog.pick(&mut rng).description.clone());
        }
        assert_eq!(seen.len(), catalog.len());
    }

    proptest! {
        #[test]
        fn index_always_in_range(sample in 0.0f64..1.0, len in 1usize..10_000) {
            let idx = challenge_index(sample, len);
            prop_assert!(idx < len);
        }
    }
}
