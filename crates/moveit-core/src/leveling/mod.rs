mod engine;

pub use engine::{
    experience_to_next_level, selection_rng, ChallengeEngine, LevelingPhase, LevelingView, Sinks,
};
