//! # move.it Core Library
//!
//! Business logic for move.it, a focus-cycle companion that hands out a
//! small exercise challenge at the end of every countdown and levels the
//! player up as challenges are completed. Front ends (the CLI binary, or
//! anything else) are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Countdown**: a one-shot cycle timer whose single pending tick is an
//!   explicit, cancellable deadline
//! - **Leveling**: experience, levels and the active challenge, persisted
//!   after every change
//! - **Session**: owns both state machines and runs them on one task
//! - **Storage**: SQLite key-value progress store and TOML configuration
//!
//! ## Key Components
//!
//! - [`Countdown`]: cycle state machine
//! - [`ChallengeEngine`]: leveling state machine
//! - [`Session`]: composition and event loop
//! - [`Database`]: progress persistence
//! - [`Config`]: application configuration management

pub mod challenge;
pub mod countdown;
pub mod error;
pub mod events;
pub mod leveling;
pub mod notify;
pub mod session;
pub mod storage;

pub use challenge::{Challenge, ChallengeCatalog, ChallengeCategory};
pub use countdown::{Countdown, CountdownPhase, CycleListener};
pub use error::{CatalogError, ConfigError, CoreError, DatabaseError, NotifyError, ValidationError};
pub use events::Event;
pub use leveling::{ChallengeEngine, LevelingPhase, Sinks};
pub use session::{Command, Session, Snapshot};
pub use storage::{Config, Database, MemoryStore, Progress, ProgressStore};
