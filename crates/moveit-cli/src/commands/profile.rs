//! Player progress commands.
//!
//! Reads and clears the persisted level, experience and completed count
//! without starting a session.

use clap::Subcommand;
use moveit_core::leveling::experience_to_next_level;
use moveit_core::{Database, ProgressStore};
use serde::Serialize;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Print current progress as JSON
    Show,
    /// Forget all progress
    Reset,
}

#[derive(Serialize)]
struct ProfileView {
    level: u32,
    current_experience: u64,
    experience_to_next_level: u64,
    challenges_completed: u64,
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ProfileAction::Show => {
            let progress = db.load()?;
            let view = ProfileView {
                level: progress.level,
                current_experience: progress.current_experience,
                experience_to_next_level: experience_to_next_level(progress.level),
                challenges_completed: progress.challenges_completed,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        ProfileAction::Reset => {
            db.clear_progress()?;
            println!("progress reset");
        }
    }
    Ok(())
}
