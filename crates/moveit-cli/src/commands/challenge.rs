use clap::Subcommand;
use moveit_core::{ChallengeCategory, Config};

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// List the challenges in the active catalog as JSON
    List {
        /// Only show one category (body, eye)
        #[arg(long)]
        category: Option<String>,
    },
}

fn parse_category(raw: &str) -> Result<ChallengeCategory, Box<dyn std::error::Error>> {
    match raw.to_ascii_lowercase().as_str() {
        "body" => Ok(ChallengeCategory::Body),
        "eye" => Ok(ChallengeCategory::Eye),
        other => Err(format!("unknown category: {other} (expected body or eye)").into()),
    }
}

pub fn run(action: ChallengeAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let catalog = config.catalog()?;

    match action {
        ChallengeAction::List { category } => {
            let filter = category.as_deref().map(parse_category).transpose()?;
            let listed: Vec<_> = catalog
                .iter()
                .filter(|c| filter.map_or(true, |cat| c.category == cat))
                .collect();
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
    }
    Ok(())
}
