//! Interactive session.
//!
//! Reads one command per line from stdin and prints session events as
//! they happen. The session itself runs on its own task; this module only
//! translates lines into [`Command`]s and events into output.

use clap::Args;
use moveit_core::notify::{AudioCue, Silent, TerminalBell, TerminalNotifier};
use moveit_core::{Command, Config, Database, Event, Session, Sinks, Snapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};

const HELP: &str = "commands: start | abandon | complete | forfeit | dismiss | status | help | quit";

#[derive(Args)]
pub struct RunArgs {
    /// Override the cycle length in seconds
    #[arg(long)]
    pub duration: Option<u64>,
    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// One parsed line of input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Start,
    Abandon,
    Complete,
    Forfeit,
    Dismiss,
    Status,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim().to_ascii_lowercase().as_str() {
        "start" | "s" => Some(Input::Start),
        "abandon" | "a" => Some(Input::Abandon),
        "complete" | "done" | "c" => Some(Input::Complete),
        "forfeit" | "f" => Some(Input::Forfeit),
        "dismiss" | "d" => Some(Input::Dismiss),
        "status" | "" => Some(Input::Status),
        "help" | "h" | "?" => Some(Input::Help),
        "quit" | "exit" | "q" => Some(Input::Quit),
        _ => None,
    }
}

fn render_event(event: &Event, json: bool) -> Option<String> {
    if json {
        return serde_json::to_string(event).ok();
    }
    match event {
        // A line per second is too chatty for humans; show whole minutes.
        Event::CountdownTicked { remaining_secs, .. } if remaining_secs % 60 != 0 => None,
        other => Some(other.describe()),
    }
}

fn render_snapshot(snapshot: &Snapshot, json: bool) -> String {
    if json {
        return serde_json::to_string(snapshot).unwrap_or_default();
    }
    let leveling = &snapshot.leveling;
    let countdown = &snapshot.countdown;
    let mut out = format!(
        "Level {} | {}/{} xp ({}%) | {} completed | {:02}:{:02} {:?}",
        leveling.level,
        leveling.current_experience,
        leveling.experience_to_next_level,
        leveling.percent_to_next_level,
        leveling.challenges_completed,
        countdown.minutes,
        countdown.seconds,
        countdown.phase,
    );
    if let Some(challenge) = &leveling.active_challenge {
        out.push_str(&format!(
            "\nActive challenge [{}] earn {} xp: {}",
            challenge.category, challenge.amount, challenge.description
        ));
    }
    if leveling.level_up_pending {
        out.push_str("\nYou leveled up! (dismiss to close)");
    }
    out
}

fn build_session(args: &RunArgs) -> Result<Session, Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(duration) = args.duration {
        config.apply("countdown.duration_secs", &duration.to_string())?;
    }
    let catalog = config.catalog()?;
    let db = Database::open()?;

    let audio: Box<dyn AudioCue> = if config.notifications.sound {
        Box::new(TerminalBell::stderr())
    } else {
        Box::new(Silent)
    };
    let sinks = Sinks {
        notifier: Box::new(TerminalNotifier::stderr(config.notifications.enabled)),
        audio,
    };

    Ok(Session::from_config(&config, catalog, Box::new(db), sinks))
}

async fn request_snapshot(commands: &mpsc::Sender<Command>) -> Option<Snapshot> {
    let (tx, rx) = oneshot::channel();
    commands.send(Command::Snapshot(tx)).await.ok()?;
    rx.await.ok()
}

async fn drive(session: Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (command_tx, command_rx) = mpsc::channel(16);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let session_task = tokio::spawn(session.run(command_rx, event_tx));
    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Some(line) = render_event(&event, json) {
                println!("{line}");
            }
        }
    });

    if !json {
        println!("{HELP}");
    }
    if let Some(snapshot) = request_snapshot(&command_tx).await {
        println!("{}", render_snapshot(&snapshot, json));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_input(&line) {
            Some(Input::Start) => Command::StartCycle,
            Some(Input::Abandon) => Command::AbandonCycle,
            Some(Input::Complete) => Command::CompleteChallenge,
            Some(Input::Forfeit) => Command::ForfeitChallenge,
            Some(Input::Dismiss) => Command::DismissLevelUp,
            Some(Input::Status) => {
                if let Some(snapshot) = request_snapshot(&command_tx).await {
                    println!("{}", render_snapshot(&snapshot, json));
                }
                continue;
            }
            Some(Input::Help) => {
                println!("{HELP}");
                continue;
            }
            Some(Input::Quit) => break,
            None => {
                eprintln!("unknown command: {}", line.trim());
                continue;
            }
        };
        if command_tx.send(command).await.is_err() {
            break;
        }
    }

    // Closing the channel ends the session loop.
    drop(command_tx);
    let session = session_task.await?;
    printer.await?;
    tracing::debug!(
        level = session.challenges().level(),
        completed = session.challenges().challenges_completed(),
        "Session closed"
    );
    Ok(())
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let session = build_session(&args)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(session, args.json))
}
