mod input;
mod render;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use liftvox_events::EventBusRef;
use liftvox_session::{SessionConfig, SessionController, SessionServices};
use liftvox_speech::{
    RecognitionErrorKind, RecognitionEvent, ScriptedEngine, ScriptedEngineProbe, StaticPermission,
};
use liftvox_storage::{Database, StorageError};
use liftvox_workout::{Exercise, SessionRepository, Workout, WorkoutRepository};
use tracing_subscriber::EnvFilter;

use input::{parse_exercise_arg, parse_line, ConsoleCommand, HELP};
use render::TerminalBus;

#[derive(Parser, Debug)]
#[command(name = "liftvox")]
#[command(about = "Run a workout session, recording sets by typed speech or by hand")]
struct Args {
    /// SQLite database file (defaults to the user data directory)
    #[arg(long, env = "LIFTVOX_DB")]
    db: Option<PathBuf>,

    /// Who is training
    #[arg(short, long, env = "LIFTVOX_USER", default_value = "me")]
    user: String,

    /// Workout to run; created from --exercise when given
    #[arg(short, long, default_value = "default")]
    workout: String,

    /// Session config JSON (delays, retry cap, vocabulary)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exercise as name:sets, repeatable; saves the workout
    #[arg(short, long = "exercise", value_parser = parse_exercise_arg)]
    exercises: Vec<(String, u32)>,
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .context("no local data directory on this platform")?
        .join("liftvox");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(dir.join("liftvox.db"))
}

fn load_workout(db: &Database, args: &Args) -> anyhow::Result<Workout> {
    if !args.exercises.is_empty() {
        let exercises = args
            .exercises
            .iter()
            .map(|(name, sets)| Exercise::new(name.as_str(), *sets))
            .collect::<Result<Vec<_>, _>>()?;
        let workout = Workout::new(args.workout.as_str(), exercises, args.user.as_str())?;
        db.save_workout(&workout)?;
        tracing::info!(workout = %workout.name, "Workout saved");
        return Ok(workout);
    }

    match db.workout(&args.user, &args.workout) {
        Ok(workout) => Ok(workout),
        Err(StorageError::NotFound(_)) => {
            let known: Vec<String> = db
                .workouts_for(&args.user)?
                .into_iter()
                .map(|w| w.name)
                .collect();
            if known.is_empty() {
                bail!(
                    "no workout '{}' for {}; define one with --exercise name:sets",
                    args.workout,
                    args.user
                );
            }
            bail!(
                "no workout '{}' for {}; saved workouts: {}",
                args.workout,
                args.user,
                known.join(", ")
            );
        }
        Err(e) => Err(e.into()),
    }
}

fn print_history(db: &Database, user: &str) {
    match db.sessions_for(user) {
        Ok(sessions) if sessions.is_empty() => println!("no saved sessions"),
        Ok(sessions) => {
            for session in sessions {
                println!(
                    "{}  {}  {} sets  {}s",
                    session.started_at.format("%Y-%m-%d %H:%M"),
                    session.workout_name,
                    session.total_sets(),
                    session.duration_ms / 1000
                );
            }
        }
        Err(e) => println!("! failed to load history: {e}"),
    }
}

/// Feeds a typed line to the recognizer as if it had been spoken.
fn speak(probe: &ScriptedEngineProbe, event: RecognitionEvent) {
    if !probe.deliver(event) {
        println!("(not listening; use :listen or :voice)");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,liftvox=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!("Starting liftvox console");

    let config = match &args.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };
    let db_path = match &args.db {
        Some(path) => path.clone(),
        None => default_db_path()?,
    };
    let db = Arc::new(
        Database::open(&db_path)
            .with_context(|| format!("failed to open database {}", db_path.display()))?,
    );
    let workout = load_workout(&db, &args)?;

    let engine = ScriptedEngine::new();
    let probe = engine.probe();
    let bus = Arc::new(TerminalBus::new());
    let finished = bus.finished_flag();

    let controller = SessionController::new(
        workout,
        args.user.as_str(),
        config,
        SessionServices {
            engine: Box::new(engine),
            permission: Arc::new(StaticPermission::granted()),
            repository: Arc::clone(&db),
            bus: bus as EventBusRef,
        },
    );
    let handle = controller.handle();
    let session = tokio::spawn(controller.run());

    println!("{HELP}");
    let user = args.user.clone();
    let reader = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if finished.load(Ordering::SeqCst) {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok(ConsoleCommand::Action(action)) => {
                    if !handle.send(action) {
                        break;
                    }
                }
                Ok(ConsoleCommand::Speak(text)) => speak(&probe, RecognitionEvent::Result(text)),
                Ok(ConsoleCommand::Silence) => {
                    speak(&probe, RecognitionEvent::Error(RecognitionErrorKind::NoMatch))
                }
                Ok(ConsoleCommand::History) => print_history(&db, &user),
                Ok(ConsoleCommand::Help) => println!("{HELP}"),
                Ok(ConsoleCommand::Quit) => break,
                Err(message) => println!("{message}"),
            }
        }
        handle.shutdown();
    });

    reader.await.context("input thread panicked")?;
    session.await.context("session task panicked")?;
    tracing::info!("Bye");
    Ok(())
}
