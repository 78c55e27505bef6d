use clap::{Parser, Subcommand};
use formcoach_core::ExerciseType;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "formcoach", version, about = "FormCoach CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered exercises
    Exercises,
    /// Count repetitions in a recorded landmark stream (one JSON frame per line)
    Analyze {
        /// Exercise id (e.g. "squat", "bicep_curl")
        exercise: ExerciseType,
        /// JSONL file of frames
        file: PathBuf,
    },
    /// Scripted or live coaching sessions
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Finished workouts
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Body measurements used for calorie estimates
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FORMCOACH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Exercises => commands::exercises::run(),
        Commands::Analyze { exercise, file } => commands::analyze::run(exercise, &file),
        Commands::Session { action } => commands::session::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
