//! quizline CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quizline", version, about = "Timed quizzes in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz
    Take {
        /// Quiz id (file name under <data_dir>/quizzes without .toml)
        #[arg(long)]
        quiz: String,

        /// Student id the result is stored under
        #[arg(long)]
        student: String,

        /// Seed for the question shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Review a stored result question by question
    Review {
        #[arg(long)]
        quiz: String,

        #[arg(long)]
        student: String,

        /// Output format: table, markdown, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show statistics over all stored results of a quiz
    Stats {
        #[arg(long)]
        quiz: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz_file: PathBuf,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            quiz,
            student,
            seed,
            config,
        } => commands::take::execute(quiz, student, seed, config).await,
        Commands::Review {
            quiz,
            student,
            format,
            config,
        } => commands::review::execute(quiz, student, format, config).await,
        Commands::Stats {
            quiz,
            format,
            config,
        } => commands::stats::execute(quiz, format, config).await,
        Commands::Validate { quiz_file } => commands::validate::execute(quiz_file),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
