mod commands;
mod report;
mod summary;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "incdriver")]
#[command(about = "Prepare, run and post-process incremental driver element tests")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every load path with its required parameters
    Paths,
    /// Write the driver input files described by a TOML test file
    Write {
        /// Path to the test description
        config: PathBuf,
    },
    /// Write the input files, run the driver and summarize the output
    Run {
        /// Path to the test description
        config: PathBuf,
        /// Remove old .inp, .bat and .txt files from the folder first
        #[arg(long)]
        clean: bool,
    },
    /// Summarize an existing output table
    Invariants {
        /// Path to the driver output table
        output: PathBuf,
        /// Keep the driver's tension positive convention for p and ev
        #[arg(long)]
        tension_positive: bool,
        /// Export the 2x2 chart series as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "incdriver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Paths => Ok(commands::paths()),
        Commands::Write { config } => commands::write(&config),
        Commands::Run { config, clean } => commands::run(&config, clean),
        Commands::Invariants {
            output,
            tension_positive,
            json,
        } => commands::invariants(&output, tension_positive, json.as_deref()),
    };

    match result {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
