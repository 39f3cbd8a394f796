//! Conveyor CLI tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "conveyor")]
#[command(about = "Preview Conveyor pipeline-action programs", long_about = None)]
struct Cli {
    /// Stack the program is deployed to
    #[arg(long, env = "CONVEYOR_STACK", default_value = "dev")]
    stack: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known action kinds
    Kinds {
        /// Show a single kind
        #[arg(long)]
        kind: Option<String>,
    },
    /// Validate a program file
    Validate {
        /// Path to the program file
        #[arg(default_value = "conveyor.kdl")]
        path: PathBuf,
    },
    /// Show what applying a program would change
    Preview {
        /// Path to the program file
        #[arg(default_value = "conveyor.kdl")]
        path: PathBuf,
        /// Prior state to diff against
        #[arg(long, env = "CONVEYOR_STATE")]
        state: Option<PathBuf>,
        /// Write the resulting state back to --state
        #[arg(long, requires = "state")]
        save: bool,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Kinds { kind } => {
            commands::kinds::list(kind.as_deref())?;
        }
        Commands::Validate { path } => {
            commands::validate(&path, &cli.stack).await?;
        }
        Commands::Preview {
            path,
            state,
            save,
            json,
        } => {
            commands::preview::preview(&path, &cli.stack, state.as_deref(), save, json).await?;
        }
    }

    Ok(())
}
