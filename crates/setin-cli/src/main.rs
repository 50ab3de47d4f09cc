#![forbid(unsafe_code)]

//! Setin CLI
//!
//! Inspect path expressions and expansion configuration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use setin_cli::{config_command, explain_command, parse_command};
use std::path::PathBuf;

/// Setin Command-Line Interface
#[derive(Parser, Debug)]
#[command(name = "setin")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split expressions into their independent sub-expressions (JSON)
    Parse {
        /// Path expressions
        #[arg(required = true)]
        exprs: Vec<String>,
    },
    /// Show how a path is interpreted, step by step
    Explain {
        /// Path expression
        path: String,
    },
    /// Print the effective expansion configuration (TOML)
    Config {
        /// Configuration file path
        #[arg(short, long, env = "SETIN_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(command = ?args.command, "running command");

    let output = match args.command {
        Command::Parse { exprs } => parse_command(&exprs)?,
        Command::Explain { path } => explain_command(&path)?,
        Command::Config { config } => config_command(config.as_deref())?,
    };
    println!("{output}");

    Ok(())
}
