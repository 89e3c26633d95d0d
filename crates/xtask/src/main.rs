//! Development tasks for the enemy behavior engine
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{Simulate, Validate};

/// Development tasks for the enemy behavior engine
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the enemy behavior engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a content directory headless against a scripted opponent
    Simulate(Simulate),

    /// Load and validate every file in a content directory
    Validate(Validate),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for ENEMY_DATA_DIR and RUST_LOG)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate(cmd) => cmd.execute(),
        Command::Validate(cmd) => cmd.execute(),
    }
}
