//! Command-line interface for noughts.

use clap::{Parser, Subcommand};

/// Noughts - multiplayer tic-tac-toe room server core
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Tic-tac-toe game rooms over a JSON-lines stdio channel", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve game rooms over stdin/stdout (one JSON request per line)
    Serve {
        /// Path to the TOML configuration file
        #[arg(short, long, default_value = "noughts.toml")]
        config: std::path::PathBuf,
    },

    /// List recently completed games from the history database
    History {
        /// Path to the TOML configuration file
        #[arg(short, long, default_value = "noughts.toml")]
        config: std::path::PathBuf,

        /// Maximum number of records to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}
