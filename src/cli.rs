//! Command-line interface for rps_arena.

use clap::{Parser, Subcommand};

/// RPS Arena - rock-paper-scissors server and terminal client
#[derive(Parser, Debug)]
#[command(name = "rps_arena")]
#[command(about = "Rock-paper-scissors game server and client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the REST API server
    Serve {
        /// Host to bind to (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the database file (overrides DATABASE_URL)
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Play rock-paper-scissors in the terminal
    Play {
        /// Where to persist the local game snapshot
        #[arg(long, default_value = "rps_state.json")]
        data_file: std::path::PathBuf,

        /// Backend URL for accounts, score saves, and leaderboards
        #[arg(long, default_value = "http://localhost:3000")]
        server_url: String,
    },
}
