//! Command-line entry points for Reelhub.

mod commands;

use clap::{Parser, Subcommand};

/// Reelhub - streaming catalog and user content API
#[derive(Parser)]
#[command(name = "reelhub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Insert the demo catalog into an empty database
    Seed,

    /// Create an account from the command line
    CreateUser {
        /// Display name
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// user, moderator or admin
        #[arg(long, default_value = "user")]
        role: String,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
