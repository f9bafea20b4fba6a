//! CLI module - operator commands for Watchlist
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Watchlist - a personal movie list served over HTTP
#[derive(Parser)]
#[command(name = "watchlist")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default search locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "web")]
    Serve,

    /// Create the database tables
    Initdb {
        /// Drop existing tables before creating them
        #[arg(long)]
        drop: bool,
    },

    /// Fill the database with a demo user and movies
    Forge,

    /// Create the administrator account, or update its credentials
    Admin {
        /// Login name (prompted when omitted)
        #[arg(long)]
        username: Option<String>,
        /// Password (prompted twice when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
