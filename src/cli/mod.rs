//! CLI module - Command-line interface for mediashelf
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// mediashelf - Personal tracker for movies, anime, series and cartoons
#[derive(Parser)]
#[command(name = "mediashelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage the shared genre list
    Genre {
        #[command(subcommand)]
        command: GenreCommands,
    },

    /// Show how many titles of each kind a user tracks
    Summary {
        /// Username
        username: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account
    #[command(alias = "add")]
    Create {
        /// Username
        username: String,
        /// Password; read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
        /// Optional email address
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete an account together with its library
    #[command(alias = "rm")]
    Delete {
        /// Username
        username: String,
    },
}

#[derive(Subcommand)]
pub enum GenreCommands {
    /// Add a genre
    Add {
        /// Genre name
        name: String,
    },
    /// List all genres
    #[command(alias = "ls")]
    List,
}

pub use commands::*;
