//! CLI module - Command-line interface for Landsat Explorer
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

use crate::constants::auth::DEFAULT_USERNAME;

/// Landsat Explorer - pixel grids around a point from Landsat 8/9 scenes
#[derive(Parser)]
#[command(name = "landsat-explorer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// List catalog scenes covering a point
    #[command(alias = "s")]
    Scenes {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
        /// Days back from today to search
        #[arg(long)]
        days: Option<u32>,
        /// Maximum cloud cover in percent
        #[arg(long)]
        max_cloud: Option<f64>,
    },

    /// Fetch and store the 3x3 pixel grid around a point
    #[command(alias = "f")]
    Fetch {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
        scene_id: String,
        /// User that owns the recorded search
        #[arg(long, default_value = DEFAULT_USERNAME)]
        user: String,
    },

    /// Show recent searches
    #[command(alias = "h")]
    History {
        #[arg(long, default_value = DEFAULT_USERNAME)]
        user: String,
        /// Number of entries to show
        #[arg(long, default_value = "10")]
        limit: u64,
    },

    /// Show the stored pixels of a search
    #[command(alias = "p")]
    Pixels {
        search_id: i32,
        #[arg(long, default_value = DEFAULT_USERNAME)]
        user: String,
    },

    /// Manage API users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user with a fresh API key
    Add { username: String, email: String },

    /// Show (or regenerate) a user's API key
    ApiKey {
        username: String,
        #[arg(long)]
        regenerate: bool,
    },
}

pub use commands::*;
