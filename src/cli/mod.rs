//! CLI module - Command-line interface for Kitsudex
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

pub use commands::{cmd_create_admin, cmd_import, cmd_init, cmd_list_anime, cmd_search_remote};

/// Kitsudex - Anime catalog and community server
/// Ratings, comments and watchlists over a catalog imported from Kitsu
#[derive(Parser)]
#[command(name = "kitsudex")]
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

    /// Write a default config.toml in the current directory
    Init,

    /// List the local catalog
    #[command(alias = "ls", alias = "l")]
    List {
        /// Only entries with this subtype (TV, movie, OVA, ...)
        #[arg(long)]
        subtype: Option<String>,

        /// Only entries with this status (current, finished, ...)
        #[arg(long)]
        status: Option<String>,

        /// oldest, newest, lowest or highest
        #[arg(long)]
        sort: Option<String>,

        /// Case-insensitive title fragment
        #[arg(long)]
        title: Option<String>,
    },

    /// Search Kitsu without importing
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Import the first Kitsu match into the catalog
    Import {
        /// Title to search for
        #[arg(required = true)]
        title: Vec<String>,
    },

    /// Create an administrator account
    CreateAdmin {
        username: String,

        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "Site")]
        firstname: String,

        #[arg(long, default_value = "Admin")]
        lastname: String,
    },
}
