//! Command-line interface definitions for discourse-docs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the discourse-docs application
#[derive(Parser)]
#[command(name = "discourse-docs")]
#[command(version)]
#[command(about = "Serve forum topics as a documentation collection", long_about = None)]
pub struct Cli {
    /// Site configuration file
    #[arg(short, long, global = true, default_value = "discourse-docs.toml")]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for discourse-docs
#[derive(Subcommand)]
pub enum Commands {
    /// Parse the index topic and report the URL map and warnings
    Parse {
        /// Print the whole snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what a request for a path would answer
    Resolve {
        /// Request path, with or without the URL prefix
        path: String,

        /// Render engage pages even when marked inactive
        #[arg(long)]
        preview: bool,
    },

    /// Print a sitemap of every mapped path
    Sitemap {
        /// Scheme and host prepended to every path
        #[arg(long)]
        host: String,

        /// XML sitemap with last-modified dates
        #[arg(long)]
        xml: bool,
    },
}
