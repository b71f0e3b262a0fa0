//! CLI parse: clap types for docnav. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docnav - document manifests and deep-link resolution
#[derive(Parser, Debug)]
#[command(name = "docnav")]
#[command(version)]
#[command(about = "Build navigable manifests of document trees and resolve deep links")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (replaces ./docnav.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk a directory and write its manifest
    Build {
        /// Root directory of the document tree
        #[arg(long)]
        root: PathBuf,

        /// Manifest output file
        #[arg(long)]
        out: PathBuf,

        /// Document extensions, comma separated (e.g. md,txt)
        #[arg(long, value_delimiter = ',')]
        ext: Option<Vec<String>>,

        /// Name or relative path to skip (repeatable)
        #[arg(long)]
        ignore: Vec<String>,

        /// Record document modification times
        #[arg(long)]
        include_mtime: bool,

        /// Drop directories without documents
        #[arg(long)]
        prune_empty_dirs: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show a manifest's summary and tree
    Inspect {
        /// Manifest file
        manifest: PathBuf,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check a manifest's schema version and structure
    Validate {
        /// Manifest file
        manifest: PathBuf,
    },
    /// Resolve a deep link and print the document
    Resolve {
        /// Manifest file
        manifest: PathBuf,

        /// Directory the documents are read from
        #[arg(long)]
        root: PathBuf,

        /// Deep-link address, e.g. /guide/intro.md
        address: String,
    },
}
