//! docnav CLI Binary
//!
//! Command-line interface for building and browsing document manifests.

use clap::Parser;
use docnav::cli::{map_error, Cli, RunContext};
use docnav::logging::{init_logging, LoggingConfig};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let workspace_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let context = match RunContext::new(workspace_root, cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    let logging_config = build_logging_config(&cli, &context.config().logging);
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("docnav starting");

    match context.execute(&cli.command) {
        Ok(output) => {
            for line in &output.stderr {
                eprintln!("{}", line);
            }
            if output.stdout.ends_with('\n') {
                print!("{}", output.stdout);
            } else {
                println!("{}", output.stdout);
            }
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Merge CLI logging flags over the configured logging section.
fn build_logging_config(cli: &Cli, configured: &LoggingConfig) -> LoggingConfig {
    let mut config = configured.clone();
    if cli.verbose || cli.log_level.is_some() {
        config.enabled = true;
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    } else if cli.verbose && !configured.enabled {
        config.level = "debug".to_string();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }
    config
}
