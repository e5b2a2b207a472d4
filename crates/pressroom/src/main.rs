// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pressroom - turns content from external sources into operator-approved
//! social media posts.
//!
//! This is the binary entry point.

mod serve;
mod sources;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pressroom_config::PressroomConfig;

/// Pressroom - publication lifecycle orchestrator.
#[derive(Parser, Debug)]
#[command(name = "pressroom", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the sources, producer, suggestion and command loops.
    Serve,
    /// Show the approval queue and controller state.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// List source schedules and quotas.
    Sources {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> PressroomConfig {
    let loaded = match path {
        Some(path) => pressroom_config::load_and_validate_path(path),
        None => pressroom_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            pressroom_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("pressroom: use --help for available commands");
        return;
    };
    let config = load_config(cli.config.as_ref());

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Status { json, plain } => status::run_status(&config, json, plain).await,
        Commands::Sources { json, plain } => sources::run_sources(&config, json, plain).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_flags_parse() {
        let cli = Cli::parse_from(["pressroom", "status", "--json"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Status {
                json: true,
                plain: false
            })
        ));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["pressroom", "sources", "--config", "/tmp/p.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/p.toml")));
    }
}
