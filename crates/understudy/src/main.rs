// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Understudy - a persona-driven dialogue generator.
//!
//! This is the binary entry point: an interactive chat REPL, the corpus
//! indexing command, and configuration inspection.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chat;
mod index_cmd;
mod setup;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use understudy_config::UnderstudyConfig;

/// Understudy - a persona-driven dialogue generator.
#[derive(Parser, Debug)]
#[command(name = "understudy", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session with the active persona.
    Chat,
    /// Embed the dialogue corpus and seed the vector index.
    Index,
    /// Inspect Understudy configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the merged configuration as TOML.
    Show,
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured engine log level
/// applies to understudy crates and `warn` to everything else.
fn init_tracing(config: &UnderstudyConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("understudy={},warn", config.engine.log_level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup; config errors are the
    // only ones that abort before serving.
    let config = match understudy_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            understudy_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    let result = match cli.command {
        Some(Commands::Chat) => chat::run_chat(config).await,
        Some(Commands::Index) => index_cmd::run_index(config).await,
        Some(Commands::Config { command: ConfigCommands::Show }) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    println!("{rendered}");
                    Ok(())
                }
                Err(e) => Err(understudy_core::UnderstudyError::Internal(format!(
                    "failed to render config: {e}"
                ))),
            }
        }
        None => {
            println!("understudy: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed).
        let config = understudy_config::load_and_validate()
            .expect("default config should be valid");
        assert_eq!(config.persona.active, "nick");
        assert_eq!(config.backend.active, "gemini");
    }
}
