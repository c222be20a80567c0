//! optstore
//!
//! Resolves options from defaults, config files, environment variables and
//! command-line overrides, then prints, queries or exports them.

use anyhow::{Context, Result};
use clap::Parser;
use optstore::cli::{Cli, Command};
use optstore::config::watcher::{WatcherConfig, start_config_watcher};
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Filter: --verbose > RUST_LOG env > default "info".
///
/// The file watcher's own crates stay at WARN so debug output shows store
/// events rather than raw notify traffic.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug,notify=warn,notify_debouncer_mini=warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(log_filter(cli.verbose))
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(log_filter(cli.verbose))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(log_filter(cli.verbose))
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let loader = cli.loader();
    let store = Arc::new(loader.load().context("Failed to load options")?);

    match cli.command {
        None | Some(Command::Dump) => {
            print!("{}", store.dump_as_string());
        }
        Some(Command::Get(ref args)) => {
            println!("{}", args.render(&store));
        }
        Some(Command::Export(ref args)) => {
            let format = args.document_format();
            match args.output {
                Some(ref path) => {
                    store
                        .save_as(path, Some(format))
                        .with_context(|| format!("Failed to export to {}", path.display()))?;
                }
                None => {
                    let text = store.export_as(format)?;
                    std::io::stdout().write_all(text.as_bytes())?;
                }
            }
        }
        Some(Command::Watch) => {
            for (tier, path) in loader.candidate_files() {
                info!(%tier, path = %path.display(), "Config file in use");
            }
            let mut handle = start_config_watcher(
                loader.watch_targets(),
                WatcherConfig::default(),
                Arc::clone(&store),
                loader.clone(),
            )?;
            print!("{}", store.dump_as_string());

            loop {
                tokio::select! {
                    event = handle.wait_for_change() => {
                        let Some(event) = event else { break };
                        info!(?event, "Options changed");
                        print!("{}", store.dump_as_string());
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Interrupted, stopping watcher");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
