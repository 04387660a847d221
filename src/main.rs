// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::needless_pass_by_value)]

//! Satellite CLI
//!
//! Streams hosts, packages and errata from a Satellite server as JSON lines

use clap::Parser;
use satellite_client::cli::{Cli, Runner};
use satellite_client::{LogLevel, SatelliteConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging (stderr, so stdout stays pure JSON)
    let level: tracing::Level = log_level(&cli).into();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, stopping listing");
            on_interrupt.cancel();
        }
    });

    let runner = Runner::new(cli, cancel);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// `--verbose` wins, then `trace_level` from the environment or the config file
fn log_level(cli: &Cli) -> LogLevel {
    if cli.verbose {
        return LogLevel::Debug;
    }

    let mut config = cli
        .config
        .as_deref()
        .and_then(|path| SatelliteConfig::from_file(path).ok())
        .unwrap_or_default();
    config.apply_env(|key| std::env::var(key).ok());
    config.trace_level.unwrap_or_default()
}
