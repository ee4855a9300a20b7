//! issuehook entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: load `.issuehook/config.toml` (or `--config`).
//! 2. **Wire observability**: install the `tracing` subscriber, optionally
//!    exporting spans over OTLP.
//! 3. **Construct infrastructure**: build the [`host::JobRegistry`], the run
//!    queue, and the token verifier, and inject them into the listener.
//! 4. **Serve** until Ctrl-C, or until an unrecoverable fault stops the
//!    listener, in which case the process exits non-zero.

mod config;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use host::{JobRegistry, QueueConsumer};
use listener::{AppState, SharedSecretVerifier};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{Config, DEFAULT_CONFIG_PATH};

/// Accepts issue-tracker build triggers and queues job runs.
#[derive(Debug, Parser)]
#[command(name = "issuehook", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the bind address from the configuration file.
    #[arg(long, value_name = "ADDR")]
    bind: Option<std::net::SocketAddr>,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let _telemetry = telemetry::init(&config.telemetry, cli.verbose)?;
    run(cli, config).await
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let token = config.auth.resolve_token(|var| std::env::var(var).ok())?;
    let verifier = SharedSecretVerifier::new(token).context("trigger token must not be empty")?;

    let registry = JobRegistry::from_config(config.jobs).context("invalid job configuration")?;
    if registry.is_empty() {
        warn!("No jobs configured; every trigger will be answered with 404");
    }

    let (queue, consumer) = host::channel();
    let drain = tokio::spawn(drain_queue(consumer));

    let state = AppState::new(Arc::new(registry), Arc::new(queue), Arc::new(verifier));
    let bind = cli.bind.unwrap_or(config.server.bind);
    let socket = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    listener::serve(socket, state.clone(), shutdown_signal())
        .await
        .context("trigger listener failed")?;

    drain.abort();
    match state.fault().current() {
        Some(fault) => Err(anyhow!("stopped after unrecoverable fault: {fault}")),
        None => Ok(()),
    }
}

/// Hands queued runs to the executor. Runs are logged here; a runner that
/// actually executes them subscribes in its place.
async fn drain_queue(mut consumer: QueueConsumer) {
    while let Some(run) = consumer.next().await {
        let parameters = run
            .parameters
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "(none)".to_owned());
        info!(
            execution_id = %run.id,
            job = %run.job,
            not_before = %run.not_before,
            context_records = run.context.len(),
            parameters = %parameters,
            "Run handed to executor"
        );
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for Ctrl-C; running until a fault occurs");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["issuehook"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(cli.bind.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn cli_flags() {
        let cli =
            Cli::try_parse_from(["issuehook", "-c", "hook.toml", "--bind", "0.0.0.0:1234", "-vv"])
                .unwrap();
        assert_eq!(cli.config, PathBuf::from("hook.toml"));
        assert_eq!(cli.bind.map(|a| a.port()), Some(1234));
        assert_eq!(cli.verbose, 2);
    }
}
