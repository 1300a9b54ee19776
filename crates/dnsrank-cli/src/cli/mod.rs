//! CLI argument parsing and the benchmark pipeline.

pub mod args;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use tracing::debug;

use dnsrank_core::{directory, filter, rank, ProbeOutcome};
use dnsrank_probe::{ProbeConfig, Prober};

use crate::output;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // The directory is fully read and parsed before any network
    // activity; a missing or unreadable file is the one fatal error.
    let entries = directory::load(&cli.file)
        .with_context(|| format!("cannot read resolver directory {}", cli.file.display()))?;
    debug!(count = entries.len(), file = %cli.file.display(), "loaded directory");

    let candidates = filter::retain_capable(entries, &cli.capabilities());
    let candidate_count = candidates.len();

    let prober = Arc::new(Prober::new(ProbeConfig {
        trials: cli.trials,
        timeout: Duration::from_secs(cli.timeout),
        domain: cli.domain.clone(),
        concurrency: cli.concurrency,
    }));
    let outcomes = prober.probe_all(candidates).await;

    let qualified_count = outcomes
        .iter()
        .filter(|(_, outcome)| matches!(outcome, ProbeOutcome::Qualified(_)))
        .count();
    let report = rank::rank(outcomes, cli.top);

    output::render(&report, candidate_count, qualified_count, cli.output)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
