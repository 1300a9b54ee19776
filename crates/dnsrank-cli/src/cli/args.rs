//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use dnsrank_core::filter::Capability;
use dnsrank_core::rank::DEFAULT_TOP_K;
use dnsrank_probe::prober::{DEFAULT_CONCURRENCY, DEFAULT_DOMAIN, DEFAULT_TRIALS};

use crate::output::OutputFormat;

/// Rank public DNS resolvers by measured query latency.
///
/// Reads a resolver directory (dnscrypt-proxy's public-resolvers.md
/// format), optionally filters by advertised transport capability, then
/// times repeated lookups against every candidate and prints the
/// fastest ones.
#[derive(Parser, Debug)]
#[command(name = "dnsrank")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Keep only resolvers whose notes mention DNSCrypt support
    #[arg(long)]
    pub dnscrypt: bool,

    /// Keep only resolvers whose notes mention DoH support
    #[arg(long)]
    pub doh: bool,

    /// Resolver directory file
    #[arg(short, long, default_value = "public-resolvers.md")]
    pub file: PathBuf,

    /// Timed lookups per resolver
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    pub trials: u32,

    /// Per-lookup timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Report length
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top: usize,

    /// Resolvers probed concurrently
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Domain resolved by every trial
    #[arg(long, default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Increase verbosity
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Requested capability filters, AND-composed.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut capabilities = Vec::new();
        if self.dnscrypt {
            capabilities.push(Capability::DnsCrypt);
        }
        if self.doh {
            capabilities.push(Capability::Doh);
        }
        capabilities
    }
}
