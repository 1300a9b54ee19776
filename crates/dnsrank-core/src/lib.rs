//! Core pipeline stages for the dnsrank resolver benchmark.
//!
//! This crate holds everything that does not touch the network:
//!
//! - **Types**: [`ResolverEntry`], [`ResolverStats`], and [`ProbeOutcome`]
//! - **Directory parsing**: the `public-resolvers.md` format ([`directory`])
//! - **Capability filtering**: metadata keyword matching ([`filter`])
//! - **Ranking**: qualified-only, latency-ascending reports ([`rank`])
//!
//! # Example
//!
//! ```rust
//! use dnsrank_core::{directory, filter, filter::Capability};
//!
//! let text = "## Example (DNSCrypt)\nSupports DNSCrypt\nsdns://AAA\n";
//! let entries = directory::parse(text);
//! let candidates = filter::retain_capable(entries, &[Capability::DnsCrypt]);
//! assert_eq!(candidates.len(), 1);
//! ```

mod error;
pub mod directory;
pub mod filter;
pub mod rank;
pub mod types;

pub use error::{RankError, Result};
pub use types::{ProbeOutcome, ResolverEntry, ResolverStats};
