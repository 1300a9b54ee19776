//! # dnsrank-cli
//!
//! Command-line front end for the dnsrank resolver benchmark.
//!
//! ## Features
//!
//! - **Directory input**: dnscrypt-proxy's `public-resolvers.md` format
//! - **Capability filters**: `--dnscrypt` and `--doh`, AND-composed
//! - **Bounded probing**: concurrent timed lookups per resolver
//! - **Multiple output formats**: human-readable summary or JSON

pub mod cli;
pub mod output;

pub use cli::run;
