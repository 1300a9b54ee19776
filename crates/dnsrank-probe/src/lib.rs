//! Latency probing against public DNS resolvers.
//!
//! This crate owns everything that touches the network:
//!
//! - **Stamps**: `sdns://` server stamp decoding ([`stamp`])
//! - **Upstreams**: the transport seam and its concrete clients for
//!   plain DNS, DoH, and DoT ([`upstream`])
//! - **Probing**: timed trial loops and the bounded worker pool
//!   ([`prober`])
//!
//! Transport failures never escape this crate as errors; the prober
//! converts every failure into a
//! [`ProbeOutcome::Disqualified`](dnsrank_core::ProbeOutcome) that the
//! ranking stage simply drops.

mod error;
pub mod prober;
pub mod stamp;
pub mod upstream;

pub use error::{ProbeError, ProbeResult};
pub use prober::{ProbeConfig, Prober};
