//! Ranking of probe outcomes into the final report.

use std::time::Duration;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::types::{ProbeOutcome, ResolverEntry};

/// Default report length.
pub const DEFAULT_TOP_K: usize = 10;

/// One line of the ranked report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedResolver {
    /// Resolver display label
    pub name: String,
    /// Fastest trial
    #[serde(serialize_with = "millis")]
    pub min: Duration,
    /// Slowest trial
    #[serde(serialize_with = "millis")]
    pub max: Duration,
    /// Mean latency over all trials
    #[serde(serialize_with = "millis")]
    pub average: Duration,
}

/// Durations render as fractional milliseconds in JSON output.
fn millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Rank qualified resolvers ascending by total elapsed time.
///
/// Equal totals keep their directory order (the sort is stable), so the
/// report is reproducible for identical measurements. Disqualified
/// outcomes contribute nothing. At most `top_k` entries are returned;
/// fewer if fewer qualify.
#[must_use]
pub fn rank(
    outcomes: Vec<(ResolverEntry, ProbeOutcome)>,
    top_k: usize,
) -> Vec<RankedResolver> {
    let mut qualified: Vec<_> = outcomes
        .into_iter()
        .filter_map(|(entry, outcome)| match outcome {
            ProbeOutcome::Qualified(stats) => Some((entry, stats)),
            ProbeOutcome::Disqualified { reason } => {
                debug!(name = %entry.name, %reason, "resolver disqualified");
                None
            }
        })
        .collect();

    qualified.sort_by_key(|(_, stats)| stats.total);

    qualified
        .into_iter()
        .take(top_k)
        .map(|(entry, stats)| RankedResolver {
            name: entry.name,
            min: stats.min,
            max: stats.max,
            average: stats.average(),
        })
        .collect()
}
