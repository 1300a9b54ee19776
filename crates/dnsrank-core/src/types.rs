//! Data model shared across the pipeline stages.

use std::time::Duration;

/// One candidate resolver parsed from the directory.
///
/// Entries are immutable once their directory section closes; the parser
/// only materializes an entry whose [`stamp`](Self::stamp) is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverEntry {
    /// Display label, the section's header line verbatim
    pub name: String,
    /// `sdns://` server stamp, passed through to the transport untouched
    pub stamp: String,
    /// Free-text lines of the section, searched by capability filters
    pub metadata: Vec<String>,
}

impl ResolverEntry {
    /// Create an empty entry for the given header line.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stamp: String::new(),
            metadata: Vec::new(),
        }
    }
}

/// Latency aggregate over the configured trials for one resolver.
///
/// Owned by exactly one probe task; never shared across resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverStats {
    /// Fastest successful trial
    pub min: Duration,
    /// Slowest successful trial
    pub max: Duration,
    /// Sum over successful trials
    pub total: Duration,
    /// Trials attempted for this resolver
    pub trials: u32,
    /// Trials that completed successfully
    pub successes: u32,
}

impl ResolverStats {
    /// Fresh accumulator for a run of `trials` lookups.
    #[must_use]
    pub const fn new(trials: u32) -> Self {
        Self {
            min: Duration::MAX,
            max: Duration::ZERO,
            total: Duration::ZERO,
            trials,
            successes: 0,
        }
    }

    /// Fold one successful trial into the aggregate.
    pub fn record(&mut self, elapsed: Duration) {
        self.min = self.min.min(elapsed);
        self.max = self.max.max(elapsed);
        self.total += elapsed;
        self.successes += 1;
    }

    /// A resolver qualifies only if every attempted trial succeeded.
    #[must_use]
    pub const fn is_qualified(&self) -> bool {
        self.trials > 0 && self.successes == self.trials
    }

    /// Mean latency over the full trial count.
    #[must_use]
    pub fn average(&self) -> Duration {
        if self.trials == 0 {
            Duration::ZERO
        } else {
            self.total / self.trials
        }
    }
}

/// Terminal outcome of probing one resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// All trials succeeded; the resolver is a ranking candidate
    Qualified(ResolverStats),
    /// A trial failed and the remainder were abandoned
    Disqualified {
        /// Human-readable failure cause, for diagnostics only
        reason: String,
    },
}
