//! Timed resolution trials and the bounded probing pool.
//!
//! Each resolver gets a fixed number of sequential trials against one
//! benchmark domain. The first failed trial abandons the rest and
//! disqualifies the resolver outright; partial averages would flatter
//! resolvers that cannot answer reliably. Resolvers themselves are
//! independent, so they are probed concurrently under a semaphore.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use dnsrank_core::{ProbeOutcome, ResolverEntry, ResolverStats};

use crate::error::{ProbeError, ProbeResult};
use crate::upstream::{StampFactory, Upstream, UpstreamFactory, UpstreamOptions};

/// Trials per resolver.
pub const DEFAULT_TRIALS: u32 = 4;

/// Per-trial exchange timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Domain every trial resolves.
pub const DEFAULT_DOMAIN: &str = "google.com";

/// Resolvers probed at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Probing configuration.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Timed lookups per resolver
    pub trials: u32,
    /// Per-lookup timeout
    pub timeout: Duration,
    /// Benchmark domain, A-record lookups
    pub domain: String,
    /// Worker pool bound; unregulated fanout against hundreds of
    /// resolvers stresses local socket limits
    pub concurrency: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            timeout: DEFAULT_TIMEOUT,
            domain: DEFAULT_DOMAIN.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Runs timed resolution trials against resolvers.
pub struct Prober<F = StampFactory> {
    config: ProbeConfig,
    factory: F,
}

impl Prober {
    /// Prober backed by the stamp-decoding factory.
    #[must_use]
    pub fn new(config: ProbeConfig) -> Self {
        Self::with_factory(config, StampFactory)
    }
}

impl<F: UpstreamFactory> Prober<F> {
    /// Prober with a custom upstream factory.
    pub fn with_factory(config: ProbeConfig, factory: F) -> Self {
        Self { config, factory }
    }

    /// Probe one resolver.
    ///
    /// Never returns an error: every failure becomes a
    /// [`ProbeOutcome::Disqualified`] consumed by the ranking stage.
    pub async fn probe(&self, entry: &ResolverEntry) -> ProbeOutcome {
        match self.run_trials(entry).await {
            Ok(stats) => ProbeOutcome::Qualified(stats),
            Err(e) => {
                debug!(name = %entry.name, error = %e, "resolver disqualified");
                ProbeOutcome::Disqualified {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn run_trials(&self, entry: &ResolverEntry) -> ProbeResult<ResolverStats> {
        let opts = UpstreamOptions {
            timeout: self.config.timeout,
        };
        // One upstream per resolver; reusing its connection across
        // trials is allowed, the timer covers the exchange call only.
        let upstream = self.factory.create(&entry.stamp, opts)?;

        let mut stats = ResolverStats::new(self.config.trials);
        for _ in 0..self.config.trials {
            let elapsed = self.trial(upstream.as_ref()).await?;
            stats.record(elapsed);
        }
        Ok(stats)
    }

    /// One timed trial. The timer starts right before the exchange and
    /// stops right after it resolves.
    async fn trial(&self, upstream: &dyn Upstream) -> ProbeResult<Duration> {
        let query = build_query(&self.config.domain)?;

        let start = Instant::now();
        timeout(self.config.timeout, upstream.exchange(&query))
            .await
            .map_err(|_| ProbeError::Timeout(self.config.timeout))??;
        Ok(start.elapsed())
    }

    /// Probe every entry through a bounded worker pool.
    ///
    /// Outcomes come back in directory order; the ranking stage relies
    /// on that for its tie-break. Each task owns its stats exclusively,
    /// so the pool needs no shared mutable state beyond the semaphore.
    pub async fn probe_all(
        self: Arc<Self>,
        entries: Vec<ResolverEntry>,
    ) -> Vec<(ResolverEntry, ProbeOutcome)>
    where
        F: 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));

        let mut handles = Vec::with_capacity(entries.len());
        for entry in entries {
            let semaphore = Arc::clone(&semaphore);
            let prober = Arc::clone(&self);
            handles.push(tokio::spawn(async move {
                // Never closed, so acquisition only fails at shutdown.
                let _permit = semaphore.acquire().await.ok();
                let outcome = prober.probe(&entry).await;
                (entry, outcome)
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(pair) => outcomes.push(pair),
                Err(e) => warn!(error = %e, "probe task failed"),
            }
        }
        outcomes
    }
}

/// Build one A-record query for the benchmark domain.
fn build_query(domain: &str) -> ProbeResult<Message> {
    let fqdn = if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{domain}.")
    };
    let name = Name::from_ascii(&fqdn).map_err(|e| ProbeError::Proto(e.to_string()))?;

    let mut message = Message::new();
    message
        .set_id(rand::random())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(name, RecordType::A));
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Succeeds until the configured call number, then fails forever.
    struct ScriptedUpstream {
        fail_from: u32,
        calls: Arc<AtomicU32>,
    }

    #[async_trait::async_trait]
    impl Upstream for ScriptedUpstream {
        async fn exchange(&self, query: &Message) -> ProbeResult<Message> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.fail_from {
                return Err(ProbeError::Http("scripted failure".to_string()));
            }
            let mut response = Message::new();
            response.set_id(query.id());
            Ok(response)
        }
    }

    /// Never answers; exchanges block until the caller gives up.
    struct HangingUpstream {
        calls: Arc<AtomicU32>,
    }

    #[async_trait::async_trait]
    impl Upstream for HangingUpstream {
        async fn exchange(&self, query: &Message) -> ProbeResult<Message> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3600)).await;
            let mut response = Message::new();
            response.set_id(query.id());
            Ok(response)
        }
    }

    /// Factory scripting per-stamp behavior: a stamp of `fail:<k>`
    /// fails from the k-th exchange on, `refuse` fails construction,
    /// `hang` never answers, anything else always succeeds.
    struct ScriptedFactory {
        calls: Arc<AtomicU32>,
    }

    impl ScriptedFactory {
        fn new() -> Self {
            Self {
                calls: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    impl UpstreamFactory for ScriptedFactory {
        fn create(&self, stamp: &str, _opts: UpstreamOptions) -> ProbeResult<Box<dyn Upstream>> {
            if stamp == "refuse" {
                return Err(ProbeError::InvalidStamp("refused".to_string()));
            }
            if stamp == "hang" {
                return Ok(Box::new(HangingUpstream {
                    calls: Arc::clone(&self.calls),
                }));
            }
            let fail_from = stamp
                .strip_prefix("fail:")
                .and_then(|k| k.parse().ok())
                .unwrap_or(u32::MAX);
            Ok(Box::new(ScriptedUpstream {
                fail_from,
                calls: Arc::clone(&self.calls),
            }))
        }
    }

    fn entry(name: &str, stamp: &str) -> ResolverEntry {
        ResolverEntry {
            name: name.to_string(),
            stamp: stamp.to_string(),
            metadata: Vec::new(),
        }
    }

    fn prober(trials: u32) -> Prober<ScriptedFactory> {
        Prober::with_factory(
            ProbeConfig {
                trials,
                ..ProbeConfig::default()
            },
            ScriptedFactory::new(),
        )
    }

    #[tokio::test]
    async fn all_trials_succeeding_qualifies() {
        let prober = prober(4);
        let outcome = prober.probe(&entry("ok", "always-ok")).await;

        match outcome {
            ProbeOutcome::Qualified(stats) => {
                assert_eq!(stats.trials, 4);
                assert_eq!(stats.successes, 4);
                assert!(stats.min <= stats.average() && stats.average() <= stats.max);
            }
            ProbeOutcome::Disqualified { reason } => panic!("disqualified: {reason}"),
        }
    }

    #[tokio::test]
    async fn first_failure_aborts_remaining_trials() {
        let prober = prober(4);
        let calls = Arc::clone(&prober.factory.calls);

        let outcome = prober.probe(&entry("flaky", "fail:3")).await;

        assert!(matches!(outcome, ProbeOutcome::Disqualified { .. }));
        // Trials 1 and 2 succeeded, trial 3 failed, trial 4 never ran.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn hung_resolver_is_cut_off_by_the_trial_timeout() {
        let prober = Prober::with_factory(
            ProbeConfig {
                trials: 4,
                timeout: Duration::from_millis(100),
                ..ProbeConfig::default()
            },
            ScriptedFactory::new(),
        );
        let calls = Arc::clone(&prober.factory.calls);

        let start = Instant::now();
        let outcome = prober.probe(&entry("hung", "hang")).await;

        // Well under timeout x trials, let alone the upstream's sleep.
        assert!(start.elapsed() < Duration::from_secs(2));
        match outcome {
            ProbeOutcome::Disqualified { reason } => assert!(reason.contains("timed out")),
            ProbeOutcome::Qualified(_) => panic!("should not qualify"),
        }
        // The first timed-out trial aborts the remaining three.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn construction_failure_disqualifies() {
        let prober = prober(4);
        let outcome = prober.probe(&entry("bad", "refuse")).await;

        match outcome {
            ProbeOutcome::Disqualified { reason } => assert!(reason.contains("stamp")),
            ProbeOutcome::Qualified(_) => panic!("should not qualify"),
        }
    }

    #[tokio::test]
    async fn pool_preserves_directory_order() {
        let prober = Arc::new(Prober::with_factory(
            ProbeConfig {
                trials: 2,
                concurrency: 2,
                ..ProbeConfig::default()
            },
            ScriptedFactory::new(),
        ));
        let entries = vec![
            entry("a", "ok"),
            entry("b", "fail:1"),
            entry("c", "ok"),
            entry("d", "refuse"),
        ];

        let outcomes = prober.probe_all(entries).await;
        let summary: Vec<_> = outcomes
            .iter()
            .map(|(e, o)| {
                (
                    e.name.as_str(),
                    matches!(o, ProbeOutcome::Qualified(_)),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![("a", true), ("b", false), ("c", true), ("d", false)]
        );
    }

    #[test]
    fn queries_are_recursive_a_lookups() {
        let query = build_query("google.com").unwrap();
        assert!(query.recursion_desired());
        assert_eq!(query.queries().len(), 1);
        assert_eq!(query.queries()[0].query_type(), RecordType::A);
        assert_eq!(query.queries()[0].name().to_ascii(), "google.com.");
    }
}
