//! Sequential, failure-tolerant fetch of every configured source.

use std::collections::BTreeMap;
use std::time::Duration;

use newsbot_core::{ConfigError, FetchOutcome, SourceKind};

use crate::error::AggregatorError;
use crate::rate_limit::RateLimiter;
use crate::sources::SourceClient;

/// Outcomes of one cycle, keyed (and therefore ordered) by source kind.
pub type CycleOutcomes = BTreeMap<SourceKind, FetchOutcome>;

/// Owns the source clients and the rate limiter that paces them.
pub struct Aggregator {
    clients: Vec<Box<dyn SourceClient>>,
    limiter: RateLimiter,
}

impl Aggregator {
    /// Builds an aggregator, sorting clients into fixed [`SourceKind`] order.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorError::DuplicateSource`] if two clients share a
    /// kind; the outcome map would otherwise hold fewer entries than clients.
    pub fn new(
        mut clients: Vec<Box<dyn SourceClient>>,
        limiter: RateLimiter,
    ) -> Result<Self, AggregatorError> {
        clients.sort_by_key(|c| c.kind());
        if let Some(pair) = clients.windows(2).find(|w| w[0].kind() == w[1].kind()) {
            return Err(AggregatorError::DuplicateSource(pair[0].kind()));
        }
        Ok(Self { clients, limiter })
    }

    #[must_use]
    pub fn source_count(&self) -> usize {
        self.clients.len()
    }

    /// Kinds in the order they will be fetched.
    #[must_use]
    pub fn kinds(&self) -> Vec<SourceKind> {
        self.clients.iter().map(|c| c.kind()).collect()
    }

    /// Upper bound on one cycle's wall-clock time when every call hits
    /// `per_call_timeout`.
    #[must_use]
    pub fn worst_case_cycle(&self, per_call_timeout: Duration) -> Duration {
        let per_source = self.limiter.min_interval() + per_call_timeout;
        per_source * u32::try_from(self.clients.len()).unwrap_or(u32::MAX)
    }

    /// Refuses schedules that a worst-case cycle could overrun.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CycleOverrun`] when the worst-case cycle is not
    /// strictly shorter than `interval`.
    pub fn check_fits_interval(
        &self,
        per_call_timeout: Duration,
        interval: Duration,
    ) -> Result<(), ConfigError> {
        let worst_case = self.worst_case_cycle(per_call_timeout);
        if worst_case >= interval {
            return Err(ConfigError::CycleOverrun {
                worst_case_secs: worst_case.as_secs(),
                interval_secs: interval.as_secs(),
            });
        }
        Ok(())
    }

    /// Fetches every source once, in order, never stopping early.
    ///
    /// Always returns exactly one outcome per configured client.
    pub async fn run_cycle(&mut self) -> CycleOutcomes {
        let mut outcomes = BTreeMap::new();

        for client in &self.clients {
            let kind = client.kind();
            self.limiter.throttle().await;

            let outcome = client.fetch().await;
            match &outcome {
                FetchOutcome::Success(records) => {
                    tracing::info!(source = %kind, count = records.len(), "source fetch succeeded");
                }
                FetchOutcome::Failure(failure) => {
                    tracing::warn!(
                        source = %kind,
                        reason = %failure.reason,
                        detail = %failure.detail,
                        "source fetch failed"
                    );
                }
            }
            outcomes.insert(kind, outcome);
        }

        let failed = outcomes.values().filter(|o| !o.is_success()).count();
        tracing::info!(
            sources = outcomes.len(),
            failed,
            "aggregation cycle complete"
        );
        outcomes
    }
}
