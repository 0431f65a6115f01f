//! Translation metrics and observability module.
//!
//! Each engine owns its own `TranslationMetrics`, so two engines in one
//! process (or two tests) never see each other's counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for cache effectiveness, provider reliability and spend.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    provider_calls: AtomicUsize,
    provider_failures: AtomicUsize,
    parse_failures: AtomicUsize,
    /// Accumulated provider cost in USD, stored as `f64` bits
    total_cost_bits: AtomicU64,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_call(&self) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reply that could not be decoded. Also counts as a failure.
    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
        self.record_provider_failure();
    }

    /// Add the cost of one provider call. Non-finite or negative values are
    /// ignored.
    pub fn record_cost(&self, cost: f64) {
        if !cost.is_finite() || cost <= 0.0 {
            return;
        }
        // fetch_update only fails when the closure returns None
        let _ = self
            .total_cost_bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + cost).to_bits())
            });
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn provider_calls(&self) -> usize {
        self.provider_calls.load(Ordering::Relaxed)
    }

    pub fn provider_failures(&self) -> usize {
        self.provider_failures.load(Ordering::Relaxed)
    }

    pub fn parse_failures(&self) -> usize {
        self.parse_failures.load(Ordering::Relaxed)
    }

    pub fn total_cost(&self) -> f64 {
        f64::from_bits(self.total_cost_bits.load(Ordering::Relaxed))
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.provider_calls();
        let failures = self.provider_failures();
        let provider_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            provider_calls: calls,
            provider_failures: failures,
            parse_failures: self.parse_failures(),
            provider_success_rate,
            total_cost: self.total_cost(),
        }
    }
}

/// Snapshot of an engine's translation statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub provider_calls: usize,
    pub provider_failures: usize,

    /// Replies that reached us but could not be decoded
    pub parse_failures: usize,

    /// Provider success rate as a percentage (0-100)
    pub provider_success_rate: f64,

    /// Accumulated provider spend in USD
    pub total_cost: f64,
}
