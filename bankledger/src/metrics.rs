//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `bankledger_txn_commits_total` - Committed ledger transactions
//! - `bankledger_txn_aborts_total` - Aborted ledger transactions
//! - `bankledger_txn_retries_total` - Unit-of-work re-runs after conflicts
//! - `bankledger_deposits_total` - Successful deposits
//! - `bankledger_withdrawals_total` - Successful withdrawals
//! - `bankledger_op_duration_seconds` - Histogram of operation latencies

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Each instance owns its registry so independent ledgers (and tests) do
/// not collide on metric names.
#[derive(Clone)]
pub struct Metrics {
    /// Committed transactions
    pub commits_total: IntCounter,

    /// Aborted transactions
    pub aborts_total: IntCounter,

    /// Conflict-driven retries
    pub txn_retries_total: IntCounter,

    /// Successful deposits
    pub deposits_total: IntCounter,

    /// Successful withdrawals
    pub withdrawals_total: IntCounter,

    /// Operation latency histogram
    pub op_duration: Histogram,

    registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let commits_total = IntCounter::new(
            "bankledger_txn_commits_total",
            "Committed ledger transactions",
        )?;
        registry.register(Box::new(commits_total.clone()))?;

        let aborts_total = IntCounter::new(
            "bankledger_txn_aborts_total",
            "Aborted ledger transactions",
        )?;
        registry.register(Box::new(aborts_total.clone()))?;

        let txn_retries_total = IntCounter::new(
            "bankledger_txn_retries_total",
            "Unit-of-work re-runs after lock or commit conflicts",
        )?;
        registry.register(Box::new(txn_retries_total.clone()))?;

        let deposits_total =
            IntCounter::new("bankledger_deposits_total", "Successful deposits")?;
        registry.register(Box::new(deposits_total.clone()))?;

        let withdrawals_total =
            IntCounter::new("bankledger_withdrawals_total", "Successful withdrawals")?;
        registry.register(Box::new(withdrawals_total.clone()))?;

        let op_duration = Histogram::with_opts(
            HistogramOpts::new(
                "bankledger_op_duration_seconds",
                "Histogram of ledger operation latencies",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0]),
        )?;
        registry.register(Box::new(op_duration.clone()))?;

        Ok(Self {
            commits_total,
            aborts_total,
            txn_retries_total,
            deposits_total,
            withdrawals_total,
            op_duration,
            registry,
        })
    }

    /// Record a committed transaction
    pub fn record_commit(&self) {
        self.commits_total.inc();
    }

    /// Record an aborted transaction
    pub fn record_abort(&self) {
        self.aborts_total.inc();
    }

    /// Record a conflict-driven retry
    pub fn record_retry(&self) {
        self.txn_retries_total.inc();
    }

    /// Record a successful deposit
    pub fn record_deposit(&self) {
        self.deposits_total.inc();
    }

    /// Record a successful withdrawal
    pub fn record_withdrawal(&self) {
        self.withdrawals_total.inc();
    }

    /// Record operation latency
    pub fn observe_op_duration(&self, duration_seconds: f64) {
        self.op_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.commits_total.get(), 0);
        assert_eq!(metrics.aborts_total.get(), 0);
    }

    #[test]
    fn test_independent_instances() {
        // Two instances must not collide on registration
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_commit();
        assert_eq!(a.commits_total.get(), 1);
        assert_eq!(b.commits_total.get(), 0);
    }

    #[test]
    fn test_record_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.record_commit();
        metrics.record_retry();
        metrics.record_retry();
        metrics.record_deposit();
        assert_eq!(metrics.commits_total.get(), 1);
        assert_eq!(metrics.txn_retries_total.get(), 2);
        assert_eq!(metrics.deposits_total.get(), 1);
    }
}
