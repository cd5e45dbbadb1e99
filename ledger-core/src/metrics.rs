//! Metrics collection for observability
//!
//! Prometheus collectors for the ledger hot path:
//!
//! - `ledger_entries_total{type}` - Entries committed, by transaction type
//! - `ledger_reversals_total` - Entries reversed
//! - `ledger_rejections_total` - Submissions rejected before commit
//! - `ledger_submit_duration_seconds` - Submission latency histogram
//!
//! Collectors register on an owned `Registry` so independent ledgers (and
//! tests) never collide on the global default registry.

use crate::error::{Error, Result};
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Entries committed, labeled by transaction type
    pub entries_total: IntCounterVec,

    /// Entries reversed
    pub reversals_total: IntCounter,

    /// Submissions rejected during validation
    pub rejections_total: IntCounter,

    /// Submission latency
    pub submit_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let entries_total = IntCounterVec::new(
            Opts::new("ledger_entries_total", "Entries committed"),
            &["type"],
        )
        .map_err(prometheus_error)?;
        registry
            .register(Box::new(entries_total.clone()))
            .map_err(prometheus_error)?;

        let reversals_total = IntCounter::new("ledger_reversals_total", "Entries reversed")
            .map_err(prometheus_error)?;
        registry
            .register(Box::new(reversals_total.clone()))
            .map_err(prometheus_error)?;

        let rejections_total =
            IntCounter::new("ledger_rejections_total", "Submissions rejected before commit")
                .map_err(prometheus_error)?;
        registry
            .register(Box::new(rejections_total.clone()))
            .map_err(prometheus_error)?;

        let submit_duration = Histogram::with_opts(
            HistogramOpts::new("ledger_submit_duration_seconds", "Submission latency")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0]),
        )
        .map_err(prometheus_error)?;
        registry
            .register(Box::new(submit_duration.clone()))
            .map_err(prometheus_error)?;

        Ok(Self {
            entries_total,
            reversals_total,
            rejections_total,
            submit_duration,
            registry,
        })
    }
}

fn prometheus_error(e: prometheus::Error) -> Error {
    Error::Config(format!("metrics registration failed: {}", e))
}
