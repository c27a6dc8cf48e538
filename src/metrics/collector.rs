//! Metrics collection using Prometheus
//!
//! This module provides metrics for the result engine: committed and
//! retracted results, validation rejections, commit failures, operation
//! latency and the size of rating moves.

use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Operation label for result creation
pub const OPERATION_CREATE: &str = "create";

/// Operation label for result retraction
pub const OPERATION_DESTROY: &str = "destroy";

/// Main metrics collector for the rating ledger
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Result lifecycle metrics
    result_metrics: ResultMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Result lifecycle metrics
#[derive(Clone)]
pub struct ResultMetrics {
    /// Total results committed
    pub created_total: IntCounter,

    /// Total results retracted
    pub destroyed_total: IntCounter,

    /// Requests rejected by validation, by operation and reason
    pub validation_failures_total: IntCounterVec,

    /// Atomic commits that failed, by operation
    pub commit_failures_total: IntCounterVec,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// End-to-end duration of engine operations
    pub operation_duration: HistogramVec,

    /// Points gained by the winner per committed result
    pub rating_delta: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let result_metrics = ResultMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            result_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get result lifecycle metrics
    pub fn results(&self) -> &ResultMetrics {
        &self.result_metrics
    }

    /// Get performance metrics
    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a committed result
    pub fn record_result_created(&self, winner_delta: f64, duration: Duration) {
        self.result_metrics.created_total.inc();
        let delta = winner_delta.abs();
        self.performance_metrics.rating_delta.observe(delta);
        self.record_operation(OPERATION_CREATE, duration);
    }

    /// Record a retracted result
    pub fn record_result_destroyed(&self, duration: Duration) {
        self.result_metrics.destroyed_total.inc();
        self.record_operation(OPERATION_DESTROY, duration);
    }

    /// Record a validation rejection
    pub fn record_validation_failure(&self, operation: &str, reason: &str) {
        self.result_metrics
            .validation_failures_total
            .with_label_values(&[operation, reason])
            .inc();
    }

    /// Record a failed atomic commit
    pub fn record_commit_failure(&self, operation: &str) {
        self.result_metrics
            .commit_failures_total
            .with_label_values(&[operation])
            .inc();
    }

    /// Record an operation duration
    pub fn record_operation(&self, operation: &str, duration: Duration) {
        self.performance_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ResultMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let created_total = IntCounter::new(
            "rating_ledger_results_created_total",
            "Total results committed",
        )?;
        registry.register(Box::new(created_total.clone()))?;

        let destroyed_total = IntCounter::new(
            "rating_ledger_results_destroyed_total",
            "Total results retracted",
        )?;
        registry.register(Box::new(destroyed_total.clone()))?;

        let validation_failures_total = IntCounterVec::new(
            Opts::new(
                "rating_ledger_validation_failures_total",
                "Requests rejected by validation",
            ),
            &["operation", "reason"],
        )?;
        registry.register(Box::new(validation_failures_total.clone()))?;

        let commit_failures_total = IntCounterVec::new(
            Opts::new(
                "rating_ledger_commit_failures_total",
                "Atomic ledger commits that failed",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(commit_failures_total.clone()))?;

        Ok(Self {
            created_total,
            destroyed_total,
            validation_failures_total,
            commit_failures_total,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "rating_ledger_operation_duration_seconds",
                "Duration of result engine operations",
            )
            .buckets(vec![
                0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1,
            ]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let rating_delta = Histogram::with_opts(
            HistogramOpts::new(
                "rating_ledger_rating_delta",
                "Points gained by the winner of a committed result",
            )
            .buckets(vec![1.0, 2.0, 4.0, 8.0, 16.0, 24.0, 32.0, 48.0, 64.0]),
        )?;
        registry.register(Box::new(rating_delta.clone()))?;

        Ok(Self {
            operation_duration,
            rating_delta,
        })
    }
}
