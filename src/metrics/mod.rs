//! Metrics for the rating ledger
//!
//! This module provides Prometheus metrics collection for result engine
//! operations.

pub mod collector;

pub use collector::{
    MetricsCollector, MetricsTimer, PerformanceMetrics, ResultMetrics, OPERATION_CREATE,
    OPERATION_DESTROY,
};
