// Performance Metrics for the pricing engine
//
// Tracks execution times and slow operations for rate calculations and
// availability checks. Exposed as JSON on GET /metrics.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Performance threshold for slow operations (100ms)
const SLOW_OPERATION_THRESHOLD_MS: u64 = 100;

/// Performance metrics shared across handlers
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct OperationStats {
    count: AtomicU64,
    total_time_us: AtomicU64,
    slow: AtomicU64,
}

impl OperationStats {
    fn record(&self, label: &str, duration: Duration) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        if duration.as_millis() as u64 > SLOW_OPERATION_THRESHOLD_MS {
            self.slow.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Slow {}: {}ms", label, duration.as_millis());
        }
    }

    fn avg_time_ms(&self) -> f64 {
        let count = self.count.load(Ordering::Relaxed);
        let total_us = self.total_time_us.load(Ordering::Relaxed);

        if count == 0 {
            0.0
        } else {
            (total_us as f64 / count as f64) / 1000.0
        }
    }

    fn summary(&self) -> OperationSummary {
        OperationSummary {
            count: self.count.load(Ordering::Relaxed),
            avg_time_ms: self.avg_time_ms(),
            slow: self.slow.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default)]
struct MetricsInner {
    rate_calculations: OperationStats,
    availability_checks: OperationStats,
}

impl PerformanceMetrics {
    /// Create a new PerformanceMetrics instance
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Start timing a rate calculation
    pub fn start_rate_calculation(&self) -> OperationTimer {
        OperationTimer::new(OperationType::RateCalculation, self.clone())
    }

    /// Start timing an availability check
    pub fn start_availability_check(&self) -> OperationTimer {
        OperationTimer::new(OperationType::Availability, self.clone())
    }

    fn record(&self, operation_type: OperationType, duration: Duration) {
        match operation_type {
            OperationType::RateCalculation => self
                .inner
                .rate_calculations
                .record("rate calculation", duration),
            OperationType::Availability => self
                .inner
                .availability_checks
                .record("availability check", duration),
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            rate_calculations: self.inner.rate_calculations.summary(),
            availability_checks: self.inner.availability_checks.summary(),
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let summary = self.summary();
        tracing::info!(
            "Pricing Engine Performance Metrics:\n\
             Rate calculations: {} total, avg {:.2}ms, {} slow\n\
             Availability: {} checks, avg {:.2}ms, {} slow",
            summary.rate_calculations.count,
            summary.rate_calculations.avg_time_ms,
            summary.rate_calculations.slow,
            summary.availability_checks.count,
            summary.availability_checks.avg_time_ms,
            summary.availability_checks.slow,
        );
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of operation being timed
#[derive(Debug, Clone, Copy)]
enum OperationType {
    RateCalculation,
    Availability,
}

/// Timer for tracking operation duration, recorded exactly once when dropped
pub struct OperationTimer {
    start: Instant,
    operation_type: OperationType,
    metrics: PerformanceMetrics,
}

impl OperationTimer {
    fn new(operation_type: OperationType, metrics: PerformanceMetrics) -> Self {
        Self {
            start: Instant::now(),
            operation_type,
            metrics,
        }
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        self.metrics
            .record(self.operation_type, self.start.elapsed());
    }
}

/// Counters for one operation type
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
    pub count: u64,
    pub avg_time_ms: f64,
    pub slow: u64,
}

/// Summary of performance metrics
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub rate_calculations: OperationSummary,
    pub availability_checks: OperationSummary,
}
