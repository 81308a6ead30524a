//! Prediction metrics for service monitoring
//!
//! Tracks request counts, latency, and error rate for the prediction
//! endpoints, exposed in Prometheus text format at `/metrics`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Central metrics collector shared across request handlers
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Total number of prediction requests
    total_predictions: Arc<AtomicUsize>,
    /// Predictions that produced a result
    successful_predictions: Arc<AtomicUsize>,
    /// Predictions rejected or failed
    failed_predictions: Arc<AtomicUsize>,
    /// Total prediction time in microseconds
    total_prediction_time_us: Arc<AtomicU64>,
    /// Start time for rate calculations
    start_time: Instant,
}

impl MetricsCollector {
    /// Create a new metrics collector
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_predictions: Arc::new(AtomicUsize::new(0)),
            successful_predictions: Arc::new(AtomicUsize::new(0)),
            failed_predictions: Arc::new(AtomicUsize::new(0)),
            total_prediction_time_us: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction with its latency
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_success(&self, duration: Duration) {
        self.total_predictions.fetch_add(1, Ordering::Relaxed);
        self.successful_predictions.fetch_add(1, Ordering::Relaxed);
        self.total_prediction_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a failed or rejected prediction
    pub fn record_failure(&self) {
        self.total_predictions.fetch_add(1, Ordering::Relaxed);
        self.failed_predictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current snapshot of metrics
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_predictions.load(Ordering::Relaxed);
        let successful = self.successful_predictions.load(Ordering::Relaxed);
        let failed = self.failed_predictions.load(Ordering::Relaxed);
        let total_time_us = self.total_prediction_time_us.load(Ordering::Relaxed);
        let uptime = self.start_time.elapsed();

        MetricsSnapshot {
            total_predictions: total,
            successful_predictions: successful,
            failed_predictions: failed,
            total_prediction_time_us: total_time_us,
            uptime_secs: uptime.as_secs(),
            predictions_per_sec: if uptime.as_secs() > 0 {
                total as f64 / uptime.as_secs_f64()
            } else {
                0.0
            },
            avg_latency_ms: if successful > 0 {
                (total_time_us as f64 / 1000.0) / successful as f64
            } else {
                0.0
            },
            error_rate: if total > 0 {
                failed as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Export metrics in Prometheus format
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            "# HELP respirar_predictions_total Total number of prediction requests\n\
             # TYPE respirar_predictions_total counter\n\
             respirar_predictions_total {}\n\
             # HELP respirar_predictions_successful Successful predictions\n\
             # TYPE respirar_predictions_successful counter\n\
             respirar_predictions_successful {}\n\
             # HELP respirar_predictions_failed Failed or rejected predictions\n\
             # TYPE respirar_predictions_failed counter\n\
             respirar_predictions_failed {}\n\
             # HELP respirar_prediction_time_seconds Total prediction time\n\
             # TYPE respirar_prediction_time_seconds counter\n\
             respirar_prediction_time_seconds {:.6}\n\
             # HELP respirar_predictions_per_second Prediction request rate\n\
             # TYPE respirar_predictions_per_second gauge\n\
             respirar_predictions_per_second {:.2}\n\
             # HELP respirar_avg_latency_ms Average prediction latency in milliseconds\n\
             # TYPE respirar_avg_latency_ms gauge\n\
             respirar_avg_latency_ms {:.2}\n\
             # HELP respirar_error_rate Error rate (0.0-1.0)\n\
             # TYPE respirar_error_rate gauge\n\
             respirar_error_rate {:.4}\n\
             # HELP respirar_uptime_seconds Uptime in seconds\n\
             # TYPE respirar_uptime_seconds counter\n\
             respirar_uptime_seconds {}\n",
            snapshot.total_predictions,
            snapshot.successful_predictions,
            snapshot.failed_predictions,
            snapshot.total_prediction_time_us as f64 / 1_000_000.0,
            snapshot.predictions_per_sec,
            snapshot.avg_latency_ms,
            snapshot.error_rate,
            snapshot.uptime_secs
        )
    }

    /// Reset all metrics (useful for testing)
    pub fn reset(&self) {
        self.total_predictions.store(0, Ordering::Relaxed);
        self.successful_predictions.store(0, Ordering::Relaxed);
        self.failed_predictions.store(0, Ordering::Relaxed);
        self.total_prediction_time_us.store(0, Ordering::Relaxed);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Total number of prediction requests
    pub total_predictions: usize,
    /// Predictions that produced a result
    pub successful_predictions: usize,
    /// Predictions rejected or failed
    pub failed_predictions: usize,
    /// Total prediction time in microseconds
    pub total_prediction_time_us: u64,
    /// System uptime in seconds
    pub uptime_secs: u64,
    /// Prediction request rate (per second)
    pub predictions_per_sec: f64,
    /// Average prediction latency in milliseconds
    pub avg_latency_ms: f64,
    /// Error rate as a fraction (0.0 to 1.0)
    pub error_rate: f64,
}
