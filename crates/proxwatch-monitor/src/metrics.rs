//! Monitor metrics.
//!
//! Recorded through the `metrics` facade. Nothing is exported unless a
//! Prometheus listener is installed with [`install_exporter`].

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::{MonitorError, MonitorResult};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Loop iterations.
    pub const TICKS_TOTAL: &str = "proxwatch_ticks_total";

    /// Measurements with no valid sample.
    pub const SENSOR_FAILURES_TOTAL: &str = "proxwatch_sensor_failures_total";

    /// Capture cycles started.
    pub const ACTIVATIONS_TOTAL: &str = "proxwatch_activations_total";

    /// Frames pulled from the camera.
    pub const CAPTURE_FRAMES_TOTAL: &str = "proxwatch_capture_frames_total";

    /// Alert dispatches by outcome.
    pub const ALERTS_TOTAL: &str = "proxwatch_alerts_total";

    /// Filtered distance readings in centimeters.
    pub const DISTANCE_CM: &str = "proxwatch_distance_cm";
}

// =============================================================================
// Recording Functions
// =============================================================================

pub fn record_tick() {
    counter!(names::TICKS_TOTAL).increment(1);
}

pub fn record_sensor_failure() {
    counter!(names::SENSOR_FAILURES_TOTAL).increment(1);
}

pub fn record_distance(distance_cm: f64) {
    histogram!(names::DISTANCE_CM).record(distance_cm);
}

pub fn record_activation() {
    counter!(names::ACTIVATIONS_TOTAL).increment(1);
}

pub fn record_capture_frames(frames: u32) {
    counter!(names::CAPTURE_FRAMES_TOTAL).increment(u64::from(frames));
}

/// Record an alert dispatch, `outcome` being `sent` or `failed`.
pub fn record_alert(outcome: &'static str) {
    counter!(names::ALERTS_TOTAL, "outcome" => outcome).increment(1);
}

/// Install the Prometheus recorder with an HTTP listener on `addr`.
///
/// Must be called from within the tokio runtime.
pub fn install_exporter(addr: SocketAddr) -> MonitorResult<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MonitorError::Metrics(e.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
