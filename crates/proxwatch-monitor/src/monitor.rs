//! The monitoring loop.
//!
//! Each tick takes one filtered distance reading, runs a capture cycle when
//! the reading activates the trigger and dispatches the alert in-line. Ticks
//! never fail: every per-tick error is logged with the stage it came from and
//! the loop carries on with the next scan.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};

use proxwatch_notify::Notifier;
use proxwatch_sensor::{DistanceSampler, RangingDevice};
use proxwatch_vision::{CaptureSource, Detector};

use crate::clock::Clock;
use crate::config::MonitorConfig;
use crate::devices::Devices;
use crate::error::{MonitorError, MonitorResult};
use crate::logging::CycleLogger;
use crate::metrics;
use crate::retry::FailureTracker;
use crate::trigger::{CycleOutcome, NoDetectionReason, TriggerController};

/// Consecutive sensor failures logged before going quiet.
const MAX_LOGGED_SENSOR_FAILURES: u32 = 5;

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    SensorFailed,
    /// Nothing within range.
    Idle { distance_cm: f64 },
    /// In range, but the cooldown has not expired.
    CoolingDown { distance_cm: f64 },
    NoDetection(NoDetectionReason),
    CaptureFailed,
    AlertSent(PathBuf),
    AlertFailed,
}

pub struct Monitor {
    sampler: DistanceSampler<Box<dyn RangingDevice>>,
    camera: Box<dyn CaptureSource>,
    detector: Box<dyn Detector>,
    notifier: Arc<dyn Notifier>,
    controller: TriggerController,
    clock: Arc<dyn Clock>,
    scan_interval: Duration,
    sensor_failures: FailureTracker,
}

impl Monitor {
    pub fn new(
        config: &MonitorConfig,
        devices: Devices,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> MonitorResult<Self> {
        let sampler = DistanceSampler::new(devices.ranging, config.sampler.clone())?;
        let controller = TriggerController::new(
            config.trigger_state(),
            config.capture.clone(),
            config.alert_settings(),
            clock.clone(),
        );

        Ok(Self {
            sampler,
            camera: devices.camera,
            detector: devices.detector,
            notifier,
            controller,
            clock,
            scan_interval: config.scan_interval,
            sensor_failures: FailureTracker::new(MAX_LOGGED_SENSOR_FAILURES),
        })
    }

    pub fn controller(&self) -> &TriggerController {
        &self.controller
    }

    /// Run one scan. `shutdown` is polled between frames of a capture cycle.
    pub async fn tick(&mut self, shutdown: &watch::Receiver<bool>) -> TickOutcome {
        metrics::record_tick();

        let distance_cm = match run_blocking(|| self.sampler.measure()) {
            Ok(distance) => {
                self.sensor_failures.record_success();
                distance.centimeters
            }
            Err(e) => {
                metrics::record_sensor_failure();
                if self.sensor_failures.record_failure() {
                    warn!(stage = "sensor", error = %e, "Distance measurement failed");
                }
                return TickOutcome::SensorFailed;
            }
        };
        metrics::record_distance(distance_cm);

        let now = self.clock.now();
        if !self.controller.should_activate(distance_cm, now) {
            let threshold = self.controller.state().trigger_distance_threshold;
            return if distance_cm < threshold {
                debug!(distance_cm, "In range but cooling down");
                TickOutcome::CoolingDown { distance_cm }
            } else {
                TickOutcome::Idle { distance_cm }
            };
        }

        metrics::record_activation();
        let cycle = CycleLogger::new(distance_cm);
        let span = cycle.create_span();
        cycle.log_start();

        let controller = &mut self.controller;
        let camera = &mut *self.camera;
        let detector = &mut *self.detector;
        let outcome = span.in_scope(|| {
            run_blocking(|| {
                controller.run_capture_cycle_with(camera, detector, distance_cm, || {
                    *shutdown.borrow()
                })
            })
        });

        let event = match outcome {
            Ok(CycleOutcome::Detected(event)) => {
                cycle.log_progress(
                    "capture",
                    &format!("{} matches in frame", event.total_matches()),
                );
                debug!(summary = ?event.summary(), "Detection");
                event
            }
            Ok(CycleOutcome::NoDetection(reason)) => {
                cycle.log_completion(&format!("no detection ({reason})"));
                return TickOutcome::NoDetection(reason);
            }
            Err(e) => {
                cycle.log_warning("capture", &format!("Capture cycle abandoned: {e}"));
                return TickOutcome::CaptureFailed;
            }
        };

        match self
            .controller
            .dispatch_alert(&event, self.notifier.as_ref())
            .instrument(span)
            .await
        {
            Ok(path) => {
                metrics::record_alert("sent");
                cycle.log_completion(&format!("alert sent with {}", path.display()));
                TickOutcome::AlertSent(path)
            }
            Err(e @ MonitorError::Artifact(_)) => {
                metrics::record_alert("failed");
                cycle.log_error(e.stage(), &e.to_string());
                TickOutcome::AlertFailed
            }
            Err(e) => {
                metrics::record_alert("failed");
                cycle.log_warning(e.stage(), &format!("Alert dispatch failed: {e}"));
                TickOutcome::AlertFailed
            }
        }
    }

    /// Scan until `shutdown` flips to `true` or its sender goes away.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let state = self.controller.state().clone();
        info!(
            threshold_cm = state.trigger_distance_threshold,
            scan_interval = ?self.scan_interval,
            cooldown = ?state.trigger_interval,
            camera = self.camera.name(),
            detector = self.detector.name(),
            notifier = self.notifier.name(),
            "Monitoring started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let outcome = self.tick(&shutdown).await;
            debug!(?outcome, "Tick complete");

            let closed = tokio::select! {
                _ = tokio::time::sleep(self.scan_interval) => false,
                changed = shutdown.changed() => changed.is_err(),
            };
            if closed {
                break;
            }
        }

        info!("Stopping monitoring process.");
    }
}

/// Run blocking device I/O without stalling other tasks on a multi-threaded runtime.
fn run_blocking<R>(f: impl FnOnce() -> R) -> R {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}
