//! Trigger state machine.
//!
//! The controller decides when a distance reading activates the camera,
//! runs one capture cycle per activation and dispatches the resulting alert.
//! The cooldown only advances after an alert is confirmed sent, so a failed
//! dispatch is retried on the next eligible reading.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use proxwatch_models::DetectionEvent;
use proxwatch_notify::{NotifyError, Notifier};
use proxwatch_vision::{
    annotate_frame, detect_all, save_detection_frame, CaptureSource, Detector, VisionResult,
};

use crate::alert::compose_alert;
use crate::clock::Clock;
use crate::error::{MonitorError, MonitorResult};
use crate::metrics;
use crate::retry::{retry_async, RetryConfig};

/// Cooldown bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerState {
    /// Time of the last successful alert. `None` until the first one.
    pub last_trigger_time: Option<DateTime<Utc>>,
    /// Minimum time between two successful alerts.
    pub trigger_interval: Duration,
    /// Readings strictly below this distance (cm) can activate.
    pub trigger_distance_threshold: f64,
}

impl TriggerState {
    pub fn new(trigger_distance_threshold: f64, trigger_interval: Duration) -> Self {
        Self {
            last_trigger_time: None,
            trigger_interval,
            trigger_distance_threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPhase {
    Idle,
    Active,
}

/// Hard bounds on a single capture cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureLimits {
    pub max_frames: u32,
    pub max_duration: Duration,
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self {
            max_frames: 300,
            max_duration: Duration::from_secs(30),
        }
    }
}

/// Why a capture cycle ended without a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDetectionReason {
    /// A full trigger interval passed since the cycle began.
    Stale,
    FrameLimit,
    Timeout,
    Cancelled,
}

impl NoDetectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoDetectionReason::Stale => "stale",
            NoDetectionReason::FrameLimit => "frame_limit",
            NoDetectionReason::Timeout => "timeout",
            NoDetectionReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for NoDetectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum CycleOutcome {
    Detected(DetectionEvent),
    NoDetection(NoDetectionReason),
}

/// Where and to whom alerts go.
#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub recipient: String,
    pub capture_dir: PathBuf,
    pub retry: RetryConfig,
}

pub struct TriggerController {
    state: TriggerState,
    phase: TriggerPhase,
    limits: CaptureLimits,
    alert: AlertSettings,
    clock: Arc<dyn Clock>,
}

impl TriggerController {
    pub fn new(
        state: TriggerState,
        limits: CaptureLimits,
        alert: AlertSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state,
            phase: TriggerPhase::Idle,
            limits,
            alert,
            clock,
        }
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    /// True once the cooldown since the last successful alert has elapsed.
    pub fn is_trigger_ready(&self, now: DateTime<Utc>) -> bool {
        let Some(last) = self.state.last_trigger_time else {
            return true;
        };
        match (now - last).to_std() {
            Ok(elapsed) => elapsed >= self.state.trigger_interval,
            // `now` precedes the last trigger
            Err(_) => false,
        }
    }

    pub fn should_activate(&self, distance_cm: f64, now: DateTime<Utc>) -> bool {
        distance_cm.is_finite()
            && distance_cm >= 0.0
            && distance_cm < self.state.trigger_distance_threshold
            && self.is_trigger_ready(now)
    }

    /// Run a capture cycle with no external cancellation.
    pub fn run_capture_cycle(
        &mut self,
        source: &mut dyn CaptureSource,
        detector: &mut dyn Detector,
        distance_cm: f64,
    ) -> VisionResult<CycleOutcome> {
        self.run_capture_cycle_with(source, detector, distance_cm, || false)
    }

    /// Pull frames until one matches or the cycle runs out of budget.
    ///
    /// `is_cancelled` is polled before every frame. The capture session is
    /// released before this returns, whatever the outcome.
    pub fn run_capture_cycle_with(
        &mut self,
        source: &mut dyn CaptureSource,
        detector: &mut dyn Detector,
        distance_cm: f64,
        is_cancelled: impl Fn() -> bool,
    ) -> VisionResult<CycleOutcome> {
        self.phase = TriggerPhase::Active;
        let result = self.capture_frames(source, detector, distance_cm, is_cancelled);
        self.phase = TriggerPhase::Idle;
        result
    }

    fn capture_frames(
        &self,
        source: &mut dyn CaptureSource,
        detector: &mut dyn Detector,
        distance_cm: f64,
        is_cancelled: impl Fn() -> bool,
    ) -> VisionResult<CycleOutcome> {
        let started = self.clock.now();
        let mut frames: u32 = 0;
        let mut session = source.open()?;

        let reason = loop {
            if is_cancelled() {
                break NoDetectionReason::Cancelled;
            }
            if frames >= self.limits.max_frames {
                break NoDetectionReason::FrameLimit;
            }
            if elapsed_since(self.clock.as_ref(), started) >= self.limits.max_duration {
                break NoDetectionReason::Timeout;
            }

            let mut frame = session.next_frame()?;
            frames += 1;

            let detections = detect_all(&mut *detector, &frame)?;
            if detections.is_empty() {
                // at least one frame is always examined
                if elapsed_since(self.clock.as_ref(), started) >= self.state.trigger_interval {
                    break NoDetectionReason::Stale;
                }
                continue;
            }

            annotate_frame(&mut frame, &detections);
            metrics::record_capture_frames(frames);
            debug!(frames, detector = detector.name(), "Detection on frame");

            return Ok(CycleOutcome::Detected(DetectionEvent {
                frame,
                timestamp: self.clock.now(),
                distance_cm,
                detections,
            }));
        };

        metrics::record_capture_frames(frames);
        debug!(frames, reason = %reason, "Capture cycle ended without detection");
        Ok(CycleOutcome::NoDetection(reason))
    }

    /// Persist the annotated frame, send the alert and start the cooldown.
    ///
    /// On any failure the trigger state is left untouched.
    pub async fn dispatch_alert(
        &mut self,
        event: &DetectionEvent,
        notifier: &dyn Notifier,
    ) -> MonitorResult<PathBuf> {
        let path =
            save_detection_frame(&self.alert.capture_dir, event).map_err(MonitorError::Artifact)?;
        let message = compose_alert(event, &self.alert.recipient, &path)?;

        retry_async(
            &self.alert.retry,
            || notifier.send(&message),
            |e: &NotifyError| e.is_retryable(),
        )
        .await
        .into_result()?;

        self.state.last_trigger_time = Some(self.clock.now());
        info!(
            notifier = notifier.name(),
            recipient = %self.alert.recipient,
            attachment = %path.display(),
            "Alert sent"
        );
        Ok(path)
    }
}

fn elapsed_since(clock: &dyn Clock, started: DateTime<Utc>) -> Duration {
    (clock.now() - started).to_std().unwrap_or_default()
}
