//! Scripted fakes for the monitor's collaborators.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use image::Rgb;

use proxwatch_models::{BoundingBox, DetectionClass, Frame};
use proxwatch_notify::{AlertMessage, NotifyError, NotifyResult, Notifier};
use proxwatch_sensor::{RangingDevice, SensorError, SensorResult, CM_PER_ECHO_SECOND};
use proxwatch_vision::{CaptureSession, CaptureSource, Detector, VisionError, VisionResult};

use crate::clock::ManualClock;
use crate::retry::RetryConfig;
use crate::trigger::AlertSettings;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 21, 0, 0).unwrap()
}

pub fn test_alert_settings(dir: &Path) -> AlertSettings {
    AlertSettings {
        recipient: "owner@example.com".to_string(),
        capture_dir: dir.to_path_buf(),
        retry: RetryConfig::new("test_dispatch")
            .with_max_retries(1)
            .with_base_delay(Duration::from_millis(1)),
    }
}

/// Ranging device replaying one echo per reading. `None` is a missed echo.
pub struct ScriptedRanging {
    readings: VecDeque<Option<f64>>,
}

impl ScriptedRanging {
    pub fn new(readings: &[Option<f64>]) -> Self {
        Self {
            readings: readings.iter().copied().collect(),
        }
    }

    pub fn distances(distances: &[f64]) -> Self {
        Self {
            readings: distances.iter().map(|d| Some(*d)).collect(),
        }
    }
}

impl RangingDevice for ScriptedRanging {
    fn trigger_pulse(&mut self, _settle_time: Duration) -> SensorResult<()> {
        Ok(())
    }

    fn read_echo_edge(&mut self, timeout: Duration) -> SensorResult<Duration> {
        match self.readings.pop_front().flatten() {
            Some(cm) => Ok(Duration::from_secs_f64(cm / CM_PER_ECHO_SECOND)),
            None => Err(SensorError::Timeout(timeout)),
        }
    }
}

#[derive(Debug, Default)]
pub struct CameraStats {
    opened: AtomicU32,
    released: AtomicU32,
    frames: AtomicU32,
}

impl CameraStats {
    pub fn opened(&self) -> u32 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u32 {
        self.released.load(Ordering::SeqCst)
    }

    pub fn frames_served(&self) -> u32 {
        self.frames.load(Ordering::SeqCst)
    }
}

/// Camera producing blank frames whose first pixel holds the 1-based frame
/// index within the session. Each frame advances the clock.
pub struct FakeCamera {
    clock: Arc<ManualClock>,
    frame_time: Duration,
    stats: Arc<CameraStats>,
}

impl FakeCamera {
    pub fn new(clock: Arc<ManualClock>, frame_time: Duration) -> Self {
        Self {
            clock,
            frame_time,
            stats: Arc::new(CameraStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<CameraStats> {
        self.stats.clone()
    }

    pub fn opened(&self) -> u32 {
        self.stats.opened()
    }

    pub fn released(&self) -> u32 {
        self.stats.released()
    }

    pub fn frames_served(&self) -> u32 {
        self.stats.frames_served()
    }
}

struct FakeSession<'a> {
    camera: &'a FakeCamera,
    index: u8,
}

impl CaptureSession for FakeSession<'_> {
    fn next_frame(&mut self) -> VisionResult<Frame> {
        self.index = self.index.saturating_add(1);
        self.camera.stats.frames.fetch_add(1, Ordering::SeqCst);
        self.camera.clock.advance(self.camera.frame_time);

        let mut frame = Frame::new(64, 48);
        frame.put_pixel(0, 0, Rgb([self.index, 0, 0]));
        Ok(frame)
    }
}

impl Drop for FakeSession<'_> {
    fn drop(&mut self) {
        self.camera.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl CaptureSource for FakeCamera {
    fn open(&mut self) -> VisionResult<Box<dyn CaptureSession + '_>> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            camera: self,
            index: 0,
        }))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Camera whose session fails after serving `frames` frames.
pub struct FailingCamera {
    frames: u32,
    stats: Arc<CameraStats>,
}

impl FailingCamera {
    pub fn after(frames: u32) -> Self {
        Self {
            frames,
            stats: Arc::new(CameraStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<CameraStats> {
        self.stats.clone()
    }

    pub fn released(&self) -> u32 {
        self.stats.released()
    }
}

struct FailingSession<'a> {
    camera: &'a FailingCamera,
    served: u32,
}

impl CaptureSession for FailingSession<'_> {
    fn next_frame(&mut self) -> VisionResult<Frame> {
        if self.served >= self.camera.frames {
            return Err(VisionError::capture_failed("device unplugged"));
        }
        self.served += 1;
        self.camera.stats.frames.fetch_add(1, Ordering::SeqCst);
        Ok(Frame::new(64, 48))
    }
}

impl Drop for FailingSession<'_> {
    fn drop(&mut self) {
        self.camera.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl CaptureSource for FailingCamera {
    fn open(&mut self) -> VisionResult<Box<dyn CaptureSession + '_>> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FailingSession {
            camera: self,
            served: 0,
        }))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Detector matching every frame from a given session index onwards.
pub struct FrameDetector {
    match_from: Option<u8>,
    matching: Vec<DetectionClass>,
    classes: Vec<DetectionClass>,
}

impl FrameDetector {
    pub fn matching_from(frame: u8, classes: &[DetectionClass]) -> Self {
        Self {
            match_from: Some(frame),
            matching: classes.to_vec(),
            classes: DetectionClass::ALL.to_vec(),
        }
    }

    pub fn never() -> Self {
        Self {
            match_from: None,
            matching: Vec::new(),
            classes: DetectionClass::ALL.to_vec(),
        }
    }
}

impl Detector for FrameDetector {
    fn detect(&mut self, frame: &Frame, class: DetectionClass) -> VisionResult<Vec<BoundingBox>> {
        let index = frame.get_pixel(0, 0).0[0];
        match self.match_from {
            Some(from) if index >= from && self.matching.contains(&class) => {
                Ok(vec![BoundingBox::new(10, 10, 20, 20)])
            }
            _ => Ok(Vec::new()),
        }
    }

    fn classes(&self) -> &[DetectionClass] {
        &self.classes
    }

    fn name(&self) -> &'static str {
        "frame_index"
    }
}

/// Notifier recording every message, or failing every send.
#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    attempts: AtomicU32,
    sent: Mutex<Vec<AlertMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<AlertMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &AlertMessage) -> NotifyResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NotifyError::transport("connection refused"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
