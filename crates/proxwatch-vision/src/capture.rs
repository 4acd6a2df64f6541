//! Frame sources.
//!
//! A `CaptureSource` hands out a `CaptureSession` per capture cycle. The
//! session owns the device for its lifetime and releases it on drop, so an
//! early return, an error or a detection all give the camera back.

use std::time::Duration;

use proxwatch_models::Frame;

use crate::error::VisionResult;

/// An open camera producing frames until dropped.
pub trait CaptureSession {
    /// Grab the next frame. Blocks until the device delivers one.
    fn next_frame(&mut self) -> VisionResult<Frame>;
}

/// A camera that can be opened for one capture cycle at a time.
pub trait CaptureSource {
    /// Acquire the device. The returned session releases it when dropped.
    fn open(&mut self) -> VisionResult<Box<dyn CaptureSession + '_>>;

    /// Source name for logging.
    fn name(&self) -> &'static str;
}

/// Camera settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Video device index (`/dev/videoN`).
    pub device_index: i32,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Delay after opening before the first frame is trusted.
    pub warmup: Duration,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 640,
            height: 480,
            fps: 60.0,
            warmup: Duration::from_millis(100),
        }
    }
}
