//! OpenCV camera capture and Haar cascade detection.
//!
//! # Requirements
//! - OpenCV 4.x with `videoio`, `imgproc` and `objdetect`
//! - Cascade XML files (shipped with OpenCV under `data/haarcascades`)

use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgproc;
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use tracing::{debug, info, warn};

use proxwatch_models::{BoundingBox, DetectionClass, Frame};

use crate::capture::{CameraConfig, CaptureSession, CaptureSource};
use crate::detector::{CascadeConfig, Detector};
use crate::error::{VisionError, VisionResult};

/// Camera read through OpenCV `VideoCapture`.
pub struct OpenCvCamera {
    config: CameraConfig,
}

impl OpenCvCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }

    /// Open and immediately release the device, to fail fast at startup.
    pub fn probe(&mut self) -> VisionResult<()> {
        let session = self.open()?;
        drop(session);
        info!(device = self.config.device_index, "Camera available");
        Ok(())
    }

    fn open_capture(&self) -> VisionResult<VideoCapture> {
        let mut capture = VideoCapture::new(self.config.device_index, videoio::CAP_ANY)
            .map_err(|e| VisionError::camera_unavailable(format!("Open camera: {e}")))?;
        let opened = capture
            .is_opened()
            .map_err(|e| VisionError::camera_unavailable(format!("Query camera: {e}")))?;
        if !opened {
            return Err(VisionError::camera_unavailable(format!(
                "Device {} could not be opened",
                self.config.device_index
            )));
        }

        for (property, value) in [
            (videoio::CAP_PROP_FRAME_WIDTH, self.config.width as f64),
            (videoio::CAP_PROP_FRAME_HEIGHT, self.config.height as f64),
            (videoio::CAP_PROP_FPS, self.config.fps),
        ] {
            // Drivers may silently ignore unsupported settings.
            if !capture.set(property, value).unwrap_or(false) {
                debug!(property, value, "Camera ignored property");
            }
        }

        Ok(capture)
    }
}

impl CaptureSource for OpenCvCamera {
    fn open(&mut self) -> VisionResult<Box<dyn CaptureSession + '_>> {
        let capture = self.open_capture()?;
        if !self.config.warmup.is_zero() {
            std::thread::sleep(self.config.warmup);
        }
        debug!(device = self.config.device_index, "Camera session opened");
        Ok(Box::new(OpenCvSession { capture }))
    }

    fn name(&self) -> &'static str {
        "opencv"
    }
}

struct OpenCvSession {
    capture: VideoCapture,
}

impl CaptureSession for OpenCvSession {
    fn next_frame(&mut self) -> VisionResult<Frame> {
        let mut bgr = Mat::default();
        let grabbed = self
            .capture
            .read(&mut bgr)
            .map_err(|e| VisionError::capture_failed(format!("Read: {e}")))?;
        if !grabbed || bgr.empty() {
            return Err(VisionError::EmptyFrame);
        }
        bgr_to_frame(&bgr)
    }
}

impl Drop for OpenCvSession {
    fn drop(&mut self) {
        match self.capture.release() {
            Ok(()) => debug!("Camera session released"),
            Err(e) => warn!("Failed to release camera: {}", e),
        }
    }
}

/// Convert an OpenCV BGR matrix into an owned RGB frame.
fn bgr_to_frame(bgr: &Mat) -> VisionResult<Frame> {
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(bgr, &mut rgb, imgproc::COLOR_BGR2RGB)
        .map_err(|e| VisionError::capture_failed(format!("Color conversion: {e}")))?;

    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let bytes = rgb
        .data_bytes()
        .map_err(|e| VisionError::capture_failed(format!("Frame data: {e}")))?;

    Frame::from_raw(width, height, bytes.to_vec())
        .ok_or_else(|| VisionError::capture_failed("Frame buffer size mismatch"))
}

/// Grayscale OpenCV matrix of an RGB frame, as the cascades expect.
fn frame_to_gray(frame: &Frame) -> VisionResult<Mat> {
    let flat = Mat::from_slice(frame.as_raw())
        .map_err(|e| VisionError::detection_failed(format!("Frame buffer: {e}")))?;
    let rgb = flat
        .reshape(3, frame.height() as i32)
        .and_then(|shaped| shaped.try_clone())
        .map_err(|e| VisionError::detection_failed(format!("Frame reshape: {e}")))?;

    let mut gray = Mat::default();
    imgproc::cvt_color_def(&rgb, &mut gray, imgproc::COLOR_RGB2GRAY)
        .map_err(|e| VisionError::detection_failed(format!("Grayscale conversion: {e}")))?;
    Ok(gray)
}

/// Haar cascade detector with one classifier per class.
pub struct HaarCascadeDetector {
    classifiers: Vec<(DetectionClass, CascadeClassifier)>,
    classes: Vec<DetectionClass>,
    scale_factor: f64,
    min_neighbors: i32,
}

impl HaarCascadeDetector {
    /// Load a classifier for every class. Fails if any model is missing.
    pub fn new(config: &CascadeConfig) -> VisionResult<Self> {
        let mut classifiers = Vec::with_capacity(DetectionClass::ALL.len());

        for class in DetectionClass::ALL {
            let path = config.model_for(*class);
            if !path.exists() {
                return Err(VisionError::model_not_found(path));
            }

            let classifier = CascadeClassifier::new(&path.to_string_lossy())
                .map_err(|e| VisionError::detection_failed(format!("Load {}: {e}", path.display())))?;
            if classifier.empty().unwrap_or(true) {
                return Err(VisionError::model_not_found(path));
            }

            info!(class = %class, model = %path.display(), "Cascade loaded");
            classifiers.push((*class, classifier));
        }

        Ok(Self {
            classes: classifiers.iter().map(|(class, _)| *class).collect(),
            classifiers,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
        })
    }
}

impl Detector for HaarCascadeDetector {
    fn detect(&mut self, frame: &Frame, class: DetectionClass) -> VisionResult<Vec<BoundingBox>> {
        let gray = frame_to_gray(frame)?;
        let classifier = self
            .classifiers
            .iter_mut()
            .find(|(c, _)| *c == class)
            .map(|(_, classifier)| classifier)
            .ok_or_else(|| VisionError::detection_failed(format!("No cascade for {class}")))?;

        let mut found = Vector::<Rect>::new();
        classifier
            .detect_multi_scale(
                &gray,
                &mut found,
                self.scale_factor,
                self.min_neighbors,
                0,
                Size::default(),
                Size::default(),
            )
            .map_err(|e| VisionError::detection_failed(format!("{class} cascade: {e}")))?;

        Ok(found
            .iter()
            .map(|r| BoundingBox::from_signed(r.x, r.y, r.width, r.height))
            .collect())
    }

    fn classes(&self) -> &[DetectionClass] {
        &self.classes
    }

    fn name(&self) -> &'static str {
        "haar_cascade"
    }
}
