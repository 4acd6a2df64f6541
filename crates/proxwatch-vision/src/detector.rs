//! Subject detection.

use std::path::{Path, PathBuf};

use proxwatch_models::{BoundingBox, ClassDetections, DetectionClass, Frame};

use crate::error::VisionResult;

/// Detector over a fixed set of classes.
///
/// Implementations are constructed once and injected into the monitor;
/// model state lives inside the detector value.
pub trait Detector {
    /// Boxes matching `class` in `frame`. Empty when nothing matched.
    fn detect(&mut self, frame: &Frame, class: DetectionClass) -> VisionResult<Vec<BoundingBox>>;

    /// Classes this detector was configured for.
    fn classes(&self) -> &[DetectionClass];

    /// Detector name for logging.
    fn name(&self) -> &'static str;
}

/// Run every configured class against `frame`, keeping only classes that matched.
pub fn detect_all<D: Detector + ?Sized>(
    detector: &mut D,
    frame: &Frame,
) -> VisionResult<Vec<ClassDetections>> {
    let classes = detector.classes().to_vec();
    let mut matched = Vec::new();
    for class in classes {
        let boxes = detector.detect(frame, class)?;
        if !boxes.is_empty() {
            matched.push(ClassDetections::new(class, boxes));
        }
    }
    Ok(matched)
}

/// Haar cascade model locations and tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeConfig {
    pub face_model: PathBuf,
    pub body_model: PathBuf,
    pub scale_factor: f64,
    pub min_neighbors: i32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            face_model: PathBuf::from("./opencv_models/haarcascade_frontalface_default.xml"),
            body_model: PathBuf::from("./opencv_models/haarcascade_fullbody.xml"),
            scale_factor: 1.3,
            min_neighbors: 5,
        }
    }
}

impl CascadeConfig {
    /// Model file for a class.
    pub fn model_for(&self, class: DetectionClass) -> &Path {
        match class {
            DetectionClass::Face => &self.face_model,
            DetectionClass::Body => &self.body_model,
        }
    }
}
