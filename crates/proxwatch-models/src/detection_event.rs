//! Per-cycle detection results.

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::bounding_box::BoundingBox;
use crate::detection_class::DetectionClass;

/// Captured RGB8 frame.
pub type Frame = RgbImage;

/// Boxes matched for a single class in one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDetections {
    pub class: DetectionClass,
    pub boxes: Vec<BoundingBox>,
}

impl ClassDetections {
    pub fn new(class: DetectionClass, boxes: Vec<BoundingBox>) -> Self {
        Self { class, boxes }
    }
}

/// A frame in which at least one class matched.
///
/// Built once per capture cycle and consumed by alert dispatch. The frame
/// already carries the outlines of every matched box.
#[derive(Debug, Clone)]
pub struct DetectionEvent {
    pub frame: Frame,
    pub timestamp: DateTime<Utc>,
    pub distance_cm: f64,
    pub detections: Vec<ClassDetections>,
}

impl DetectionEvent {
    /// Total number of boxes across all classes.
    pub fn total_matches(&self) -> usize {
        self.detections.iter().map(|d| d.boxes.len()).sum()
    }

    /// Number of boxes for one class.
    pub fn matches_for(&self, class: DetectionClass) -> usize {
        self.detections
            .iter()
            .filter(|d| d.class == class)
            .map(|d| d.boxes.len())
            .sum()
    }

    /// File name of the persisted frame: `detection_<timestamp>.png`.
    pub fn artifact_file_name(&self) -> String {
        format!(
            "detection_{}.png",
            self.timestamp.format("%Y-%m-%d_%H-%M-%S%.6f")
        )
    }

    /// Serializable view of the event without pixel data.
    pub fn summary(&self) -> DetectionSummary {
        DetectionSummary {
            timestamp: self.timestamp,
            distance_cm: self.distance_cm,
            width: self.frame.width(),
            height: self.frame.height(),
            detections: self.detections.clone(),
        }
    }
}

/// Frame-less description of a detection, suitable for structured logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub timestamp: DateTime<Utc>,
    pub distance_cm: f64,
    pub width: u32,
    pub height: u32,
    pub detections: Vec<ClassDetections>,
}
