//! Shared data models for the proxwatch monitor.
//!
//! This crate provides the types exchanged between the sensor, vision,
//! notification and monitor crates:
//! - Detection classes and bounding boxes
//! - Captured frames
//! - Detection events produced by a capture cycle

pub mod bounding_box;
pub mod detection_class;
pub mod detection_event;

pub use bounding_box::BoundingBox;
pub use detection_class::DetectionClass;
pub use detection_event::{ClassDetections, DetectionEvent, DetectionSummary, Frame};
