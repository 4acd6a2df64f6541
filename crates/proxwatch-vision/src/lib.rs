//! Camera capture and subject detection.
//!
//! This crate provides:
//! - `CaptureSource` / `CaptureSession` traits with scoped camera sessions
//! - The `Detector` trait, polymorphic over `DetectionClass`
//! - Bounding-box annotation of captured frames
//! - Persistence of detection frames as PNG files
//! - OpenCV camera and Haar cascade backends behind the `opencv` feature

pub mod annotate;
pub mod artifact;
pub mod capture;
pub mod detector;
pub mod error;
#[cfg(feature = "opencv")]
pub mod opencv_backend;

pub use annotate::{annotate_frame, draw_outline, outline_color, OUTLINE_THICKNESS};
pub use artifact::{artifact_path, save_detection_frame};
pub use capture::{CameraConfig, CaptureSession, CaptureSource};
pub use detector::{detect_all, CascadeConfig, Detector};
pub use error::{VisionError, VisionResult};
#[cfg(feature = "opencv")]
pub use opencv_backend::{HaarCascadeDetector, OpenCvCamera};
