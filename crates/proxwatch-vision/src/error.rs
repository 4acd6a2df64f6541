//! Error types for capture and detection.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),

    #[error("Camera returned an empty frame")]
    EmptyFrame,

    #[error("Detection failed: {0}")]
    DetectionFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VisionError {
    pub fn camera_unavailable(message: impl Into<String>) -> Self {
        Self::CameraUnavailable(message.into())
    }

    pub fn capture_failed(message: impl Into<String>) -> Self {
        Self::CaptureFailed(message.into())
    }

    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    pub fn model_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ModelNotFound(path.into())
    }
}
