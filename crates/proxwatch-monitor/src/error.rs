//! Monitor error types.

use thiserror::Error;

use proxwatch_notify::NotifyError;
use proxwatch_sensor::SensorError;
use proxwatch_vision::VisionError;

pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Startup failed: {0}")]
    Startup(String),

    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    #[error("Capture error: {0}")]
    Capture(#[from] VisionError),

    #[error("Failed to persist detection frame: {0}")]
    Artifact(VisionError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Metrics exporter error: {0}")]
    Metrics(String),
}

impl MonitorError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Loop stage the error belongs to, for log context.
    pub fn stage(&self) -> &'static str {
        match self {
            MonitorError::Config(_) | MonitorError::Startup(_) | MonitorError::Metrics(_) => {
                "startup"
            }
            MonitorError::Sensor(_) => "sensor",
            MonitorError::Capture(_) => "capture",
            MonitorError::Artifact(_) | MonitorError::Notify(_) => "notify",
        }
    }
}
