//! Error types for distance sensing.

use std::time::Duration;
use thiserror::Error;

/// Result type for sensor operations.
pub type SensorResult<T> = Result<T, SensorError>;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("No valid samples in a batch of {batch_size}")]
    NoValidSamples { batch_size: usize },

    #[error("Echo edge not seen within {0:?}")]
    Timeout(Duration),

    #[error("GPIO error: {0}")]
    Gpio(String),

    #[error("Sensor initialization failed: {0}")]
    Init(String),

    #[error("Invalid sampler configuration: {0}")]
    InvalidConfig(String),
}

impl SensorError {
    pub fn gpio(message: impl Into<String>) -> Self {
        Self::Gpio(message.into())
    }

    pub fn init(message: impl Into<String>) -> Self {
        Self::Init(message.into())
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether the error affects only a single reading.
    pub fn is_per_sample(&self) -> bool {
        matches!(self, SensorError::Timeout(_) | SensorError::Gpio(_))
    }
}
