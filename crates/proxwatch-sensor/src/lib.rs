//! Distance sensing for the proxwatch monitor.
//!
//! This crate provides:
//! - The `RangingDevice` trait describing a trigger/echo ranging sensor
//! - An HC-SR04 driver over `embedded-hal` digital pins with bounded echo waits
//! - `DistanceSampler`, which reduces a batch of noisy readings to one distance
//! - Raspberry Pi pin setup behind the `rpi` feature

pub mod device;
pub mod error;
pub mod hcsr04;
#[cfg(feature = "rpi")]
pub mod rpi;
pub mod sampler;

pub use device::RangingDevice;
pub use error::{SensorError, SensorResult};
pub use hcsr04::Hcsr04;
pub use sampler::{
    filter_samples, DistanceSampler, FilteredDistance, RangingSample, SamplerConfig,
    CM_PER_ECHO_SECOND, INVALID_SAMPLE,
};
