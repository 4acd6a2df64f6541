//! Proximity-triggered camera monitor.
//!
//! This crate ties the sensor, vision and notification crates together:
//! - Configuration from environment and command line
//! - The trigger state machine and capture cycles
//! - The monitoring loop with cooperative shutdown
//! - Structured logging, metrics and alert retry

pub mod alert;
pub mod cli;
pub mod clock;
pub mod config;
pub mod devices;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod retry;
pub mod trigger;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::Cli;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MonitorConfig;
pub use devices::{open_devices, Devices};
pub use error::{MonitorError, MonitorResult};
pub use logging::{init_tracing, CycleLogger};
pub use monitor::{Monitor, TickOutcome};
pub use retry::{retry_async, FailureTracker, RetryConfig, RetryResult};
pub use trigger::{
    AlertSettings, CaptureLimits, CycleOutcome, NoDetectionReason, TriggerController,
    TriggerPhase, TriggerState,
};
