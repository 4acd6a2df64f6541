//! Ranging device abstraction.

use std::time::Duration;

use crate::error::SensorResult;

/// A trigger/echo ranging sensor.
///
/// One reading is a `trigger_pulse` followed by a `read_echo_edge`. Every
/// wait on the echo line must give up once `timeout` has passed.
pub trait RangingDevice {
    /// Drive the trigger line low, wait `settle_time`, then emit the trigger pulse.
    fn trigger_pulse(&mut self, settle_time: Duration) -> SensorResult<()>;

    /// Width of the next echo pulse (low→high to high→low).
    ///
    /// Returns `SensorError::Timeout` if either edge is not seen within `timeout`.
    fn read_echo_edge(&mut self, timeout: Duration) -> SensorResult<Duration>;
}

impl<T: RangingDevice + ?Sized> RangingDevice for Box<T> {
    fn trigger_pulse(&mut self, settle_time: Duration) -> SensorResult<()> {
        (**self).trigger_pulse(settle_time)
    }

    fn read_echo_edge(&mut self, timeout: Duration) -> SensorResult<Duration> {
        (**self).read_echo_edge(timeout)
    }
}

impl<T: RangingDevice + ?Sized> RangingDevice for &mut T {
    fn trigger_pulse(&mut self, settle_time: Duration) -> SensorResult<()> {
        (**self).trigger_pulse(settle_time)
    }

    fn read_echo_edge(&mut self, timeout: Duration) -> SensorResult<Duration> {
        (**self).read_echo_edge(timeout)
    }
}
