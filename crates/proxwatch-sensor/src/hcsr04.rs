//! HC-SR04 ultrasonic sensor driver.
//!
//! # Sensor Operation
//! - Trigger line held low for the settle time, then pulsed high for 10µs
//! - The sensor answers with an echo pulse whose width is the round-trip time
//! - Echo edges are polled against a deadline, so a missing echo (nothing in
//!   range, loose wire) surfaces as `SensorError::Timeout` instead of hanging
//!
//! The driver is generic over `embedded-hal` 1.0 digital pins, so it runs on
//! any board with a HAL and can be exercised with fake pins in tests.

use std::time::{Duration, Instant};

use embedded_hal::digital::{InputPin, OutputPin};
use tracing::trace;

use crate::device::RangingDevice;
use crate::error::{SensorError, SensorResult};

/// Width of the trigger pulse required by the HC-SR04 datasheet.
pub const TRIGGER_PULSE_WIDTH: Duration = Duration::from_micros(10);

/// HC-SR04 driver owning its trigger (output) and echo (input) lines.
pub struct Hcsr04<T, E> {
    trigger: T,
    echo: E,
}

impl<T: OutputPin, E: InputPin> Hcsr04<T, E> {
    pub fn new(trigger: T, echo: E) -> Self {
        Self { trigger, echo }
    }

    /// Give the pins back.
    pub fn release(self) -> (T, E) {
        (self.trigger, self.echo)
    }

    /// Poll the echo line until it reads `high`, or fail once `timeout` elapses.
    fn wait_for_echo(&mut self, high: bool, timeout: Duration) -> SensorResult<Instant> {
        let deadline = Instant::now() + timeout;
        loop {
            let level = self.echo.is_high().map_err(gpio_error)?;
            let now = Instant::now();
            if level == high {
                return Ok(now);
            }
            if now >= deadline {
                return Err(SensorError::Timeout(timeout));
            }
            std::hint::spin_loop();
        }
    }
}

impl<T: OutputPin, E: InputPin> RangingDevice for Hcsr04<T, E> {
    fn trigger_pulse(&mut self, settle_time: Duration) -> SensorResult<()> {
        self.trigger.set_low().map_err(gpio_error)?;
        if !settle_time.is_zero() {
            std::thread::sleep(settle_time);
        }
        self.trigger.set_high().map_err(gpio_error)?;
        std::thread::sleep(TRIGGER_PULSE_WIDTH);
        self.trigger.set_low().map_err(gpio_error)?;
        Ok(())
    }

    fn read_echo_edge(&mut self, timeout: Duration) -> SensorResult<Duration> {
        let rise = self.wait_for_echo(true, timeout)?;
        let fall = self.wait_for_echo(false, timeout)?;
        let width = fall.duration_since(rise);
        trace!(echo_us = width.as_micros() as u64, "Echo pulse measured");
        Ok(width)
    }
}

fn gpio_error<E: embedded_hal::digital::Error>(err: E) -> SensorError {
    SensorError::gpio(format!("{:?}", err.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use std::collections::VecDeque;
    use std::convert::Infallible;

    #[derive(Default)]
    struct RecordingPin {
        levels: Vec<bool>,
    }

    impl ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.push(true);
            Ok(())
        }
    }

    /// Echo line replaying a script of levels, holding the last one forever.
    struct ScriptedEcho {
        script: VecDeque<bool>,
        last: bool,
    }

    impl ScriptedEcho {
        fn new(levels: &[bool]) -> Self {
            Self {
                script: levels.iter().copied().collect(),
                last: false,
            }
        }
    }

    impl ErrorType for ScriptedEcho {
        type Error = Infallible;
    }

    impl InputPin for ScriptedEcho {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if let Some(level) = self.script.pop_front() {
                self.last = level;
            }
            Ok(self.last)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    #[derive(Debug)]
    struct BrokenPinError;

    impl embedded_hal::digital::Error for BrokenPinError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct BrokenEcho;

    impl ErrorType for BrokenEcho {
        type Error = BrokenPinError;
    }

    impl InputPin for BrokenEcho {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Err(BrokenPinError)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Err(BrokenPinError)
        }
    }

    #[test]
    fn test_trigger_pulse_sequence() {
        let mut sensor = Hcsr04::new(RecordingPin::default(), ScriptedEcho::new(&[]));
        sensor.trigger_pulse(Duration::ZERO).unwrap();
        let (trigger, _) = sensor.release();
        assert_eq!(trigger.levels, vec![false, true, false]);
    }

    #[test]
    fn test_echo_pulse_is_measured() {
        let echo = ScriptedEcho::new(&[false, false, true, true, true, false]);
        let mut sensor = Hcsr04::new(RecordingPin::default(), echo);
        let width = sensor.read_echo_edge(Duration::from_millis(50)).unwrap();
        assert!(width < Duration::from_millis(50));
    }

    #[test]
    fn test_missing_echo_times_out() {
        let mut sensor = Hcsr04::new(RecordingPin::default(), ScriptedEcho::new(&[false]));
        let err = sensor.read_echo_edge(Duration::from_millis(2)).unwrap_err();
        assert!(matches!(err, SensorError::Timeout(_)));
    }

    #[test]
    fn test_stuck_high_echo_times_out() {
        let echo = ScriptedEcho::new(&[false, true]);
        let mut sensor = Hcsr04::new(RecordingPin::default(), echo);
        let err = sensor.read_echo_edge(Duration::from_millis(2)).unwrap_err();
        assert!(matches!(err, SensorError::Timeout(_)));
    }

    #[test]
    fn test_pin_error_is_reported() {
        let mut sensor = Hcsr04::new(RecordingPin::default(), BrokenEcho);
        let err = sensor.read_echo_edge(Duration::from_millis(2)).unwrap_err();
        assert!(matches!(err, SensorError::Gpio(_)));
    }
}
