//! Raspberry Pi GPIO setup for the HC-SR04.
//!
//! Pins use BCM numbering. The lines are reset when the driver is dropped.

use rppal::gpio::{Gpio, InputPin, OutputPin};
use tracing::info;

use crate::error::{SensorError, SensorResult};
use crate::hcsr04::Hcsr04;

/// HC-SR04 wired to Raspberry Pi GPIO lines.
pub type RpiHcsr04 = Hcsr04<OutputPin, InputPin>;

/// Claim the trigger and echo lines and build the driver.
pub fn open_hcsr04(trigger_pin: u8, echo_pin: u8) -> SensorResult<RpiHcsr04> {
    let gpio = Gpio::new().map_err(|e| SensorError::init(format!("GPIO unavailable: {e}")))?;
    let trigger = gpio
        .get(trigger_pin)
        .map_err(|e| SensorError::init(format!("Trigger pin {trigger_pin}: {e}")))?
        .into_output_low();
    let echo = gpio
        .get(echo_pin)
        .map_err(|e| SensorError::init(format!("Echo pin {echo_pin}: {e}")))?
        .into_input();

    info!(trigger_pin, echo_pin, "HC-SR04 GPIO lines claimed");
    Ok(Hcsr04::new(trigger, echo))
}
