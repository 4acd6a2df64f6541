//! Hardware wiring.

use proxwatch_sensor::RangingDevice;
use proxwatch_vision::{CaptureSource, Detector};

use crate::config::MonitorConfig;
use crate::error::MonitorResult;

/// The monitor's hardware collaborators.
pub struct Devices {
    pub ranging: Box<dyn RangingDevice>,
    pub camera: Box<dyn CaptureSource>,
    pub detector: Box<dyn Detector>,
}

/// Claim the GPIO lines, check the camera opens and load the cascades.
#[cfg(feature = "hardware")]
pub fn open_devices(config: &MonitorConfig) -> MonitorResult<Devices> {
    use proxwatch_sensor::rpi::open_hcsr04;
    use proxwatch_vision::{HaarCascadeDetector, OpenCvCamera};

    let ranging = open_hcsr04(config.trigger_pin, config.echo_pin)?;

    let mut camera = OpenCvCamera::new(config.camera.clone());
    camera.probe()?;

    let detector = HaarCascadeDetector::new(&config.cascades)?;

    Ok(Devices {
        ranging: Box::new(ranging),
        camera: Box::new(camera),
        detector: Box::new(detector),
    })
}

#[cfg(not(feature = "hardware"))]
pub fn open_devices(_config: &MonitorConfig) -> MonitorResult<Devices> {
    Err(crate::error::MonitorError::startup(
        "built without the `hardware` feature: no sensor or camera backend available",
    ))
}
