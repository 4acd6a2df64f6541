//! Noise-tolerant distance sampling.
//!
//! A measurement takes `sample_size` readings in sequence. Readings whose echo
//! never arrived are kept as invalid samples instead of aborting the batch;
//! the reported distance is the mean of the valid ones only. A batch with no
//! valid reading fails with `SensorError::NoValidSamples`.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::device::RangingDevice;
use crate::error::{SensorError, SensorResult};

/// Half the speed of sound in cm/s: echo seconds to one-way centimeters.
pub const CM_PER_ECHO_SECOND: f64 = 17150.0;

/// Raw value reported for a reading without an echo.
pub const INVALID_SAMPLE: f64 = -1.0;

/// One reading from the ranging device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangingSample {
    /// Distance in centimeters.
    Valid(f64),
    /// No echo within the bounded wait, or the pins failed.
    Invalid,
}

impl RangingSample {
    /// Interpret a raw reading; negative or non-finite values are invalid.
    pub fn from_raw(centimeters: f64) -> Self {
        if centimeters.is_finite() && centimeters >= 0.0 {
            RangingSample::Valid(centimeters)
        } else {
            RangingSample::Invalid
        }
    }

    /// Convert an echo pulse width to centimeters, rounded to 2 decimals.
    pub fn from_echo(width: Duration) -> Self {
        let centimeters = width.as_secs_f64() * CM_PER_ECHO_SECOND;
        RangingSample::from_raw((centimeters * 100.0).round() / 100.0)
    }

    /// Raw value, with `INVALID_SAMPLE` standing in for invalid readings.
    pub fn as_raw(&self) -> f64 {
        match self {
            RangingSample::Valid(cm) => *cm,
            RangingSample::Invalid => INVALID_SAMPLE,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, RangingSample::Valid(_))
    }
}

/// Mean of the valid samples of one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilteredDistance {
    pub centimeters: f64,
    pub valid_samples: usize,
    pub total_samples: usize,
}

/// Reduce a batch to the mean of its valid samples.
pub fn filter_samples(samples: &[RangingSample]) -> SensorResult<FilteredDistance> {
    let (sum, valid) = samples
        .iter()
        .filter_map(|sample| match sample {
            RangingSample::Valid(cm) => Some(*cm),
            RangingSample::Invalid => None,
        })
        .fold((0.0, 0usize), |(sum, count), cm| (sum + cm, count + 1));

    if valid == 0 {
        return Err(SensorError::NoValidSamples {
            batch_size: samples.len(),
        });
    }

    Ok(FilteredDistance {
        centimeters: sum / valid as f64,
        valid_samples: valid,
        total_samples: samples.len(),
    })
}

/// Sampling configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Readings per measurement.
    pub sample_size: usize,
    /// Trigger-low time before each pulse.
    pub settle_time: Duration,
    /// Maximum wait for each echo edge.
    pub echo_timeout: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_size: 3,
            settle_time: Duration::from_secs(1),
            // 4m maximum range is ~23ms of echo; leave headroom.
            echo_timeout: Duration::from_millis(40),
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> SensorResult<()> {
        if self.sample_size == 0 {
            return Err(SensorError::invalid_config("sample_size must be at least 1"));
        }
        if self.echo_timeout.is_zero() {
            return Err(SensorError::invalid_config("echo_timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Takes batches of readings from a ranging device.
pub struct DistanceSampler<D> {
    device: D,
    config: SamplerConfig,
}

impl<D: RangingDevice> DistanceSampler<D> {
    pub fn new(device: D, config: SamplerConfig) -> SensorResult<Self> {
        config.validate()?;
        Ok(Self { device, config })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Take one reading. Device failures become `RangingSample::Invalid`.
    pub fn sample(&mut self) -> RangingSample {
        let reading = self
            .device
            .trigger_pulse(self.config.settle_time)
            .and_then(|_| self.device.read_echo_edge(self.config.echo_timeout));

        match reading {
            Ok(width) => RangingSample::from_echo(width),
            Err(e) if e.is_per_sample() => {
                trace!(error = %e, "Discarding ranging sample");
                RangingSample::Invalid
            }
            Err(e) => {
                warn!(error = %e, "Ranging device failed; discarding sample");
                RangingSample::Invalid
            }
        }
    }

    /// Take `sample_size` readings and return the mean of the valid ones.
    pub fn measure(&mut self) -> SensorResult<FilteredDistance> {
        let samples: Vec<RangingSample> =
            (0..self.config.sample_size).map(|_| self.sample()).collect();
        let distance = filter_samples(&samples)?;

        debug!(
            distance_cm = distance.centimeters,
            valid = distance.valid_samples,
            total = distance.total_samples,
            "Distance measured"
        );

        Ok(distance)
    }

    pub fn into_inner(self) -> D {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Device replaying a script of echo results.
    struct ScriptedDevice {
        echoes: VecDeque<SensorResult<Duration>>,
        pulses: usize,
    }

    impl ScriptedDevice {
        fn new(echoes: Vec<SensorResult<Duration>>) -> Self {
            Self {
                echoes: echoes.into(),
                pulses: 0,
            }
        }
    }

    impl RangingDevice for ScriptedDevice {
        fn trigger_pulse(&mut self, _settle_time: Duration) -> SensorResult<()> {
            self.pulses += 1;
            Ok(())
        }

        fn read_echo_edge(&mut self, timeout: Duration) -> SensorResult<Duration> {
            self.echoes
                .pop_front()
                .unwrap_or(Err(SensorError::Timeout(timeout)))
        }
    }

    fn fast_config(sample_size: usize) -> SamplerConfig {
        SamplerConfig {
            sample_size,
            settle_time: Duration::ZERO,
            echo_timeout: Duration::from_millis(1),
        }
    }

    fn raw(values: &[f64]) -> Vec<RangingSample> {
        values.iter().copied().map(RangingSample::from_raw).collect()
    }

    #[test]
    fn test_mean_excludes_invalid_samples() {
        let distance = filter_samples(&raw(&[12.3, -1.0, 13.0, -1.0, -1.0])).unwrap();
        assert!((distance.centimeters - 12.65).abs() < 1e-9);
        assert_eq!(distance.valid_samples, 2);
        assert_eq!(distance.total_samples, 5);
    }

    #[test]
    fn test_all_invalid_fails() {
        let err = filter_samples(&raw(&[-1.0; 5])).unwrap_err();
        assert!(matches!(err, SensorError::NoValidSamples { batch_size: 5 }));
    }

    #[test]
    fn test_empty_batch_fails() {
        assert!(filter_samples(&[]).is_err());
    }

    #[test]
    fn test_zero_is_a_valid_reading() {
        let distance = filter_samples(&raw(&[0.0, -1.0])).unwrap();
        assert_eq!(distance.centimeters, 0.0);
        assert_eq!(distance.valid_samples, 1);
    }

    #[test]
    fn test_non_finite_raw_is_invalid() {
        assert_eq!(RangingSample::from_raw(f64::NAN), RangingSample::Invalid);
        assert_eq!(RangingSample::Invalid.as_raw(), INVALID_SAMPLE);
    }

    #[test]
    fn test_echo_conversion_rounds_to_two_decimals() {
        // 1ms of echo = 17.15cm
        assert_eq!(
            RangingSample::from_echo(Duration::from_millis(1)),
            RangingSample::Valid(17.15)
        );
        // 1.2345ms = 21.171675cm
        assert_eq!(
            RangingSample::from_echo(Duration::from_nanos(1_234_500)),
            RangingSample::Valid(21.17)
        );
    }

    #[test]
    fn test_measure_skips_timed_out_readings() {
        let device = ScriptedDevice::new(vec![
            Ok(Duration::from_millis(1)),
            Err(SensorError::Timeout(Duration::from_millis(1))),
            Ok(Duration::from_millis(3)),
        ]);
        let mut sampler = DistanceSampler::new(device, fast_config(3)).unwrap();

        let distance = sampler.measure().unwrap();
        // (17.15 + 51.45) / 2
        assert!((distance.centimeters - 34.3).abs() < 1e-9);
        assert_eq!(distance.valid_samples, 2);
        assert_eq!(sampler.into_inner().pulses, 3);
    }

    #[test]
    fn test_measure_fails_without_echo() {
        let mut sampler = DistanceSampler::new(ScriptedDevice::new(vec![]), fast_config(3)).unwrap();
        let err = sampler.measure().unwrap_err();
        assert!(matches!(err, SensorError::NoValidSamples { batch_size: 3 }));
    }

    #[test]
    fn test_gpio_failure_counts_as_invalid() {
        let device = ScriptedDevice::new(vec![
            Err(SensorError::gpio("echo read failed")),
            Ok(Duration::from_millis(2)),
        ]);
        let mut sampler = DistanceSampler::new(device, fast_config(2)).unwrap();
        let distance = sampler.measure().unwrap();
        assert!((distance.centimeters - 34.3).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sample_size_rejected() {
        let result = DistanceSampler::new(ScriptedDevice::new(vec![]), fast_config(0));
        assert!(matches!(result, Err(SensorError::InvalidConfig(_))));
    }
}
