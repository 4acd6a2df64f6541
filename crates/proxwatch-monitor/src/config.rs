//! Monitor configuration.
//!
//! Values come from defaults, then `PROXWATCH_*` environment variables, then
//! command-line flags.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use proxwatch_notify::{SmtpConfig, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use proxwatch_sensor::SamplerConfig;
use proxwatch_vision::{CameraConfig, CascadeConfig};

use crate::cli::Cli;
use crate::error::{MonitorError, MonitorResult};
use crate::retry::RetryConfig;
use crate::trigger::{AlertSettings, CaptureLimits, TriggerState};

/// Monitor configuration.
#[derive(Clone)]
pub struct MonitorConfig {
    /// Alert destination address
    pub recipient: String,
    /// Sender address and SMTP login
    pub sender: String,
    /// SMTP credential
    pub password: String,
    /// Activation distance in centimeters (exclusive)
    pub threshold_cm: f64,
    /// Delay between distance polls
    pub scan_interval: Duration,
    /// Minimum time between successful alerts
    pub cooldown: Duration,
    pub sampler: SamplerConfig,
    /// BCM trigger line
    pub trigger_pin: u8,
    /// BCM echo line
    pub echo_pin: u8,
    pub camera: CameraConfig,
    pub cascades: CascadeConfig,
    pub capture: CaptureLimits,
    /// Where detection frames are written
    pub capture_dir: PathBuf,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Extra send attempts for transient SMTP failures
    pub notify_retries: u32,
    /// Prometheus listener, disabled when unset
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            sender: String::new(),
            password: String::new(),
            threshold_cm: 100.0,
            scan_interval: Duration::from_secs(5),
            cooldown: Duration::from_secs(15),
            sampler: SamplerConfig::default(),
            trigger_pin: 4,
            echo_pin: 17,
            camera: CameraConfig::default(),
            cascades: CascadeConfig::default(),
            capture: CaptureLimits::default(),
            capture_dir: PathBuf::from("."),
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            notify_retries: 2,
            metrics_addr: None,
        }
    }
}

impl fmt::Debug for MonitorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorConfig")
            .field("recipient", &self.recipient)
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("threshold_cm", &self.threshold_cm)
            .field("scan_interval", &self.scan_interval)
            .field("cooldown", &self.cooldown)
            .field("sampler", &self.sampler)
            .field("trigger_pin", &self.trigger_pin)
            .field("echo_pin", &self.echo_pin)
            .field("camera", &self.camera)
            .field("cascades", &self.cascades)
            .field("capture", &self.capture)
            .field("capture_dir", &self.capture_dir)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("notify_retries", &self.notify_retries)
            .field("metrics_addr", &self.metrics_addr)
            .finish()
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_secs(name: &str) -> Option<Duration> {
    env_parse::<f64>(name).and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

fn env_millis(name: &str) -> Option<Duration> {
    env_parse::<u64>(name).map(Duration::from_millis)
}

fn secs_arg(flag: &str, secs: f64) -> MonitorResult<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| MonitorError::config(format!("--{flag} must be a non-negative number of seconds")))
}

impl MonitorConfig {
    /// Create config from environment variables. Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            threshold_cm: env_parse("PROXWATCH_THRESHOLD_CM").unwrap_or(defaults.threshold_cm),
            scan_interval: env_secs("PROXWATCH_SCAN_SECS").unwrap_or(defaults.scan_interval),
            cooldown: env_secs("PROXWATCH_COOLDOWN_SECS").unwrap_or(defaults.cooldown),
            sampler: SamplerConfig {
                sample_size: env_parse("PROXWATCH_SAMPLE_SIZE")
                    .unwrap_or(defaults.sampler.sample_size),
                settle_time: env_millis("PROXWATCH_SETTLE_MS")
                    .unwrap_or(defaults.sampler.settle_time),
                echo_timeout: env_millis("PROXWATCH_ECHO_TIMEOUT_MS")
                    .unwrap_or(defaults.sampler.echo_timeout),
            },
            trigger_pin: env_parse("PROXWATCH_TRIGGER_PIN").unwrap_or(defaults.trigger_pin),
            echo_pin: env_parse("PROXWATCH_ECHO_PIN").unwrap_or(defaults.echo_pin),
            camera: CameraConfig {
                device_index: env_parse("PROXWATCH_CAMERA_INDEX")
                    .unwrap_or(defaults.camera.device_index),
                ..defaults.camera
            },
            cascades: CascadeConfig {
                face_model: std::env::var("PROXWATCH_FACE_CASCADE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.cascades.face_model),
                body_model: std::env::var("PROXWATCH_BODY_CASCADE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.cascades.body_model),
                ..defaults.cascades
            },
            capture: CaptureLimits {
                max_frames: env_parse("PROXWATCH_CAPTURE_MAX_FRAMES")
                    .unwrap_or(defaults.capture.max_frames),
                max_duration: env_secs("PROXWATCH_CAPTURE_TIMEOUT_SECS")
                    .unwrap_or(defaults.capture.max_duration),
            },
            capture_dir: std::env::var("PROXWATCH_CAPTURE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.capture_dir),
            smtp_host: std::env::var("PROXWATCH_SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: env_parse("PROXWATCH_SMTP_PORT").unwrap_or(defaults.smtp_port),
            notify_retries: env_parse("PROXWATCH_NOTIFY_RETRIES")
                .unwrap_or(defaults.notify_retries),
            metrics_addr: env_parse("PROXWATCH_METRICS_ADDR"),
            ..defaults
        }
    }

    /// Apply command-line values on top of the current settings.
    pub fn apply_cli(&mut self, cli: &Cli) -> MonitorResult<()> {
        self.recipient = cli.email.clone();
        self.sender = cli.sender.clone();
        self.password = cli.password.clone();

        if let Some(threshold) = cli.threshold {
            self.threshold_cm = threshold;
        }
        if let Some(scan) = cli.scan {
            self.scan_interval = secs_arg("scan", scan)?;
        }
        if let Some(cooldown) = cli.cooldown {
            self.cooldown = secs_arg("cooldown", cooldown)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> MonitorResult<()> {
        if self.recipient.trim().is_empty() {
            return Err(MonitorError::config("recipient address is required"));
        }
        if self.sender.trim().is_empty() {
            return Err(MonitorError::config("sender address is required"));
        }
        if self.password.is_empty() {
            return Err(MonitorError::config("sender credential is required"));
        }
        if !self.threshold_cm.is_finite() || self.threshold_cm <= 0.0 {
            return Err(MonitorError::config("threshold must be a positive distance"));
        }
        if self.scan_interval.is_zero() {
            return Err(MonitorError::config("scan interval must be non-zero"));
        }
        if self.capture.max_frames == 0 {
            return Err(MonitorError::config("capture frame budget must be at least 1"));
        }
        if self.capture.max_duration.is_zero() {
            return Err(MonitorError::config("capture timeout must be non-zero"));
        }
        if self.trigger_pin == self.echo_pin {
            return Err(MonitorError::config("trigger and echo pins must differ"));
        }
        self.sampler
            .validate()
            .map_err(|e| MonitorError::config(e.to_string()))
    }

    pub fn smtp_config(&self) -> SmtpConfig {
        SmtpConfig {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            sender: self.sender.clone(),
            password: self.password.clone(),
        }
    }

    pub fn trigger_state(&self) -> TriggerState {
        TriggerState::new(self.threshold_cm, self.cooldown)
    }

    pub fn alert_settings(&self) -> AlertSettings {
        AlertSettings {
            recipient: self.recipient.clone(),
            capture_dir: self.capture_dir.clone(),
            retry: RetryConfig::new("alert_dispatch").with_max_retries(self.notify_retries),
        }
    }
}
