//! Tracing setup and structured capture-cycle logging.

use tracing::{error, info, warn, Span};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

const DEFAULT_DIRECTIVES: &[&str] = &["proxwatch=info", "lettre=warn"];

/// Install the global subscriber.
///
/// Coloured output by default, JSON lines when `LOG_FORMAT=json`.
/// `RUST_LOG` is honoured on top of the defaults.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = DEFAULT_DIRECTIVES
        .iter()
        .filter_map(|d| d.parse::<Directive>().ok())
        .fold(EnvFilter::from_default_env(), |filter, directive| {
            filter.add_directive(directive)
        });

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Logger for one capture cycle.
///
/// Every line carries the cycle id and the distance that activated it, so a
/// cycle can be followed from activation to alert.
#[derive(Debug, Clone)]
pub struct CycleLogger {
    cycle_id: String,
    distance_cm: f64,
}

impl CycleLogger {
    pub fn new(distance_cm: f64) -> Self {
        Self {
            cycle_id: Uuid::new_v4().to_string(),
            distance_cm,
        }
    }

    pub fn log_start(&self) {
        info!(
            cycle_id = %self.cycle_id,
            distance_cm = self.distance_cm,
            "Capture cycle started"
        );
    }

    pub fn log_progress(&self, stage: &str, message: &str) {
        info!(
            cycle_id = %self.cycle_id,
            stage,
            "Cycle progress: {}", message
        );
    }

    pub fn log_warning(&self, stage: &str, message: &str) {
        warn!(
            cycle_id = %self.cycle_id,
            stage,
            "Cycle warning: {}", message
        );
    }

    pub fn log_error(&self, stage: &str, message: &str) {
        error!(
            cycle_id = %self.cycle_id,
            stage,
            "Cycle error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            cycle_id = %self.cycle_id,
            distance_cm = self.distance_cm,
            "Capture cycle completed: {}", message
        );
    }

    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "cycle",
            cycle_id = %self.cycle_id,
            distance_cm = self.distance_cm
        )
    }
}
