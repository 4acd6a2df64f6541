//! Alert delivery for the proxwatch monitor.
//!
//! This crate provides:
//! - `AlertMessage` and its validating builder
//! - The `Notifier` trait the monitor dispatches through
//! - An SMTP notifier over implicit TLS

pub mod error;
pub mod message;
pub mod notifier;
pub mod smtp;

pub use error::{NotifyError, NotifyResult};
pub use message::{AlertMessage, AlertMessageBuilder};
pub use notifier::Notifier;
pub use smtp::{compose_email, SmtpConfig, SmtpNotifier, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
