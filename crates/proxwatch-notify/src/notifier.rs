//! Notifier abstraction.

use async_trait::async_trait;

use crate::error::NotifyResult;
use crate::message::AlertMessage;

/// Delivers alert messages.
///
/// `send` resolves only once delivery is confirmed, so callers can tie
/// their own state changes to its success.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> NotifyResult<()>;

    /// Notifier name for logging.
    fn name(&self) -> &'static str;
}
