//! Alert messages.

use std::path::{Path, PathBuf};

use crate::error::{NotifyError, NotifyResult};

/// A fully specified alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub recipient: String,
    pub subject: String,
    pub plain_body: String,
    pub rich_body: Option<String>,
    /// Files attached in order.
    pub attachments: Vec<PathBuf>,
}

impl AlertMessage {
    pub fn builder() -> AlertMessageBuilder {
        AlertMessageBuilder::default()
    }
}

/// Builder for `AlertMessage`.
///
/// Attachments are checked for existence when added and kept in the order
/// they were added.
#[derive(Debug, Clone, Default)]
pub struct AlertMessageBuilder {
    recipient: Option<String>,
    subject: Option<String>,
    plain_body: Option<String>,
    rich_body: Option<String>,
    attachments: Vec<PathBuf>,
}

impl AlertMessageBuilder {
    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn plain_body(mut self, body: impl Into<String>) -> Self {
        self.plain_body = Some(body.into());
        self
    }

    pub fn rich_body(mut self, body: impl Into<String>) -> Self {
        self.rich_body = Some(body.into());
        self
    }

    /// Append an attachment. Fails if `path` is not an existing file.
    pub fn attachment(mut self, path: impl AsRef<Path>) -> NotifyResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(NotifyError::AttachmentNotFound(path.to_path_buf()));
        }
        self.attachments.push(path.to_path_buf());
        Ok(self)
    }

    pub fn build(self) -> NotifyResult<AlertMessage> {
        let recipient = non_empty(self.recipient, "recipient")?;
        let subject = non_empty(self.subject, "subject")?;
        let plain_body = non_empty(self.plain_body, "plain_body")?;

        Ok(AlertMessage {
            recipient,
            subject,
            plain_body,
            rich_body: self.rich_body,
            attachments: self.attachments,
        })
    }
}

fn non_empty(value: Option<String>, field: &'static str) -> NotifyResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(NotifyError::MissingField(field)),
    }
}
