//! SMTP delivery over implicit TLS.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::error::{NotifyError, NotifyResult};
use crate::message::AlertMessage;
use crate::notifier::Notifier;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// SMTP relay settings. The sender address doubles as the login name.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
}

impl SmtpConfig {
    pub fn new(sender: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            sender: sender.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Notifier sending alerts through an authenticated SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpNotifier {
    /// Build the transport. No connection is made until the first send.
    pub fn new(config: SmtpConfig) -> NotifyResult<Self> {
        let sender: Mailbox = config
            .sender
            .parse()
            .map_err(|e| NotifyError::invalid_address(format!("{}: {e}", config.sender)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| NotifyError::transport(format!("Relay {}: {e}", config.host)))?
            .port(config.port)
            .credentials(Credentials::new(config.sender.clone(), config.password.clone()))
            .build();

        info!(host = %config.host, port = config.port, "SMTP notifier configured");
        Ok(Self { transport, sender })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: &AlertMessage) -> NotifyResult<()> {
        let email = compose_email(&self.sender, message).await?;
        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::transport(e.to_string()))?;

        info!(
            recipient = %message.recipient,
            attachments = message.attachments.len(),
            "Alert email sent"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Build the MIME message: text (plain, or plain+HTML alternative) followed by attachments.
pub async fn compose_email(sender: &Mailbox, message: &AlertMessage) -> NotifyResult<Message> {
    let recipient: Mailbox = message
        .recipient
        .parse()
        .map_err(|e| NotifyError::invalid_address(format!("{}: {e}", message.recipient)))?;

    let mut parts = match &message.rich_body {
        Some(html) => MultiPart::mixed().multipart(MultiPart::alternative_plain_html(
            message.plain_body.clone(),
            html.clone(),
        )),
        None => MultiPart::mixed().singlepart(SinglePart::plain(message.plain_body.clone())),
    };

    for path in &message.attachments {
        let body = tokio::fs::read(path).await?;
        let content_type = ContentType::parse(content_type_for(path))
            .map_err(|e| NotifyError::build(format!("Content type: {e}")))?;
        debug!(path = %path.display(), bytes = body.len(), "Attaching file");
        parts = parts.singlepart(Attachment::new(file_name(path)).body(body, content_type));
    }

    Message::builder()
        .from(sender.clone())
        .to(recipient)
        .subject(message.subject.clone())
        .multipart(parts)
        .map_err(|e| NotifyError::build(e.to_string()))
}

/// MIME type guessed from the file extension.
///
/// Only covers what the monitor attaches (PNG frames, plus JPEG and text).
/// Anything else goes out as `application/octet-stream`.
fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn sender() -> Mailbox {
        "camera@example.com".parse().unwrap()
    }

    #[tokio::test]
    async fn test_compose_with_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let frame = dir.path().join("frame.png");
        std::fs::write(&frame, [0x89, b'P', b'N', b'G']).unwrap();

        let message = AlertMessage::builder()
            .recipient("owner@example.com")
            .subject("Security Camera Alert")
            .plain_body("ALERT: activity")
            .rich_body("<p>ALERT: activity</p>")
            .attachment(&frame)
            .unwrap()
            .build()
            .unwrap();

        let email = assert_ok!(compose_email(&sender(), &message).await);
        let raw = String::from_utf8_lossy(&email.formatted()).into_owned();

        assert!(raw.contains("Subject: Security Camera Alert"));
        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("frame.png"));
        assert!(raw.contains("image/png"));
        assert!(raw.contains("text/html"));
    }

    #[tokio::test]
    async fn test_compose_plain_only() {
        let message = AlertMessage::builder()
            .recipient("owner@example.com")
            .subject("Alert")
            .plain_body("plain text")
            .build()
            .unwrap();

        let email = assert_ok!(compose_email(&sender(), &message).await);
        let raw = String::from_utf8_lossy(&email.formatted()).into_owned();
        assert!(raw.contains("plain text"));
        assert!(!raw.contains("text/html"));
    }

    #[tokio::test]
    async fn test_compose_rejects_bad_recipient() {
        let message = AlertMessage {
            recipient: "not an address".to_string(),
            subject: "Alert".to_string(),
            plain_body: "body".to_string(),
            rich_body: None,
            attachments: Vec::new(),
        };
        let err = assert_err!(compose_email(&sender(), &message).await);
        assert!(matches!(err, NotifyError::InvalidAddress(_)));
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(content_type_for(Path::new("a/detection.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("clip.bin")), "application/octet-stream");
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let config = SmtpConfig::new("camera@example.com", "hunter2");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("smtp.gmail.com"));
    }
}
