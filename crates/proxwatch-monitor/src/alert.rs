//! Alert message text.

use std::path::Path;

use proxwatch_models::DetectionEvent;
use proxwatch_notify::{AlertMessage, NotifyResult};

pub const ALERT_SUBJECT: &str = "Security Camera Alert";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn timestamp(event: &DetectionEvent) -> String {
    event.timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn distance(event: &DetectionEvent) -> String {
    format!("{:.2} cm", event.distance_cm)
}

pub fn plain_body(event: &DetectionEvent) -> String {
    format!(
        "ALERT: security camera detected activity at {} from a distance of {}",
        timestamp(event),
        distance(event)
    )
}

pub fn rich_body(event: &DetectionEvent) -> String {
    let detected: Vec<String> = event
        .detections
        .iter()
        .map(|d| format!("{} {}", d.boxes.len(), d.class.plural()))
        .collect();

    format!(
        "<html><body>\
         <h2>Security Camera Alert</h2>\
         <p>Activity detected at <strong>{}</strong> from a distance of <strong>{}</strong>.</p>\
         <p>Matched: {}</p>\
         <p>The captured frame is attached.</p>\
         </body></html>",
        timestamp(event),
        distance(event),
        detected.join(", ")
    )
}

/// Build the alert for `event` with its persisted frame attached.
pub fn compose_alert(
    event: &DetectionEvent,
    recipient: &str,
    attachment: &Path,
) -> NotifyResult<AlertMessage> {
    AlertMessage::builder()
        .recipient(recipient)
        .subject(ALERT_SUBJECT)
        .plain_body(plain_body(event))
        .rich_body(rich_body(event))
        .attachment(attachment)?
        .build()
}
