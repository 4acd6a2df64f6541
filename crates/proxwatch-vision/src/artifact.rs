//! Detection frame persistence.
//!
//! The annotated frame of a detection is written once as
//! `detection_<timestamp>.png` so it can be attached to the alert.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use proxwatch_models::DetectionEvent;
use tracing::debug;

use crate::error::VisionResult;

/// Where the frame of `event` is written inside `dir`.
pub fn artifact_path(dir: &Path, event: &DetectionEvent) -> PathBuf {
    dir.join(event.artifact_file_name())
}

/// Write the event frame as PNG, creating `dir` if needed.
pub fn save_detection_frame(dir: &Path, event: &DetectionEvent) -> VisionResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = artifact_path(dir, event);
    event.frame.save_with_format(&path, ImageFormat::Png)?;

    debug!(
        path = %path.display(),
        width = event.frame.width(),
        height = event.frame.height(),
        "Detection frame saved"
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use image::Rgb;
    use proxwatch_models::Frame;

    fn event() -> DetectionEvent {
        let mut frame = Frame::new(16, 12);
        frame.put_pixel(3, 4, Rgb([200, 10, 10]));
        DetectionEvent {
            frame,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            distance_cm: 42.0,
            detections: Vec::new(),
        }
    }

    #[test]
    fn test_save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("captures");
        let event = event();

        let path = save_detection_frame(&nested, &event).unwrap();

        assert_eq!(path, nested.join("detection_2024-01-02_03-04-05.000000.png"));
        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded.dimensions(), (16, 12));
        assert_eq!(*reloaded.get_pixel(3, 4), Rgb([200, 10, 10]));
    }
}
