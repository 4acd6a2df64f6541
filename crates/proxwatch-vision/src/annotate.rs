//! Bounding-box outlines on captured frames.

use image::Rgb;
use proxwatch_models::{BoundingBox, ClassDetections, DetectionClass, Frame};

/// Outline thickness in pixels.
pub const OUTLINE_THICKNESS: u32 = 2;

/// Outline color per class: bodies blue, faces cyan.
pub fn outline_color(class: DetectionClass) -> Rgb<u8> {
    match class {
        DetectionClass::Body => Rgb([0, 0, 255]),
        DetectionClass::Face => Rgb([0, 255, 255]),
    }
}

/// Draw a rectangle outline, clipped to the frame.
pub fn draw_outline(frame: &mut Frame, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    let Some(bbox) = bbox.clamp_to(frame.width(), frame.height()) else {
        return;
    };
    let thickness = thickness.min(bbox.width).min(bbox.height).max(1);

    for t in 0..thickness {
        let top = bbox.y + t;
        let bottom = bbox.bottom() - 1 - t;
        for x in bbox.x..bbox.right() {
            frame.put_pixel(x, top, color);
            frame.put_pixel(x, bottom, color);
        }

        let left = bbox.x + t;
        let right = bbox.right() - 1 - t;
        for y in bbox.y..bbox.bottom() {
            frame.put_pixel(left, y, color);
            frame.put_pixel(right, y, color);
        }
    }
}

/// Outline every matched box. Faces are drawn last.
pub fn annotate_frame(frame: &mut Frame, detections: &[ClassDetections]) {
    for class in [DetectionClass::Body, DetectionClass::Face] {
        let color = outline_color(class);
        for matched in detections.iter().filter(|d| d.class == class) {
            for bbox in &matched.boxes {
                draw_outline(frame, bbox, color, OUTLINE_THICKNESS);
            }
        }
    }
}
