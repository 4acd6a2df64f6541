//! Pixel-space bounding boxes reported by detectors.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a box from signed detector output, clamping negative origins to zero.
    pub fn from_signed(x: i32, y: i32, width: i32, height: i32) -> Self {
        let left = x.max(0);
        let top = y.max(0);
        let right = x.saturating_add(width).max(left);
        let bottom = y.saturating_add(height).max(top);
        Self::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        )
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersect with a `width` x `height` frame. Returns `None` when nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clamped = BoundingBox::new(
            self.x,
            self.y,
            self.right().min(width) - self.x,
            self.bottom().min(height) - self.y,
        );
        (!clamped.is_empty()).then_some(clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_signed_clamps_negative_origin() {
        let bbox = BoundingBox::from_signed(-10, 5, 30, 20);
        assert_eq!(bbox, BoundingBox::new(0, 5, 20, 20));
    }

    #[test]
    fn test_clamp_to_frame() {
        let bbox = BoundingBox::new(600, 400, 100, 100);
        assert_eq!(bbox.clamp_to(640, 480), Some(BoundingBox::new(600, 400, 40, 80)));
        assert_eq!(BoundingBox::new(700, 0, 10, 10).clamp_to(640, 480), None);
    }

    #[test]
    fn test_edges() {
        let bbox = BoundingBox::new(10, 20, 30, 40);
        assert_eq!(bbox.right(), 40);
        assert_eq!(bbox.bottom(), 60);
        assert!(!bbox.is_empty());
        assert!(BoundingBox::new(0, 0, 0, 5).is_empty());
    }
}
