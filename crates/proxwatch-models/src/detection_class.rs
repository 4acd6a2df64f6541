//! Detection classes the monitor looks for in captured frames.
//!
//! - `Face`: frontal faces
//! - `Body`: full human bodies

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class tag passed to a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionClass {
    Face,
    Body,
}

impl DetectionClass {
    /// All supported classes, in detection order.
    pub const ALL: &'static [DetectionClass] = &[DetectionClass::Face, DetectionClass::Body];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionClass::Face => "face",
            DetectionClass::Body => "body",
        }
    }

    /// Human-readable plural used in alert bodies.
    pub fn plural(&self) -> &'static str {
        match self {
            DetectionClass::Face => "faces",
            DetectionClass::Body => "bodies",
        }
    }
}

impl fmt::Display for DetectionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_tag() {
        assert_eq!(DetectionClass::Face.to_string(), "face");
        assert_eq!(DetectionClass::Body.plural(), "bodies");
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&DetectionClass::Face).unwrap();
        assert_eq!(json, "\"face\"");
    }
}
