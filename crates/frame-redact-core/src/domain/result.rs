//! Per-frame redaction reports.

use serde::{Deserialize, Serialize};

use super::{Dimensions, ElementId};

/// Summary of what happened to a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionReport {
    /// Source element (file path for filesystem sources).
    pub element: ElementId,
    /// Timestamp of processing (ISO 8601).
    pub timestamp: String,
    /// Frame dimensions.
    pub dimensions: Dimensions,
    /// Faces reported by the detector.
    pub faces_detected: usize,
    /// Faces selected for blurring.
    pub faces_redacted: usize,
    /// Whether the body mask was blurred.
    pub body_redacted: bool,
    /// Whether the whole frame was blurred because detection was unavailable.
    pub fallback: bool,
    /// Whether any blur was applied.
    pub redacted: bool,
    /// Where the redacted frame was written, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}
