//! Redaction decisions and the compositor's per-element state.

use super::{BoundingBox, SegmentationMask};

/// Output of the decision engine for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionPlan {
    /// Face rectangles to blur, clipped to frame bounds, in detector order.
    pub faces: Vec<BoundingBox>,
    /// Person mask to blur by coverage, when the body policy selected it.
    pub body_mask: Option<SegmentationMask>,
    /// Whether anything should be blurred at all.
    pub should_redact: bool,
    /// Whole-frame protective blur because no detector judgment was possible.
    pub is_fallback: bool,
}

impl RedactionPlan {
    /// Nothing to redact.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            faces: Vec::new(),
            body_mask: None,
            should_redact: false,
            is_fallback: false,
        }
    }

    /// Blur the entire frame; no semantic regions were computed.
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            faces: Vec::new(),
            body_mask: None,
            should_redact: true,
            is_fallback: true,
        }
    }

    /// Plan from semantic regions; `should_redact` follows from their presence.
    #[must_use]
    pub fn regions(faces: Vec<BoundingBox>, body_mask: Option<SegmentationMask>) -> Self {
        let should_redact = !faces.is_empty() || body_mask.is_some();
        Self {
            faces,
            body_mask,
            should_redact,
            is_fallback: false,
        }
    }
}

/// What the compositor applied to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedactionKind {
    /// The whole frame was blurred.
    Fallback,
    /// Padded face rectangles and, optionally, the body mask were blurred.
    Regions {
        /// Padded rectangles actually blurred.
        faces: Vec<BoundingBox>,
        /// Whether mask-limited body blur was applied.
        body: bool,
    },
}

/// Current redaction state of one tracked element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionRecord {
    /// What was blurred.
    pub kind: RedactionKind,
    /// Whether the blurred output is currently shown or toggled off.
    pub visible: bool,
}
