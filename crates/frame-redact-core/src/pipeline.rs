//! Per-frame pipeline: detect, decide, composite.

use tracing::{debug, warn};

use crate::domain::{
    Detections, Dimensions, ElementId, Frame, GeometryError, PolicySettings, RedactionReport,
};
use crate::ports::Detector;
use crate::redaction::{decide, BlurCompositor};

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionOutcome {
    /// Source element.
    pub element: ElementId,
    /// Frame dimensions.
    pub dimensions: Dimensions,
    /// Blurred frame, or `None` when nothing needed redacting.
    pub frame: Option<Frame>,
    /// Faces reported by the detector.
    pub faces_detected: usize,
    /// Faces selected for blurring.
    pub faces_redacted: usize,
    /// Whether the body mask was blurred.
    pub body_redacted: bool,
    /// Whether the whole frame was blurred because detection was unavailable.
    pub fallback: bool,
}

impl RedactionOutcome {
    /// Whether any blur was applied.
    #[must_use]
    pub const fn is_redacted(&self) -> bool {
        self.frame.is_some()
    }

    /// Builds a serializable report for this outcome.
    #[must_use]
    pub fn report(&self, timestamp: String, output: Option<String>) -> RedactionReport {
        RedactionReport {
            element: self.element.clone(),
            timestamp,
            dimensions: self.dimensions,
            faces_detected: self.faces_detected,
            faces_redacted: self.faces_redacted,
            body_redacted: self.body_redacted,
            fallback: self.fallback,
            redacted: self.is_redacted(),
            output,
        }
    }
}

/// Runs a detector, the decision engine and a compositor over frames.
///
/// Detector trouble of any kind (not ready, an error, or a mask that does
/// not match the frame) is absorbed here and turns into a whole-frame blur.
pub struct Redactor<D> {
    detector: D,
    compositor: BlurCompositor,
}

impl<D: Detector> Redactor<D> {
    /// Creates a redactor around the given detector.
    #[must_use]
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            compositor: BlurCompositor::new(),
        }
    }

    /// Processes one frame under `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error only for geometry contract violations; detector
    /// failures fall back to full-frame blur instead.
    pub fn process(
        &self,
        frame: &Frame,
        settings: &PolicySettings,
    ) -> Result<RedactionOutcome, GeometryError> {
        let (detections, available) = self.detect(frame);
        let faces_detected = detections.faces.len();

        let plan = decide(
            frame.dimensions(),
            &detections.faces,
            detections.mask,
            settings,
            available,
        )?;
        let faces_redacted = plan.faces.len();
        let body_redacted = plan.body_mask.is_some();
        let fallback = plan.is_fallback;

        let output = self.compositor.composite(frame, &plan, settings)?;
        debug!(
            "Processed {}: redacted={}, fallback={fallback}",
            frame.element(),
            output.is_some()
        );

        Ok(RedactionOutcome {
            element: frame.element().clone(),
            dimensions: frame.dimensions(),
            frame: output,
            faces_detected,
            faces_redacted,
            body_redacted,
            fallback,
        })
    }

    /// Forgets the element's redaction. Returns whether one was tracked.
    pub fn clear(&self, element: &ElementId) -> bool {
        self.compositor.clear(element)
    }

    /// Whether the element currently has blur attached.
    #[must_use]
    pub fn is_redacted(&self, element: &ElementId) -> bool {
        self.compositor.is_redacted(element)
    }

    /// The compositor holding per-element state.
    #[must_use]
    pub const fn compositor(&self) -> &BlurCompositor {
        &self.compositor
    }

    /// The wrapped detector.
    #[must_use]
    pub const fn detector(&self) -> &D {
        &self.detector
    }

    fn detect(&self, frame: &Frame) -> (Detections, bool) {
        let element = frame.element();
        if !self.detector.is_ready() {
            warn!("Detector not ready for {element}, blurring whole frame");
            return (Detections::default(), false);
        }

        match self.detector.detect(frame) {
            Ok(detections) => {
                if let Some(Err(e)) = detections
                    .mask
                    .as_ref()
                    .map(|mask| mask.ensure_matches(frame.dimensions()))
                {
                    warn!("Discarding detections for {element}: {e}");
                    return (Detections::default(), false);
                }
                (detections, true)
            }
            Err(e) => {
                warn!("Detection failed for {element}: {e:#}");
                (Detections::default(), false)
            }
        }
    }
}
