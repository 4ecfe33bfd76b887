//! Detector port for the external face/gender and segmentation models.

use crate::domain::{Detections, Frame};

/// Port for obtaining detection results for a frame.
///
/// Any failure here is not fatal: the pipeline treats it as "no detector
/// this cycle" and blurs the whole frame.
pub trait Detector: Send + Sync {
    /// Whether the models are loaded and able to run.
    fn is_ready(&self) -> bool {
        true
    }

    /// Runs detection on a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if detection could not run.
    fn detect(&self, frame: &Frame) -> anyhow::Result<Detections>;
}
