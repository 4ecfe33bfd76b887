//! Progress reporting port for UI integration.

use crate::domain::RedactionReport;

/// Events emitted while frames are processed.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Processing started for a frame.
    Started {
        /// Source element of the frame.
        element: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total frames in batch, if known.
        total: Option<usize>,
    },
    /// Processing completed for a frame.
    Completed {
        /// The redaction report.
        report: RedactionReport,
    },
    /// A frame was skipped due to an error.
    Skipped {
        /// Source element, or a positional label if it could not be loaded.
        element: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All frames have been processed.
    Finished {
        /// Total frames processed successfully.
        processed: usize,
        /// Total frames skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
