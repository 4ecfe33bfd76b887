//! Frame sink port for handing redacted frames back to the host.

use crate::domain::Frame;

/// Port for presenting or storing redacted frames.
pub trait FrameSink: Send + Sync {
    /// Writes a redacted frame.
    ///
    /// Returns a description of where the frame went (e.g. a file path),
    /// if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, frame: &Frame) -> anyhow::Result<Option<String>>;
}
