//! Frame source port for pulling frames from various sources.

use crate::domain::Frame;

/// Port for loading frames from a source.
pub trait FrameSource: Send + Sync {
    /// Returns an iterator over frames from this source.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a frame fails to load.
    fn frames(&self) -> Box<dyn Iterator<Item = anyhow::Result<Frame>> + Send + '_>;

    /// Returns the total number of frames, if known.
    fn count_hint(&self) -> Option<usize>;
}
