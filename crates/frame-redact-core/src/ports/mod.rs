//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the redaction core and the
//! detectors, frame sources and presentation surfaces around it.

mod detector;
mod frame_sink;
mod frame_source;
mod progress;
mod result_output;

pub use detector::Detector;
pub use frame_sink::FrameSink;
pub use frame_source::FrameSource;
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
