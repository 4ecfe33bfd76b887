//! Frame Redact Adapters - External adapters for frame-redact.
//!
//! This crate provides adapters for:
//! - Filesystem frame source
//! - Sidecar detection files
//! - PNG frame output

pub mod fs;
pub mod sidecar;
pub mod sink;

pub use fs::{load_frame, FsFrameSource};
pub use sidecar::SidecarDetector;
pub use sink::FsFrameSink;
