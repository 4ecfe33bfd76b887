//! Test support utilities for frame-redact.
//!
//! Provides mocks, synthetic frame builders, and utilities for testing
//! the redaction pipeline.
//!
//! # Example
//!
//! ```
//! use frame_redact_test_support::{FaceBuilder, MockDetector, SyntheticFrameBuilder};
//! use frame_redact_core::{Detections, PolicySettings, Redactor};
//!
//! let frame = SyntheticFrameBuilder::checkerboard(64, 64);
//! let detector = MockDetector::returning(Detections {
//!     faces: vec![FaceBuilder::male([8.0, 8.0, 24.0, 24.0])],
//!     mask: None,
//! });
//!
//! let outcome = Redactor::new(detector)
//!     .process(&frame, &PolicySettings::default())
//!     .unwrap();
//! assert!(outcome.is_redacted());
//! ```

mod builders;
mod mocks;

pub use builders::{FaceBuilder, MaskBuilder, SyntheticFrameBuilder};
pub use mocks::{
    MockDetector, MockFrameSink, MockFrameSource, MockProgressSink, MockResultOutput,
};
