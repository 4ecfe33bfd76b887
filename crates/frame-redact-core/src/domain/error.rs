//! Contract violations raised by the core.

use thiserror::Error;

use super::BoundingBox;

/// A rectangle, mask or buffer that does not fit the frame it is used with.
///
/// These are caller bugs, not runtime conditions: the core rejects the call
/// instead of guessing a repair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("frame dimensions must be non-zero")]
    ZeroDimensions,

    #[error("pixel buffer holds {actual} bytes, expected {expected} (width * height * 4)")]
    BufferLength { expected: usize, actual: usize },

    #[error("segmentation mask holds {actual} values, expected {expected} (one per pixel)")]
    MaskSize { expected: usize, actual: usize },

    #[error("region {region:?} does not fit inside a {width}x{height} buffer")]
    RegionOutOfBounds {
        region: BoundingBox,
        width: u32,
        height: u32,
    },
}

/// A detector payload that failed boundary validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("confidence must be between 0.0 and 1.0, got {0}")]
    InvalidConfidence(f32),

    #[error("face box must be finite with left <= right and top <= bottom")]
    InvalidBox,
}
