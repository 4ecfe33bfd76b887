//! Core domain types for frame redaction.

mod detection;
mod error;
mod frame;
mod plan;
mod policy;
mod result;

pub use detection::{Detections, FaceBox, FaceDetection, Gender, SegmentationMask};
pub use error::{DetectionError, GeometryError};
pub use frame::{BoundingBox, Dimensions, ElementId, Frame, CHANNELS};
pub use plan::{RedactionKind, RedactionPlan, RedactionRecord};
pub use policy::{defaults, PolicySettings};
pub use result::RedactionReport;
