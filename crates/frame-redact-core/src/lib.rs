//! Frame Redact Core - Redaction decisions and blur compositing
//!
//! This crate turns external detection results (face boxes with a gender
//! label, person segmentation masks) into a redaction plan under a user
//! policy, and blurs the selected pixels of RGBA frames with a separable
//! box blur.

pub mod domain;
pub mod pipeline;
pub mod ports;
pub mod redaction;

pub use domain::{
    BoundingBox, Detections, Dimensions, ElementId, FaceBox, FaceDetection, Frame, Gender,
    GeometryError, PolicySettings, RedactionKind, RedactionPlan, RedactionRecord,
    RedactionReport, SegmentationMask,
};
pub use pipeline::{RedactionOutcome, Redactor};
pub use ports::{Detector, FrameSink, FrameSource, ProgressEvent, ProgressSink, ResultOutput};
pub use redaction::{blur_frame, box_blur, decide, BlurCompositor};
