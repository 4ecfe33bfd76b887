//! The redaction core: blur kernel, decision engine and compositor.

pub mod blur;
mod compositor;
mod decision;

pub use blur::{blur_frame, blur_region, box_blur};
pub use compositor::{BlurCompositor, FACE_PADDING_RATIO};
pub use decision::decide;
