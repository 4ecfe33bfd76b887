//! Detector payloads, validated at the boundary.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, DetectionError, Dimensions, GeometryError};

/// Gender label attached to a detected face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

/// Face rectangle as reported by a detector, top-left and bottom-right corners.
///
/// Coordinates are in frame pixels and may fall outside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct FaceBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl FaceBox {
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    fn is_valid(&self) -> bool {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .all(|v| v.is_finite())
            && self.left <= self.right
            && self.top <= self.bottom
    }

    /// Clips to frame bounds, rounding outward to whole pixels.
    ///
    /// Returns `None` if nothing of the box remains inside the frame.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn clip(&self, dims: Dimensions) -> Option<BoundingBox> {
        let clamp = |v: f32, max: u32| -> u32 { v.clamp(0.0, max as f32) as u32 };
        let x0 = clamp(self.left.floor(), dims.width);
        let y0 = clamp(self.top.floor(), dims.height);
        let x1 = clamp(self.right.ceil(), dims.width);
        let y1 = clamp(self.bottom.ceil(), dims.height);
        let bbox = BoundingBox::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0));
        (!bbox.is_empty()).then_some(bbox)
    }

    /// Box width in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Box height in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

impl From<[f32; 4]> for FaceBox {
    fn from([left, top, right, bottom]: [f32; 4]) -> Self {
        Self::new(left, top, right, bottom)
    }
}

impl From<FaceBox> for [f32; 4] {
    fn from(b: FaceBox) -> Self {
        [b.left, b.top, b.right, b.bottom]
    }
}

/// A single face reported by the external face/gender model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFaceDetection")]
pub struct FaceDetection {
    /// Face rectangle in frame pixels.
    pub bbox: FaceBox,
    /// Gender label as reported by the model.
    pub gender: Gender,
    /// Model confidence in the gender label (0.0 to 1.0).
    pub confidence: f32,
}

impl FaceDetection {
    /// Creates a validated detection.
    ///
    /// # Errors
    ///
    /// Returns an error if the confidence is outside `[0, 1]` or the box is
    /// inverted or non-finite.
    pub fn new(bbox: FaceBox, gender: Gender, confidence: f32) -> Result<Self, DetectionError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DetectionError::InvalidConfidence(confidence));
        }
        if !bbox.is_valid() {
            return Err(DetectionError::InvalidBox);
        }
        Ok(Self {
            bbox,
            gender,
            confidence,
        })
    }

    /// Gender after applying the confidence threshold.
    ///
    /// Labels below `threshold` are not trusted and become [`Gender::Unknown`].
    #[must_use]
    pub fn effective_gender(&self, threshold: f32) -> Gender {
        if self.confidence < threshold {
            Gender::Unknown
        } else {
            self.gender
        }
    }
}

#[derive(Deserialize)]
struct RawFaceDetection {
    bbox: FaceBox,
    #[serde(default)]
    gender: Gender,
    confidence: f32,
}

impl TryFrom<RawFaceDetection> for FaceDetection {
    type Error = DetectionError;

    fn try_from(raw: RawFaceDetection) -> Result<Self, Self::Error> {
        Self::new(raw.bbox, raw.gender, raw.confidence)
    }
}

/// Per-pixel person segmentation; a positive value marks a person pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationMask {
    dims: Dimensions,
    values: Vec<f32>,
}

impl SegmentationMask {
    /// Wraps one value per pixel, row-major.
    ///
    /// # Errors
    ///
    /// Returns an error if the value count differs from `width * height`
    /// or either dimension is zero.
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self, GeometryError> {
        let dims = Dimensions::new(width, height).ensure_non_zero()?;
        if values.len() != dims.pixel_count() {
            return Err(GeometryError::MaskSize {
                expected: dims.pixel_count(),
                actual: values.len(),
            });
        }
        Ok(Self { dims, values })
    }

    /// Builds a binary mask from a grayscale image; non-zero luma is positive.
    ///
    /// # Errors
    ///
    /// Returns an error for zero-sized images.
    pub fn from_luma(image: &image::GrayImage) -> Result<Self, GeometryError> {
        let (width, height) = image.dimensions();
        let values = image
            .pixels()
            .map(|p| if p.0[0] > 0 { 1.0 } else { 0.0 })
            .collect();
        Self::new(width, height, values)
    }

    /// Mask dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Raw per-pixel values.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// True when the pixel at `index` (row-major) is marked as person.
    #[must_use]
    pub fn is_positive(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(|&v| v > 0.0)
    }

    /// Fraction of positive pixels (0.0 to 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn coverage(&self) -> f64 {
        let positive = self.values.iter().filter(|&&v| v > 0.0).count();
        positive as f64 / self.values.len() as f64
    }

    /// Rejects masks that do not match the frame.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MaskSize`] on mismatch.
    pub fn ensure_matches(&self, dims: Dimensions) -> Result<(), GeometryError> {
        if self.dims == dims {
            Ok(())
        } else {
            Err(GeometryError::MaskSize {
                expected: dims.pixel_count(),
                actual: self.values.len(),
            })
        }
    }
}

/// Everything a detector reports for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detections {
    /// Detected faces, in detector order.
    pub faces: Vec<FaceDetection>,
    /// Person segmentation, if the segmentation model ran.
    pub mask: Option<SegmentationMask>,
}
