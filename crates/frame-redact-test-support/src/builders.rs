//! Synthetic frame, mask and detection builders for testing.

use frame_redact_core::{FaceBox, FaceDetection, Frame, Gender, SegmentationMask};
use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

/// Builder for creating synthetic test frames.
///
/// Frames carry a `synthetic://` element id unless one is given.
pub struct SyntheticFrameBuilder;

impl SyntheticFrameBuilder {
    /// Creates a high-contrast checkerboard (every pixel differs from a blurred copy).
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> Frame {
        Self::checkerboard_with_cell_size(width, height, 4)
    }

    /// Creates a checkerboard with custom cell size.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> Frame {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            if (x / cell_size + y / cell_size) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        Self::from_rgba("synthetic://checkerboard", img)
    }

    /// Creates a frame of a single colour.
    #[must_use]
    pub fn uniform(width: u32, height: u32, rgba: [u8; 4]) -> Frame {
        let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
        Self::from_rgba("synthetic://uniform", img)
    }

    /// Creates a black frame with one white pixel at `(x, y)`.
    #[must_use]
    pub fn single_bright_pixel(width: u32, height: u32, x: u32, y: u32) -> Frame {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        Self::from_rgba("synthetic://bright_pixel", img)
    }

    /// Creates a smooth horizontal gradient.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_gradient(width: u32, height: u32) -> Frame {
        let img = RgbaImage::from_fn(width, height, |x, _| {
            let v = ((u32::from(u8::MAX) * x) / width.max(1)) as u8;
            Rgba([v, v, v, 255])
        });
        Self::from_rgba("synthetic://horizontal_gradient", img)
    }

    /// Re-labels a frame with a caller-chosen element id.
    #[must_use]
    pub fn with_element(frame: &Frame, element: &str) -> Frame {
        Self::try_frame(element, frame.width(), frame.height(), frame.data().to_vec())
    }

    /// Converts a frame to an `image` value, e.g. for saving fixtures.
    #[must_use]
    pub fn to_image(frame: &Frame) -> DynamicImage {
        frame
            .to_rgba_image()
            .map_or_else(|_| DynamicImage::new_rgba8(1, 1), DynamicImage::ImageRgba8)
    }

    fn from_rgba(element: &str, img: RgbaImage) -> Frame {
        let (width, height) = img.dimensions();
        Self::try_frame(element, width, height, img.into_raw())
    }

    #[allow(clippy::panic)]
    fn try_frame(element: &str, width: u32, height: u32, data: Vec<u8>) -> Frame {
        Frame::new(element, width, height, data)
            .unwrap_or_else(|e| panic!("synthetic frame {width}x{height} is invalid: {e}"))
    }
}

/// Builder for segmentation masks.
pub struct MaskBuilder;

impl MaskBuilder {
    /// A mask whose first `fraction` of pixels (row-major) are positive.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn with_coverage(width: u32, height: u32, fraction: f64) -> SegmentationMask {
        let total = width as usize * height as usize;
        let positive = ((total as f64) * fraction).round() as usize;
        let values = (0..total)
            .map(|i| if i < positive { 1.0 } else { 0.0 })
            .collect();
        Self::try_mask(width, height, values)
    }

    /// A mask that is positive inside the rectangle `[x0, x1) x [y0, y1)`.
    #[must_use]
    pub fn rect(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> SegmentationMask {
        let values = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        Self::try_mask(width, height, values)
    }

    /// Renders a mask as a grayscale image (255 = person).
    #[must_use]
    pub fn to_image(mask: &SegmentationMask) -> GrayImage {
        let dims = mask.dimensions();
        GrayImage::from_fn(dims.width, dims.height, |x, y| {
            let index = y as usize * dims.width as usize + x as usize;
            Luma([if mask.is_positive(index) { 255 } else { 0 }])
        })
    }

    #[allow(clippy::panic)]
    fn try_mask(width: u32, height: u32, values: Vec<f32>) -> SegmentationMask {
        SegmentationMask::new(width, height, values)
            .unwrap_or_else(|e| panic!("synthetic mask {width}x{height} is invalid: {e}"))
    }
}

/// Builder for face detections.
pub struct FaceBuilder;

impl FaceBuilder {
    /// A face box `[left, top, right, bottom]` with a label and confidence.
    #[must_use]
    #[allow(clippy::panic)]
    pub fn face(bbox: [f32; 4], gender: Gender, confidence: f32) -> FaceDetection {
        FaceDetection::new(FaceBox::from(bbox), gender, confidence)
            .unwrap_or_else(|e| panic!("synthetic face is invalid: {e}"))
    }

    /// A confidently labelled male face.
    #[must_use]
    pub fn male(bbox: [f32; 4]) -> FaceDetection {
        Self::face(bbox, Gender::Male, 0.95)
    }

    /// A confidently labelled female face.
    #[must_use]
    pub fn female(bbox: [f32; 4]) -> FaceDetection {
        Self::face(bbox, Gender::Female, 0.95)
    }
}
