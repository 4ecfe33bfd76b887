//! Frame snapshots and pixel geometry.

use std::fmt;

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

use super::GeometryError;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Stable identifier of a source element, assigned once by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Creates an identifier from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Creates new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered.
    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Length of an RGBA buffer with these dimensions.
    #[must_use]
    pub const fn byte_len(self) -> usize {
        self.pixel_count() * CHANNELS
    }

    /// Rejects zero-sized geometry.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroDimensions`] when either side is zero.
    pub const fn ensure_non_zero(self) -> Result<Self, GeometryError> {
        if self.width == 0 || self.height == 0 {
            Err(GeometryError::ZeroDimensions)
        } else {
            Ok(self)
        }
    }
}

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X coordinate of top-left corner.
    pub x: u32,
    /// Y coordinate of top-left corner.
    pub y: u32,
    /// Width of bounding box.
    pub width: u32,
    /// Height of bounding box.
    pub height: u32,
}

impl BoundingBox {
    /// Creates a new bounding box.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// True when the box covers no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the box lies entirely inside `[0, width) x [0, height)`.
    #[must_use]
    pub const fn fits_within(&self, dims: Dimensions) -> bool {
        self.right() <= dims.width && self.bottom() <= dims.height
    }

    /// Grows the box by `margin` on every side, clamped to `dims`.
    #[must_use]
    pub fn expand_within(&self, margin: u32, dims: Dimensions) -> Self {
        let x = self.x.saturating_sub(margin).min(dims.width);
        let y = self.y.saturating_sub(margin).min(dims.height);
        let right = self.right().saturating_add(margin).min(dims.width);
        let bottom = self.bottom().saturating_add(margin).min(dims.height);
        Self::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }
}

/// An immutable RGBA8 snapshot of a source element.
///
/// The buffer always holds exactly `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    element: ElementId,
    dims: Dimensions,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps a raw RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the buffer length
    /// does not equal `width * height * 4`.
    pub fn new(
        element: impl Into<ElementId>,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Result<Self, GeometryError> {
        let dims = Dimensions::new(width, height).ensure_non_zero()?;
        if data.len() != dims.byte_len() {
            return Err(GeometryError::BufferLength {
                expected: dims.byte_len(),
                actual: data.len(),
            });
        }
        Ok(Self {
            element: element.into(),
            dims,
            data,
        })
    }

    /// Converts a decoded image into an RGBA frame.
    ///
    /// # Errors
    ///
    /// Returns an error for zero-sized images.
    pub fn from_image(
        element: impl Into<ElementId>,
        image: &DynamicImage,
    ) -> Result<Self, GeometryError> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(element, width, height, rgba.into_raw())
    }

    /// Returns the element this frame was captured from.
    #[must_use]
    pub const fn element(&self) -> &ElementId {
        &self.element
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.dims.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.dims.height
    }

    /// Frame dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA bytes of the pixel at `(x, y)`, if inside the frame.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.dims.width || y >= self.dims.height {
            return None;
        }
        let idx = (y as usize * self.dims.width as usize + x as usize) * CHANNELS;
        let px = &self.data[idx..idx + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Consumes the frame and returns its buffer.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Converts the frame into an `image` buffer for encoding.
    ///
    /// # Errors
    ///
    /// Never fails for a frame built through [`Frame::new`]; the error path
    /// mirrors `image`'s fallible constructor.
    pub fn to_rgba_image(&self) -> Result<RgbaImage, GeometryError> {
        RgbaImage::from_raw(self.dims.width, self.dims.height, self.data.clone()).ok_or(
            GeometryError::BufferLength {
                expected: self.dims.byte_len(),
                actual: self.data.len(),
            },
        )
    }

    /// Builds a sibling frame with the same element and geometry.
    pub(crate) fn with_data(&self, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), self.dims.byte_len());
        Self {
            element: self.element.clone(),
            dims: self.dims,
            data,
        }
    }
}
