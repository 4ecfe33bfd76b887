//! Separable box blur approximating a Gaussian.
//!
//! Two one-dimensional passes (rows, then columns) each keep a running sum
//! over a `2 * radius + 1` window, so every output pixel costs O(1)
//! regardless of radius. Out-of-range taps replicate the edge pixel.

use crate::domain::{BoundingBox, Dimensions, Frame, GeometryError, CHANNELS};

/// Colour channels blurred; alpha (index 3) is left untouched.
const COLOR_CHANNELS: usize = 3;

/// Blurs an RGBA buffer in place.
///
/// A radius below 1 leaves the buffer untouched. The caller guarantees
/// `data.len() == width * height * 4` with non-zero dimensions.
pub fn box_blur(data: &mut [u8], width: u32, height: u32, radius: u32) {
    if radius < 1 || width == 0 || height == 0 {
        return;
    }
    let (w, h) = (width as usize, height as usize);
    let radius = radius as usize;
    debug_assert_eq!(data.len(), w * h * CHANNELS);

    let mut rows = data.to_vec();
    for y in 0..h {
        blur_line(data, &mut rows, y * w * CHANNELS, CHANNELS, w, radius);
    }
    for x in 0..w {
        blur_line(&rows, data, x * CHANNELS, w * CHANNELS, h, radius);
    }
}

/// One sliding-window pass over `len` pixels spaced `stride` bytes apart.
fn blur_line(src: &[u8], dst: &mut [u8], start: usize, stride: usize, len: usize, radius: usize) {
    let last = len - 1;
    let window = 2 * radius as u64 + 1;
    let at = |i: usize| start + i.min(last) * stride;

    for c in 0..COLOR_CHANNELS {
        let tap = |i: usize| u64::from(src[at(i) + c]);

        // Window centred on 0: taps -r..=0 all replicate pixel 0, taps past
        // the end replicate the last pixel.
        let inside = radius.min(last);
        let mut sum = (radius as u64 + 1) * tap(0)
            + (1..=inside).map(tap).sum::<u64>()
            + (radius - inside) as u64 * tap(last);

        for i in 0..len {
            let avg = (sum + window / 2) / window;
            dst[start + i * stride + c] = u8::try_from(avg).unwrap_or(u8::MAX);
            sum = sum + tap(i.saturating_add(radius + 1)) - tap(i.saturating_sub(radius));
        }
    }
}

/// Blurs only `region` of an RGBA buffer.
///
/// The region is copied into its own buffer, blurred there (so edge
/// replication happens at the region border) and written back.
///
/// # Errors
///
/// Returns [`GeometryError::RegionOutOfBounds`] if the region does not fit.
pub fn blur_region(
    data: &mut [u8],
    dims: Dimensions,
    region: BoundingBox,
    radius: u32,
) -> Result<(), GeometryError> {
    if !region.fits_within(dims) {
        return Err(GeometryError::RegionOutOfBounds {
            region,
            width: dims.width,
            height: dims.height,
        });
    }
    if region.is_empty() || radius < 1 {
        return Ok(());
    }

    let stride = dims.width as usize * CHANNELS;
    let row_len = region.width as usize * CHANNELS;
    let rows = region.y as usize..region.bottom() as usize;
    let col = region.x as usize * CHANNELS;

    let mut patch = Vec::with_capacity(row_len * region.height as usize);
    for y in rows.clone() {
        let offset = y * stride + col;
        patch.extend_from_slice(&data[offset..offset + row_len]);
    }

    box_blur(&mut patch, region.width, region.height, radius);

    for (y, chunk) in rows.zip(patch.chunks_exact(row_len)) {
        let offset = y * stride + col;
        data[offset..offset + row_len].copy_from_slice(chunk);
    }
    Ok(())
}

/// Returns a fully blurred copy of `frame`.
#[must_use]
pub fn blur_frame(frame: &Frame, radius: u32) -> Frame {
    let mut data = frame.data().to_vec();
    box_blur(&mut data, frame.width(), frame.height(), radius);
    frame.with_data(data)
}
