//! Applies redaction plans to frames and tracks per-element state.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use super::blur::{blur_frame, blur_region, box_blur};
use crate::domain::{
    BoundingBox, Dimensions, ElementId, Frame, GeometryError, PolicySettings, RedactionKind,
    RedactionPlan, RedactionRecord, CHANNELS,
};

/// Extra margin around a face box, as a fraction of its larger side.
pub const FACE_PADDING_RATIO: f32 = 0.2;

/// Blurs the regions a plan names and remembers what each element shows.
///
/// The record table is internally synchronized; calls for different
/// elements never interfere. Pixel work runs outside the lock.
#[derive(Debug, Default)]
pub struct BlurCompositor {
    records: RwLock<HashMap<ElementId, RedactionRecord>>,
}

impl BlurCompositor {
    /// Creates a compositor with no tracked elements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `plan` to `frame` at `settings.blur_intensity`.
    ///
    /// Returns `None`, and forgets any prior redaction of the element, when
    /// the plan does not redact. Otherwise returns the blurred frame and
    /// replaces the element's record.
    ///
    /// # Errors
    ///
    /// Returns an error if a face rectangle or the body mask does not fit
    /// the frame. The element's record is left unchanged in that case.
    pub fn composite(
        &self,
        frame: &Frame,
        plan: &RedactionPlan,
        settings: &PolicySettings,
    ) -> Result<Option<Frame>, GeometryError> {
        let element = frame.element();
        if !plan.should_redact {
            if self.clear(element) {
                debug!("Redaction lifted for {element}");
            }
            return Ok(None);
        }

        let radius = settings.blur_intensity;
        let (output, kind) = if plan.is_fallback {
            (blur_frame(frame, radius), RedactionKind::Fallback)
        } else {
            apply_regions(frame, plan, radius)?
        };

        debug!("Composited {element}: {kind:?}");
        self.write()
            .insert(element.clone(), RedactionRecord { kind, visible: true });
        Ok(Some(output))
    }

    /// Forgets the element's redaction. Returns whether one was tracked.
    pub fn clear(&self, element: &ElementId) -> bool {
        self.write().remove(element).is_some()
    }

    /// Forgets every tracked element, e.g. after a settings change.
    pub fn clear_all(&self) {
        let mut records = self.write();
        trace!("Clearing {} redaction records", records.len());
        records.clear();
    }

    /// Whether the element currently has composited blur attached.
    #[must_use]
    pub fn is_redacted(&self, element: &ElementId) -> bool {
        self.read().contains_key(element)
    }

    /// Snapshot of the element's record.
    #[must_use]
    pub fn record(&self, element: &ElementId) -> Option<RedactionRecord> {
        self.read().get(element).cloned()
    }

    /// Shows or hides the blur without forgetting it.
    ///
    /// Returns false if the element is not tracked.
    pub fn set_visible(&self, element: &ElementId, visible: bool) -> bool {
        match self.write().get_mut(element) {
            Some(record) => {
                record.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Number of tracked elements.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ElementId, RedactionRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ElementId, RedactionRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Blurs padded face rectangles, then the masked body pixels.
fn apply_regions(
    frame: &Frame,
    plan: &RedactionPlan,
    radius: u32,
) -> Result<(Frame, RedactionKind), GeometryError> {
    let dims = frame.dimensions();
    if let Some(face) = plan.faces.iter().find(|face| !face.fits_within(dims)) {
        return Err(GeometryError::RegionOutOfBounds {
            region: *face,
            width: dims.width,
            height: dims.height,
        });
    }
    if let Some(mask) = &plan.body_mask {
        mask.ensure_matches(dims)?;
    }

    let mut data = frame.data().to_vec();
    let mut padded = Vec::with_capacity(plan.faces.len());
    for face in &plan.faces {
        let region = pad_face(*face, dims);
        if region.is_empty() {
            continue;
        }
        blur_region(&mut data, dims, region, radius)?;
        padded.push(region);
    }

    if let Some(mask) = &plan.body_mask {
        let mut blurred = data.clone();
        box_blur(&mut blurred, dims.width, dims.height, radius);
        let pixels = data
            .chunks_exact_mut(CHANNELS)
            .zip(blurred.chunks_exact(CHANNELS))
            .enumerate();
        for (index, (dst, src)) in pixels {
            if mask.is_positive(index) {
                dst.copy_from_slice(src);
            }
        }
    }

    let kind = RedactionKind::Regions {
        faces: padded,
        body: plan.body_mask.is_some(),
    };
    Ok((frame.with_data(data), kind))
}

/// Pads a face box so hairlines and ears the detector clipped are covered.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn pad_face(face: BoundingBox, dims: Dimensions) -> BoundingBox {
    let margin = (face.width.max(face.height) as f32 * FACE_PADDING_RATIO).round() as u32;
    face.expand_within(margin, dims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domain::SegmentationMask;

    fn checkerboard(element: &str, width: u32, height: u32) -> Frame {
        let data = (0..width * height)
            .flat_map(|i| {
                let (x, y) = (i % width, i / width);
                let v = if (x / 2 + y / 2) % 2 == 0 { 255 } else { 0 };
                [v, v, v, 255]
            })
            .collect();
        Frame::new(element, width, height, data).expect("valid frame")
    }

    fn settings(radius: u32) -> PolicySettings {
        PolicySettings {
            blur_intensity: radius,
            ..PolicySettings::default()
        }
    }

    #[test]
    fn test_no_redaction_returns_none_and_tracks_nothing() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 8, 8);

        let out = compositor
            .composite(&frame, &RedactionPlan::none(), &settings(3))
            .unwrap();

        assert!(out.is_none());
        assert!(!compositor.is_redacted(frame.element()));
        assert_eq!(compositor.tracked(), 0);
    }

    #[test]
    fn test_no_redaction_clears_prior_record() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 8, 8);
        compositor
            .composite(&frame, &RedactionPlan::fallback(), &settings(2))
            .unwrap();
        assert!(compositor.is_redacted(frame.element()));

        compositor
            .composite(&frame, &RedactionPlan::none(), &settings(2))
            .unwrap();
        assert!(!compositor.is_redacted(frame.element()));
    }

    #[test]
    fn test_fallback_blurs_whole_frame() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 16, 16);

        let out = compositor
            .composite(&frame, &RedactionPlan::fallback(), &settings(4))
            .unwrap()
            .expect("fallback redacts");

        assert_eq!(out, blur_frame(&frame, 4));
        let record = compositor.record(frame.element()).unwrap();
        assert_eq!(record.kind, RedactionKind::Fallback);
        assert!(record.visible);
    }

    #[test]
    fn test_composite_twice_is_idempotent() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 32, 32);
        let plan = RedactionPlan::regions(vec![BoundingBox::new(8, 8, 10, 10)], None);

        let first = compositor.composite(&frame, &plan, &settings(3)).unwrap();
        let second = compositor.composite(&frame, &plan, &settings(3)).unwrap();

        assert_eq!(first, second);
        assert_eq!(compositor.tracked(), 1);
    }

    #[test]
    fn test_clear_then_noop_composite() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 8, 8);
        let id = frame.element().clone();
        compositor
            .composite(&frame, &RedactionPlan::fallback(), &settings(2))
            .unwrap();

        assert!(compositor.clear(&id));
        assert!(!compositor.is_redacted(&id));
        assert!(!compositor.clear(&id), "clear is idempotent");

        let out = compositor
            .composite(&frame, &RedactionPlan::none(), &settings(2))
            .unwrap();
        assert!(out.is_none());
        assert_eq!(compositor.tracked(), 0);
    }

    #[test]
    fn test_face_padding_limits_blur_to_padded_box() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 40, 40);
        let plan = RedactionPlan::regions(vec![BoundingBox::new(10, 10, 10, 10)], None);

        let out = compositor
            .composite(&frame, &plan, &settings(2))
            .unwrap()
            .unwrap();

        // 20% of 10 -> 2 px margin on every side.
        let padded = BoundingBox::new(8, 8, 14, 14);
        let record = compositor.record(frame.element()).unwrap();
        assert_eq!(
            record.kind,
            RedactionKind::Regions {
                faces: vec![padded],
                body: false
            }
        );
        for y in 0..40 {
            for x in 0..40 {
                let inside = (8..22).contains(&x) && (8..22).contains(&y);
                if !inside {
                    assert_eq!(out.pixel(x, y), frame.pixel(x, y), "({x},{y})");
                }
            }
        }
        assert_ne!(out.pixel(9, 9), frame.pixel(9, 9));
    }

    #[test]
    fn test_face_padding_clamped_at_frame_edge() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 20, 20);
        let plan = RedactionPlan::regions(vec![BoundingBox::new(14, 0, 6, 6)], None);

        compositor.composite(&frame, &plan, &settings(3)).unwrap();

        let record = compositor.record(frame.element()).unwrap();
        let RedactionKind::Regions { faces, .. } = record.kind else {
            panic!("expected regions");
        };
        assert_eq!(faces, vec![BoundingBox::new(13, 0, 7, 7)]);
    }

    #[test]
    fn test_body_mask_limits_blur_to_positive_pixels() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 16, 16);
        let values = (0..256).map(|i| if i % 16 < 8 { 1.0 } else { 0.0 }).collect();
        let mask = SegmentationMask::new(16, 16, values).unwrap();
        let plan = RedactionPlan::regions(vec![], Some(mask));

        let out = compositor
            .composite(&frame, &plan, &settings(2))
            .unwrap()
            .unwrap();
        let blurred = blur_frame(&frame, 2);

        for y in 0..16 {
            for x in 0..16 {
                let expected = if x < 8 { blurred.pixel(x, y) } else { frame.pixel(x, y) };
                assert_eq!(out.pixel(x, y), expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn test_mask_size_mismatch_rejected_without_record() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 8, 8);
        let mask = SegmentationMask::new(4, 4, vec![1.0; 16]).unwrap();
        let plan = RedactionPlan::regions(vec![], Some(mask));

        let err = compositor.composite(&frame, &plan, &settings(2)).unwrap_err();
        assert!(matches!(err, GeometryError::MaskSize { .. }));
        assert!(!compositor.is_redacted(frame.element()));
    }

    #[test]
    fn test_out_of_bounds_face_rejected() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 8, 8);
        let plan = RedactionPlan::regions(vec![BoundingBox::new(6, 6, 4, 4)], None);

        let err = compositor.composite(&frame, &plan, &settings(2)).unwrap_err();
        assert!(matches!(err, GeometryError::RegionOutOfBounds { .. }));
    }

    #[test]
    fn test_set_visible_toggles_record() {
        let compositor = BlurCompositor::new();
        let frame = checkerboard("a", 8, 8);
        let id = frame.element().clone();
        assert!(!compositor.set_visible(&id, false));

        compositor
            .composite(&frame, &RedactionPlan::fallback(), &settings(2))
            .unwrap();
        assert!(compositor.set_visible(&id, false));
        assert!(!compositor.record(&id).unwrap().visible);
        assert!(compositor.is_redacted(&id), "hidden blur stays tracked");

        compositor
            .composite(&frame, &RedactionPlan::fallback(), &settings(2))
            .unwrap();
        assert!(compositor.record(&id).unwrap().visible);
    }

    #[test]
    fn test_concurrent_elements_do_not_interfere() {
        let compositor = BlurCompositor::new();
        let frames: Vec<_> = (0..8)
            .map(|i| checkerboard(&format!("el-{i}"), 24, 24))
            .collect();

        std::thread::scope(|scope| {
            for frame in &frames {
                let compositor = &compositor;
                scope.spawn(move || {
                    compositor
                        .composite(frame, &RedactionPlan::fallback(), &settings(3))
                        .unwrap();
                });
            }
        });

        assert_eq!(compositor.tracked(), 8);
        compositor.clear_all();
        assert_eq!(compositor.tracked(), 0);
    }
}
