//! Decision engine: detections plus policy in, redaction plan out.

use tracing::debug;

use crate::domain::{
    Dimensions, FaceDetection, Gender, GeometryError, PolicySettings, RedactionPlan,
    SegmentationMask,
};

/// Turns one frame's detections into a redaction plan.
///
/// `detector_available` is false when no model could run this cycle; the
/// frame is then blurred whole. Face boxes are clipped to `dims`. The body
/// mask is selected only if `blur_bodies` is set, its coverage exceeds
/// `body_coverage_threshold`, and either a face was flagged or no face was
/// detected at all.
///
/// # Errors
///
/// Returns [`GeometryError::MaskSize`] if the mask does not match `dims`
/// while at least one redaction flag is set. With every flag off the mask
/// is never inspected.
pub fn decide(
    dims: Dimensions,
    faces: &[FaceDetection],
    mask: Option<SegmentationMask>,
    settings: &PolicySettings,
    detector_available: bool,
) -> Result<RedactionPlan, GeometryError> {
    if !detector_available {
        debug!("Detector unavailable, falling back to full-frame blur");
        return Ok(RedactionPlan::fallback());
    }
    if !settings.any_enabled() {
        return Ok(RedactionPlan::none());
    }
    if let Some(mask) = &mask {
        mask.ensure_matches(dims)?;
    }

    let flagged: Vec<_> = faces
        .iter()
        .filter(|face| is_flagged(face, settings))
        .collect();
    let regions: Vec<_> = flagged.iter().filter_map(|face| face.bbox.clip(dims)).collect();

    let body_mask = mask.filter(|mask| {
        settings.blur_bodies
            && body_selected(flagged.len(), faces.len())
            && exceeds_coverage(mask, settings.body_coverage_threshold)
    });

    debug!(
        "Decision: {} faces detected, {} flagged, {} regions, body={}",
        faces.len(),
        flagged.len(),
        regions.len(),
        body_mask.is_some()
    );

    Ok(RedactionPlan::regions(regions, body_mask))
}

/// Whether a face matches the policy.
///
/// Low-confidence labels count as unknown, and unknown faces are only
/// reachable through `blur_faces`.
fn is_flagged(face: &FaceDetection, settings: &PolicySettings) -> bool {
    if settings.blur_faces {
        return true;
    }
    match face.effective_gender(settings.gender_confidence_threshold) {
        Gender::Male => settings.blur_men,
        Gender::Female => settings.blur_women,
        Gender::Unknown => false,
    }
}

/// Masks at or below the coverage threshold are treated as noise.
#[allow(clippy::cast_possible_truncation)]
fn exceeds_coverage(mask: &SegmentationMask, threshold: f32) -> bool {
    (mask.coverage() as f32) > threshold
}

/// Body tie-break: a flagged face covers its body; a frame with no face
/// evidence may be a headless shot; faces judged safe keep their body.
///
/// The mask does not separate individuals, so a frame with one flagged and
/// one safe subject blurs both bodies.
const fn body_selected(flagged: usize, detected: usize) -> bool {
    flagged > 0 || detected == 0
}
