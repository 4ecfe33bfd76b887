//! User redaction policy.

use serde::{Deserialize, Serialize};

/// Hardcoded policy defaults.
pub mod defaults {
    pub const BLUR_INTENSITY: u32 = 20;
    pub const GENDER_CONFIDENCE_THRESHOLD: f32 = 0.7;
    pub const BODY_COVERAGE_THRESHOLD: f32 = 0.01;
}

/// Redaction policy, supplied fresh with every decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PolicySettings {
    /// Blur every face regardless of gender.
    pub blur_faces: bool,
    /// Blur faces confidently labelled male.
    pub blur_men: bool,
    /// Blur faces confidently labelled female.
    pub blur_women: bool,
    /// Enable body-region redaction from the segmentation mask.
    pub blur_bodies: bool,
    /// Blur radius in pixels; 0 disables blurring.
    pub blur_intensity: u32,
    /// Gender labels below this confidence are treated as unknown.
    pub gender_confidence_threshold: f32,
    /// Minimum fraction of mask-positive pixels for a body to count as present.
    pub body_coverage_threshold: f32,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            blur_faces: true,
            blur_men: false,
            blur_women: false,
            blur_bodies: false,
            blur_intensity: defaults::BLUR_INTENSITY,
            gender_confidence_threshold: defaults::GENDER_CONFIDENCE_THRESHOLD,
            body_coverage_threshold: defaults::BODY_COVERAGE_THRESHOLD,
        }
    }
}

impl PolicySettings {
    /// Settings with every redaction flag off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            blur_faces: false,
            ..Self::default()
        }
    }

    /// True when at least one redaction flag is set.
    #[must_use]
    pub const fn any_enabled(&self) -> bool {
        self.blur_faces || self.blur_men || self.blur_women || self.blur_bodies
    }

    /// Checks that thresholds lie in `0.0..=1.0`.
    ///
    /// # Errors
    ///
    /// Returns a description of the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.gender_confidence_threshold) {
            return Err(format!(
                "gender_confidence_threshold must be 0.0-1.0, got {}",
                self.gender_confidence_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.body_coverage_threshold) {
            return Err(format!(
                "body_coverage_threshold must be 0.0-1.0, got {}",
                self.body_coverage_threshold
            ));
        }
        Ok(())
    }
}
