//! Detector adapter reading precomputed detections from sidecar files.
//!
//! For `photo.jpg` the adapter looks for:
//! - `photo.faces.json`: `{"faces": [{"bbox": [l, t, r, b], "gender": "male", "confidence": 0.9}]}`
//! - `photo.mask.png` (optional): grayscale person mask, non-zero = person
//!
//! A missing or malformed faces file is a detection failure, which the
//! pipeline answers with a whole-frame blur.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use frame_redact_core::{Detections, Detector, FaceDetection, Frame, SegmentationMask};
use serde::Deserialize;
use tracing::debug;

/// Suffix of the face detection sidecar.
pub const FACES_SUFFIX: &str = ".faces.json";
/// Suffix of the segmentation mask sidecar.
pub const MASK_SUFFIX: &str = ".mask.png";

#[derive(Debug, Deserialize)]
struct FacesFile {
    #[serde(default)]
    faces: Vec<FaceDetection>,
}

/// Reads face boxes and person masks written by an external detector.
#[derive(Debug, Clone, Default)]
pub struct SidecarDetector {
    dir: Option<PathBuf>,
}

impl SidecarDetector {
    /// Looks for sidecars next to each image.
    #[must_use]
    pub const fn new() -> Self {
        Self { dir: None }
    }

    /// Looks for sidecars in `dir` instead of next to the image.
    #[must_use]
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Path of the faces sidecar for `image`.
    #[must_use]
    pub fn faces_path(&self, image: &Path) -> PathBuf {
        self.sidecar_path(image, FACES_SUFFIX)
    }

    /// Path of the mask sidecar for `image`.
    #[must_use]
    pub fn mask_path(&self, image: &Path) -> PathBuf {
        self.sidecar_path(image, MASK_SUFFIX)
    }

    fn sidecar_path(&self, image: &Path, suffix: &str) -> PathBuf {
        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = self
            .dir
            .as_deref()
            .or_else(|| image.parent())
            .unwrap_or_else(|| Path::new("."));
        dir.join(format!("{stem}{suffix}"))
    }
}

impl Detector for SidecarDetector {
    fn detect(&self, frame: &Frame) -> Result<Detections> {
        let image = Path::new(frame.element().as_str());

        let faces_path = self.faces_path(image);
        let content = std::fs::read_to_string(&faces_path)
            .with_context(|| format!("No detections at {}", faces_path.display()))?;
        let file: FacesFile = serde_json::from_str(&content)
            .with_context(|| format!("Invalid detections in {}", faces_path.display()))?;

        let mask_path = self.mask_path(image);
        let mask = if mask_path.is_file() {
            Some(load_mask(&mask_path)?)
        } else {
            None
        };

        debug!(
            "Loaded {} faces (mask: {}) for {}",
            file.faces.len(),
            mask.is_some(),
            image.display()
        );

        Ok(Detections {
            faces: file.faces,
            mask,
        })
    }
}

/// Loads a grayscale mask image.
fn load_mask(path: &Path) -> Result<SegmentationMask> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open mask: {}", path.display()))?
        .to_luma8();
    SegmentationMask::from_luma(&image)
        .with_context(|| format!("Invalid mask geometry: {}", path.display()))
}

/// Whether `path` is a mask sidecar rather than a frame.
#[must_use]
pub fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_lowercase().ends_with(MASK_SUFFIX))
}
