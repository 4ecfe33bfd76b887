//! Filesystem adapter for loading frames.

use anyhow::{Context, Result};
use frame_redact_core::{Frame, FrameSource};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::sidecar::is_sidecar;
use crate::sink::is_redacted_output;

/// Supported image extensions.
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Filesystem frame source adapter.
///
/// Each image becomes one frame whose element id is its path.
pub struct FsFrameSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsFrameSource {
    /// Creates a new filesystem frame source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Collects all image files from the configured paths, sorted per directory.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if !is_supported_image(path) {
                    warn!("Unsupported file type: {}", path.display());
                } else if is_frame_candidate(path) {
                    files.push(path.clone());
                } else {
                    warn!("Not a source frame, skipping: {}", path.display());
                }
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_file() && is_supported_image(&path) && is_frame_candidate(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl FrameSource for FsFrameSource {
    fn frames(&self) -> Box<dyn Iterator<Item = Result<Frame>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} image files", files.len());

        Box::new(files.into_iter().map(|path| load_frame(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Checks if a path has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| RASTER_EXTENSIONS.contains(&e.as_str()))
}

/// Mask sidecars and earlier redacted output are images, but not frames.
fn is_frame_candidate(path: &Path) -> bool {
    !is_sidecar(path) && !is_redacted_output(path)
}

/// Loads an image from the filesystem as an RGBA frame.
///
/// # Errors
///
/// Returns an error if the file cannot be decoded or is empty.
pub fn load_frame(path: &Path) -> Result<Frame> {
    let image =
        image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;

    Frame::from_image(path.to_string_lossy().into_owned(), &image)
        .with_context(|| format!("Invalid image geometry: {}", path.display()))
}
