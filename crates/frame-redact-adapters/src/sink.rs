//! Filesystem adapter for writing redacted frames.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use frame_redact_core::{ElementId, Frame, FrameSink};
use tracing::{debug, warn};

/// Suffix appended to the source stem for redacted output.
pub const OUTPUT_SUFFIX: &str = ".redacted.png";

/// Writes redacted frames as PNG files into a directory.
///
/// Each element gets its own file for the lifetime of the sink. When two
/// elements share a stem (`a/photo.jpg` and `b/photo.png`), the later one
/// is written as `photo-2.redacted.png`, `photo-3.redacted.png` and so on.
pub struct FsFrameSink {
    dir: PathBuf,
    claimed: Mutex<HashMap<PathBuf, ElementId>>,
}

impl FsFrameSink {
    /// Creates a sink writing into `dir`, created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            claimed: Mutex::new(HashMap::new()),
        }
    }

    /// Preferred output path for a frame from `element`.
    #[must_use]
    pub fn output_path(&self, element: &str) -> PathBuf {
        self.candidate(&stem_of(element), 1)
    }

    fn candidate(&self, stem: &str, n: usize) -> PathBuf {
        if n == 1 {
            self.dir.join(format!("{stem}{OUTPUT_SUFFIX}"))
        } else {
            self.dir.join(format!("{stem}-{n}{OUTPUT_SUFFIX}"))
        }
    }

    /// Reserves the output path for `element`, reusing its earlier path.
    fn claim(&self, element: &ElementId) -> PathBuf {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        let stem = stem_of(element.as_str());
        let mut n = 1;
        loop {
            let path = self.candidate(&stem, n);
            match claimed.get(&path) {
                Some(owner) if owner == element => return path,
                Some(owner) => {
                    if n == 1 {
                        warn!(
                            "{element} shares its output name with {owner}, writing under a numbered name"
                        );
                    }
                    n += 1;
                }
                None => {
                    claimed.insert(path.clone(), element.clone());
                    return path;
                }
            }
        }
    }
}

fn stem_of(element: &str) -> String {
    Path::new(element)
        .file_stem()
        .map_or_else(|| "frame".to_string(), |s| s.to_string_lossy().into_owned())
}

impl FrameSink for FsFrameSink {
    fn write(&self, frame: &Frame) -> Result<Option<String>> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.claim(frame.element());
        let image = frame.to_rgba_image()?;
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!("Wrote {}", path.display());
        Ok(Some(path.to_string_lossy().into_owned()))
    }
}

/// Whether `path` is output from a previous run.
#[must_use]
pub fn is_redacted_output(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_lowercase().ends_with(OUTPUT_SUFFIX))
}
