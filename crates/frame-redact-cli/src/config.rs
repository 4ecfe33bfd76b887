//! Configuration file support for frame-redact.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/frame-redact/config.toml` (lowest priority)
//! - Project-local: `.frame-redact.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

/// File name of the project-local config.
pub const PROJECT_CONFIG: &str = ".frame-redact.toml";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Redaction policy.
    pub policy: PolicyConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
    /// Directory holding detection sidecars.
    pub detections_dir: Option<PathBuf>,
}

/// Redaction policy configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Blur every face.
    pub blur_faces: Option<bool>,
    /// Blur faces labelled male.
    pub blur_men: Option<bool>,
    /// Blur faces labelled female.
    pub blur_women: Option<bool>,
    /// Blur person regions from the segmentation mask.
    pub blur_bodies: Option<bool>,
    /// Blur radius in pixels.
    pub intensity: Option<u32>,
    /// Gender label confidence threshold (0.0-1.0).
    pub gender_confidence_threshold: Option<f32>,
    /// Minimum mask coverage (0.0-1.0).
    pub body_coverage_threshold: Option<f32>,
}

/// Output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for redacted frames.
    pub dir: Option<PathBuf>,
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/frame-redact/config.toml`
    /// 2. Project-local: `.frame-redact.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(t) = self.policy.gender_confidence_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!(
                    "policy.gender_confidence_threshold must be 0.0-1.0, got {t}"
                ));
            }
        }
        if let Some(t) = self.policy.body_coverage_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!(
                    "policy.body_coverage_threshold must be 0.0-1.0, got {t}"
                ));
            }
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);
        self.general.detections_dir = other
            .general
            .detections_dir
            .or_else(|| self.general.detections_dir.take());

        self.policy.blur_faces = other.policy.blur_faces.or(self.policy.blur_faces);
        self.policy.blur_men = other.policy.blur_men.or(self.policy.blur_men);
        self.policy.blur_women = other.policy.blur_women.or(self.policy.blur_women);
        self.policy.blur_bodies = other.policy.blur_bodies.or(self.policy.blur_bodies);
        self.policy.intensity = other.policy.intensity.or(self.policy.intensity);
        self.policy.gender_confidence_threshold = other
            .policy
            .gender_confidence_threshold
            .or(self.policy.gender_confidence_threshold);
        self.policy.body_coverage_threshold = other
            .policy
            .body_coverage_threshold
            .or(self.policy.body_coverage_threshold);

        self.output.dir = other.output.dir.or_else(|| self.output.dir.take());
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("frame-redact").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.frame-redact.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(PROJECT_CONFIG);
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
