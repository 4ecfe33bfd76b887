//! Redact command - blur faces and bodies according to policy.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use frame_redact_adapters::{FsFrameSink, FsFrameSource, SidecarDetector};
use frame_redact_core::domain::defaults;
use frame_redact_core::{
    Detector, FrameSink, FrameSource, PolicySettings, ProgressEvent, ProgressSink, RedactionReport,
    Redactor, ResultOutput,
};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Parse and validate a threshold value (0.0-1.0).
fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Shared arguments for redaction.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct RedactArgs {
    /// Files or directories to redact
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Write redacted frames into this directory
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Read detection sidecars from this directory instead of next to each image
    #[arg(long, value_name = "DIR")]
    pub detections: Option<PathBuf>,

    /// Blur every detected face (default)
    #[arg(long, conflicts_with = "no_blur_faces")]
    pub blur_faces: bool,

    /// Do not blur faces unless a gender flag selects them
    #[arg(long)]
    pub no_blur_faces: bool,

    /// Blur faces confidently labelled male
    #[arg(long)]
    pub blur_men: bool,

    /// Blur faces confidently labelled female
    #[arg(long)]
    pub blur_women: bool,

    /// Blur person regions from the segmentation mask
    #[arg(long)]
    pub blur_bodies: bool,

    /// Blur radius in pixels
    #[arg(long, value_name = "N")]
    pub intensity: Option<u32>,

    /// Gender labels below this confidence count as unknown (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub gender_threshold: Option<f32>,

    /// Minimum mask coverage for a body to count as present (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub coverage_threshold: Option<f32>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,
}

impl RedactArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }
        if args.detections.is_none() {
            args.detections.clone_from(&config.general.detections_dir);
        }

        // Face flag: either CLI switch wins, otherwise config decides
        if !args.blur_faces && !args.no_blur_faces {
            match config.policy.blur_faces {
                Some(true) => args.blur_faces = true,
                Some(false) => args.no_blur_faces = true,
                None => {}
            }
        }
        if !args.blur_men {
            args.blur_men = config.policy.blur_men.unwrap_or(false);
        }
        if !args.blur_women {
            args.blur_women = config.policy.blur_women.unwrap_or(false);
        }
        if !args.blur_bodies {
            args.blur_bodies = config.policy.blur_bodies.unwrap_or(false);
        }

        args.intensity = args.intensity.or(config.policy.intensity);
        args.gender_threshold = args
            .gender_threshold
            .or(config.policy.gender_confidence_threshold);
        args.coverage_threshold = args
            .coverage_threshold
            .or(config.policy.body_coverage_threshold);

        if args.out.is_none() {
            args.out.clone_from(&config.output.dir);
        }
        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Build the redaction policy with fallback to hardcoded defaults.
    pub fn policy(&self) -> PolicySettings {
        PolicySettings {
            blur_faces: !self.no_blur_faces,
            blur_men: self.blur_men,
            blur_women: self.blur_women,
            blur_bodies: self.blur_bodies,
            blur_intensity: self.intensity.unwrap_or(defaults::BLUR_INTENSITY),
            gender_confidence_threshold: self
                .gender_threshold
                .unwrap_or(defaults::GENDER_CONFIDENCE_THRESHOLD),
            body_coverage_threshold: self
                .coverage_threshold
                .unwrap_or(defaults::BODY_COVERAGE_THRESHOLD),
        }
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }
}

/// Result of running the redact command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct RedactResult {
    /// Number of frames processed.
    pub processed: usize,
    /// Number of frames skipped.
    pub skipped: usize,
    /// Number of frames that received any blur.
    pub redacted: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the redact command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &RedactArgs) -> Result<RedactResult> {
    info!("Running redact command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let policy = args.policy();
    policy.validate().map_err(anyhow::Error::msg)?;
    if !policy.any_enabled() {
        info!("No redaction flags set; only frames without detections will be blurred");
    }
    debug!("Policy: {policy:?}");

    let source = FsFrameSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let detector = args
        .detections
        .as_ref()
        .map_or_else(SidecarDetector::new, SidecarDetector::with_dir);
    let redactor = Redactor::new(detector);

    let sink = args.out.as_ref().map(FsFrameSink::new);
    if sink.is_none() {
        info!("No --out directory given; reporting decisions only");
    }

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = JsonOutput::stdout();

    process_frames(
        &source,
        &redactor,
        &policy,
        sink.as_ref().map(|sink| sink as &dyn FrameSink),
        &output,
        &progress_bar,
        args,
    )
}

/// Redact every frame from the source and emit one report per frame.
///
/// Each frame's compositor record is dropped once its report is out.
fn process_frames<D: Detector>(
    source: &dyn FrameSource,
    redactor: &Redactor<D>,
    policy: &PolicySettings,
    sink: Option<&dyn FrameSink>,
    output: &JsonOutput,
    progress: &dyn ProgressSink,
    args: &RedactArgs,
) -> Result<RedactResult> {
    let total = source.count_hint();
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut redacted = 0usize;
    let mut all_reports: Vec<RedactionReport> = Vec::new();

    for (index, frame_result) in source.frames().enumerate() {
        let frame = match frame_result {
            Ok(frame) => frame,
            Err(e) => {
                progress.on_event(ProgressEvent::Skipped {
                    element: format!("frame {index}"),
                    reason: format!("{e:#}"),
                });
                skipped += 1;
                continue;
            }
        };

        let element = frame.element().to_string();
        progress.on_event(ProgressEvent::Started {
            element: element.clone(),
            index,
            total,
        });

        let outcome = match redactor.process(&frame, policy) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Redaction failed for {element}: {e}");
                progress.on_event(ProgressEvent::Skipped {
                    element,
                    reason: e.to_string(),
                });
                skipped += 1;
                continue;
            }
        };

        let written = match (sink, &outcome.frame) {
            (Some(sink), Some(blurred)) => sink.write(blurred)?,
            _ => None,
        };

        if outcome.is_redacted() {
            redacted += 1;
        }

        let report = outcome.report(iso_timestamp(), written);
        progress.on_event(ProgressEvent::Completed {
            report: report.clone(),
        });

        match args.format() {
            OutputFormat::Jsonl => {
                output.write(&report)?;
            }
            OutputFormat::Json => {
                all_reports.push(report);
            }
        }

        redactor.clear(frame.element());
        processed += 1;
    }

    if matches!(args.format(), OutputFormat::Json) {
        output.write_array(&all_reports, args.pretty)?;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished { processed, skipped });

    let exit_code = if redacted > 0 {
        ExitCode::Redacted
    } else {
        ExitCode::Success
    };

    Ok(RedactResult {
        processed,
        skipped,
        redacted,
        exit_code,
    })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use frame_redact_core::{Detections, ElementId};
    use frame_redact_test_support::{
        FaceBuilder, MockDetector, MockFrameSink, MockFrameSource, MockProgressSink,
        SyntheticFrameBuilder,
    };

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: RedactArgs,
    }

    fn parse(argv: &[&str]) -> RedactArgs {
        let mut full = vec!["frame-redact"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    fn config(toml: &str) -> AppConfig {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_default_policy() {
        let policy = parse(&["a.png"]).policy();
        assert_eq!(policy, PolicySettings::default());
    }

    #[test]
    fn test_cli_flags_build_policy() {
        let policy = parse(&[
            "--no-blur-faces",
            "--blur-women",
            "--blur-bodies",
            "--intensity",
            "5",
            "--gender-threshold",
            "0.5",
            "a.png",
        ])
        .policy();

        assert!(!policy.blur_faces);
        assert!(policy.blur_women);
        assert!(policy.blur_bodies);
        assert!(!policy.blur_men);
        assert_eq!(policy.blur_intensity, 5);
        assert!((policy.gender_confidence_threshold - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blur_faces_flags_conflict() {
        let result = Harness::try_parse_from(["frame-redact", "--blur-faces", "--no-blur-faces"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let result =
            Harness::try_parse_from(["frame-redact", "--coverage-threshold", "1.5", "a.png"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_fills_unset_values() {
        let args = RedactArgs::with_config(
            parse(&["a.png"]),
            &config(
                r"
[general]
recursive = true

[policy]
blur_faces = false
blur_men = true
intensity = 8

[output]
format = 'json'
pretty = true
",
            ),
        );

        assert!(args.recursive);
        assert!(args.pretty);
        assert!(matches!(args.format(), OutputFormat::Json));

        let policy = args.policy();
        assert!(!policy.blur_faces);
        assert!(policy.blur_men);
        assert_eq!(policy.blur_intensity, 8);
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = RedactArgs::with_config(
            parse(&["--blur-faces", "--intensity", "3", "--format", "jsonl", "a.png"]),
            &config(
                r"
[policy]
blur_faces = false
intensity = 8

[output]
format = 'json'
",
            ),
        );

        let policy = args.policy();
        assert!(policy.blur_faces);
        assert_eq!(policy.blur_intensity, 3);
        assert!(matches!(args.format(), OutputFormat::Jsonl));
    }

    #[test]
    fn test_batch_releases_redaction_records() {
        let frames = ["a", "b", "c"]
            .map(|name| {
                SyntheticFrameBuilder::with_element(
                    &SyntheticFrameBuilder::checkerboard(32, 32),
                    name,
                )
            })
            .to_vec();
        let source = MockFrameSource::new(frames);
        let redactor = Redactor::new(MockDetector::returning(Detections {
            faces: vec![FaceBuilder::female([4.0, 4.0, 14.0, 14.0])],
            mask: None,
        }));
        let sink = MockFrameSink::new();
        let progress = MockProgressSink::new();
        let output = JsonOutput::new(Box::new(std::io::sink()));
        let args = parse(&["a.png"]);

        let result = process_frames(
            &source,
            &redactor,
            &args.policy(),
            Some(&sink),
            &output,
            &progress,
            &args,
        )
        .unwrap();

        assert_eq!(result.processed, 3);
        assert_eq!(result.redacted, 3);
        assert!(matches!(result.exit_code, ExitCode::Redacted));
        assert_eq!(sink.frames().len(), 3);
        assert_eq!(progress.finished_counts(), Some((3, 0)));
        assert_eq!(redactor.compositor().tracked(), 0);
        assert!(!redactor.is_redacted(&ElementId::from("a")));
    }

    #[test]
    fn test_empty_batch_reports_success() {
        let source = MockFrameSource::empty();
        let redactor = Redactor::new(MockDetector::empty());
        let progress = MockProgressSink::new();
        let output = JsonOutput::new(Box::new(std::io::sink()));
        let args = parse(&["--format", "json", "a.png"]);

        let result = process_frames(
            &source,
            &redactor,
            &args.policy(),
            None,
            &output,
            &progress,
            &args,
        )
        .unwrap();

        assert_eq!(result.processed, 0);
        assert!(matches!(result.exit_code, ExitCode::Success));
        assert_eq!(redactor.detector().calls(), 0);
        assert_eq!(progress.skipped_count(), 0);
        assert!(matches!(
            progress.events().as_slice(),
            [ProgressEvent::Finished {
                processed: 0,
                skipped: 0
            }]
        ));
    }

    #[test]
    fn test_iso_timestamp_is_rfc3339() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z'));
    }
}
