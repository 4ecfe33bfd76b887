//! Blur command - whole-image box blur.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use frame_redact_adapters::load_frame;
use frame_redact_core::blur_frame;
use frame_redact_core::domain::defaults;
use tracing::info;

/// Arguments for the standalone blur.
#[derive(Args, Clone)]
pub struct BlurArgs {
    /// Image to blur
    pub input: PathBuf,

    /// Where to write the blurred image (format from extension)
    pub output: PathBuf,

    /// Blur radius in pixels; 0 copies the image unchanged
    #[arg(long, default_value_t = defaults::BLUR_INTENSITY)]
    pub radius: u32,
}

/// Run the blur command.
pub fn run(args: &BlurArgs) -> Result<()> {
    info!(
        "Blurring {} with radius {}",
        args.input.display(),
        args.radius
    );

    let frame = load_frame(&args.input)?;
    let blurred = blur_frame(&frame, args.radius);

    let image = blurred.to_rgba_image()?;
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!("Wrote {}", args.output.display());
    Ok(())
}
