//! CLI command definitions and handlers.

pub mod blur;
pub mod redact;

use clap::{Parser, Subcommand};

/// Frame Redact - privacy blur for faces and bodies in still frames
#[derive(Parser)]
#[command(name = "frame-redact")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared redact arguments (paths, policy, output).
    #[command(flatten)]
    pub redact: redact::RedactArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Blur faces and bodies according to the redaction policy
    Redact(redact::RedactArgs),
    /// Blur an entire image with a box blur
    Blur(blur::BlurArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every frame processed, nothing needed redacting.
    Success = 0,
    /// At least one frame was redacted.
    Redacted = 1,
    /// Invalid arguments or an unrecoverable error.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
