//! Command-line argument definitions using clap
//!
//! The application is an interactive session; the surface here is
//! deliberately tiny.

use clap::Parser;
use std::path::PathBuf;

/// Imgforge - convert and compress images and PDFs through a terminal wizard
#[derive(Parser, Debug)]
#[command(name = "imgforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to browse for input files.
    /// Defaults to the directory the executable lives in.
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Level for the diagnostic log file (error, warn, info, debug, trace).
    /// RUST_LOG overrides this when set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
