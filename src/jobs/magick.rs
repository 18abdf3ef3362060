//! ImageMagick-backed job execution.
//!
//! Each dispatched job runs `magick` on its own worker thread and sends the
//! outcome back over a channel; the event loop drains that channel and
//! routes the outcome to the wizard that issued the request.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use crossbeam_channel::Sender;
use tracing::{error, info};

use super::{Dispatch, JobOutcome, JobRequest};

/// Dispatcher that shells out to `magick`, one worker thread per job. The
/// wizards never issue a second job while one is in flight, so there is no
/// queueing to manage here.
pub struct MagickDispatcher {
    tx: Sender<JobOutcome>,
}

impl MagickDispatcher {
    pub fn new(tx: Sender<JobOutcome>) -> Self {
        Self { tx }
    }
}

impl Dispatch for MagickDispatcher {
    fn dispatch(&self, job: JobRequest) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            info!(?job, "running job");
            let outcome = run_job(&job);
            if !outcome.success {
                error!(message = %outcome.message, "job failed");
            }
            // Receiver gone means the app is shutting down.
            let _ = tx.send(outcome);
        });
    }
}

/// Execute a job synchronously. Split out from the dispatcher so the
/// command assembly stays testable.
pub fn run_job(job: &JobRequest) -> JobOutcome {
    match job {
        JobRequest::PdfConvert {
            format,
            prefix,
            output_dir,
            ..
        } => {
            if let Err(e) = fs::create_dir_all(output_dir) {
                return JobOutcome::failure(format!("Failed to create output directory: {}", e));
            }
            match run_magick(&command_args(job)) {
                Ok(()) => {
                    let outputs = collect_outputs(output_dir, prefix, format);
                    JobOutcome {
                        success: true,
                        message: format!("Successfully converted {} page(s)", outputs.len()),
                        outputs,
                        output_size: None,
                    }
                }
                Err(diag) => JobOutcome::failure(format!("Conversion failed: {}", diag)),
            }
        }

        JobRequest::FormatConvert { output, .. } => match run_magick(&command_args(job)) {
            Ok(()) => JobOutcome {
                success: true,
                message: "Image converted successfully".to_string(),
                outputs: vec![output.clone()],
                output_size: file_size(output),
            },
            Err(diag) => JobOutcome::failure(format!("Conversion failed: {}", diag)),
        },

        JobRequest::Compress { output, .. } => match run_magick(&command_args(job)) {
            Ok(()) => JobOutcome {
                success: true,
                message: "Compression complete".to_string(),
                outputs: vec![output.clone()],
                output_size: file_size(output),
            },
            Err(diag) => JobOutcome::failure(format!("Compression failed: {}", diag)),
        },
    }
}

/// Arguments passed to `magick` for a given job.
fn command_args(job: &JobRequest) -> Vec<String> {
    match job {
        JobRequest::PdfConvert {
            input,
            format,
            density,
            quality,
            prefix,
            output_dir,
        } => {
            let pattern = output_dir.join(format!("{}%d.{}", prefix, format));
            vec![
                "-density".to_string(),
                density.to_string(),
                input.display().to_string(),
                "-quality".to_string(),
                quality.to_string(),
                pattern.display().to_string(),
            ]
        }
        JobRequest::FormatConvert { input, output, .. } => {
            vec![input.display().to_string(), output.display().to_string()]
        }
        JobRequest::Compress {
            input,
            target_bytes,
            output,
            ..
        } => {
            let mut args = vec![input.display().to_string()];
            // jpeg:extent drives the encoder toward the byte target; it only
            // exists for JPEG outputs. PDFs are re-written as-is.
            let ext = output
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase());
            if matches!(ext.as_deref(), Some("jpg") | Some("jpeg")) {
                args.push("-define".to_string());
                args.push(format!("jpeg:extent={}", target_bytes));
            }
            args.push(output.display().to_string());
            args
        }
    }
}

/// Run `magick` with the given arguments, returning a combined diagnostic on
/// any failure.
fn run_magick(args: &[String]) -> Result<(), String> {
    let output = Command::new("magick")
        .args(args)
        .output()
        .map_err(|e| e.to_string())?;

    if output.status.success() {
        Ok(())
    } else {
        let mut diag = output.status.to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            diag.push('\n');
            diag.push_str(stderr.trim());
        }
        Err(diag)
    }
}

/// Enumerate the artifacts a PDF conversion produced, sorted by name.
fn collect_outputs(dir: &Path, prefix: &str, format: &str) -> Vec<PathBuf> {
    let suffix = format!(".{}", format);
    let mut outputs: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                name.starts_with(prefix) && name.ends_with(&suffix)
            })
            .map(|e| e.path())
            .collect(),
        Err(_) => Vec::new(),
    };
    outputs.sort();
    outputs
}

fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|m| m.len())
}
