//! External tool readiness checks.
//!
//! Probes the PATH for ImageMagick and Ghostscript and builds a structured
//! per-tool report. The check runs on a worker thread at startup and its
//! report re-enters the event loop as a message; the router blocks on the
//! readiness screen until the report says every tool is usable.

use std::process::Command;

use regex::Regex;
use tracing::info;

/// Availability of a single external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Ok,
    NotFound,
    VersionProblem,
}

/// Structured result of probing one tool.
#[derive(Debug, Clone)]
pub struct ToolCheck {
    pub name: &'static str,
    /// Command resolved on the PATH, when one was found.
    pub command: Option<String>,
    pub status: ToolStatus,
    pub version: Option<String>,
    /// Remedial detail shown on the blocking readiness screen.
    pub detail: String,
    pub purpose: &'static str,
    pub download_url: &'static str,
}

/// Combined report for every required tool.
#[derive(Debug, Clone)]
pub struct ToolReport {
    pub magick: ToolCheck,
    pub ghostscript: ToolCheck,
}

impl ToolReport {
    pub fn all_ok(&self) -> bool {
        self.magick.status == ToolStatus::Ok && self.ghostscript.status == ToolStatus::Ok
    }

    pub fn checks(&self) -> [&ToolCheck; 2] {
        [&self.magick, &self.ghostscript]
    }
}

/// Probe every required tool. Blocking; run it off the event loop.
pub fn check_tools() -> ToolReport {
    let report = ToolReport {
        magick: check_magick(),
        ghostscript: check_ghostscript(),
    };
    info!(
        magick = ?report.magick.status,
        ghostscript = ?report.ghostscript.status,
        "readiness check complete"
    );
    report
}

fn check_magick() -> ToolCheck {
    let mut check = ToolCheck {
        name: "ImageMagick",
        command: None,
        status: ToolStatus::NotFound,
        version: None,
        detail: "ImageMagick not found in PATH".to_string(),
        purpose: "Required for image format conversion and compression",
        download_url: "https://imagemagick.org/script/download.php",
    };

    if which::which("magick").is_err() {
        return check;
    }
    check.command = Some("magick".to_string());

    let output = match Command::new("magick").arg("-version").output() {
        Ok(o) => o,
        Err(e) => {
            check.status = ToolStatus::VersionProblem;
            check.detail = format!("failed to get version: {}", e);
            return check;
        }
    };

    let text = String::from_utf8_lossy(&output.stdout);
    let (status, version, detail) = classify_magick(&text);
    check.status = status;
    check.version = version;
    check.detail = detail;
    check
}

/// Decide ImageMagick's status from its `-version` output. Anything below
/// major version 7 is a version problem: the modern `magick` entry point and
/// the jpeg:extent encoder behave differently on 6.x.
fn classify_magick(version_output: &str) -> (ToolStatus, Option<String>, String) {
    match parse_magick_version(version_output) {
        Some(version) if version.starts_with("7.") => {
            let detail = format!("ImageMagick {}", version);
            (ToolStatus::Ok, Some(version), detail)
        }
        Some(version) => {
            let detail = format!("version {} is below the required 7.0.0", version);
            (ToolStatus::VersionProblem, Some(version), detail)
        }
        None => (
            ToolStatus::VersionProblem,
            None,
            "could not parse version output".to_string(),
        ),
    }
}

fn check_ghostscript() -> ToolCheck {
    let mut check = ToolCheck {
        name: "Ghostscript",
        command: None,
        status: ToolStatus::NotFound,
        version: None,
        detail: "Ghostscript not found in PATH".to_string(),
        purpose: "Required for PDF processing and conversion",
        download_url: "https://ghostscript.com/releases/gsdnld.html",
    };

    // Unix installs expose `gs`; Windows installers register the console
    // binaries instead.
    let candidates = ["gs", "gswin64c", "gswin32c"];
    let Some(command) = candidates
        .iter()
        .find(|c| which::which(c).is_ok())
        .map(|c| c.to_string())
    else {
        return check;
    };

    check.command = Some(command.clone());
    check.status = ToolStatus::Ok;

    // Presence is sufficient for Ghostscript; a failed version query still
    // counts as available.
    let version = Command::new(&command)
        .arg("-version")
        .output()
        .ok()
        .and_then(|o| parse_ghostscript_version(&String::from_utf8_lossy(&o.stdout)));

    match version {
        Some(v) => {
            check.detail = format!("Ghostscript {}", v);
            check.version = Some(v);
        }
        None => {
            check.detail = "Ghostscript detected".to_string();
        }
    }
    check
}

/// Extract "7.1.0-62" from output like
/// "Version: ImageMagick 7.1.0-62 Q16-HDRI x64 ...".
fn parse_magick_version(output: &str) -> Option<String> {
    let re = Regex::new(r"Version:\s*ImageMagick\s+(\d+\.\d+\.\d+(?:-\d+)?)").ok()?;
    re.captures(output).map(|c| c[1].to_string())
}

/// Extract "10.02.1" from output like "GPL Ghostscript 10.02.1".
fn parse_ghostscript_version(output: &str) -> Option<String> {
    let re = Regex::new(r"Ghostscript\s+(\d+\.\d+(?:\.\d+)?)").ok()?;
    re.captures(output).map(|c| c[1].to_string())
}
