//! Filesystem helpers: candidate-file listing, type filters, path heuristics
//! and size formatting shared by the wizards.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Read-only snapshot of a candidate input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Which file types a selector offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFilter {
    Pdf,
    Image,
    ImageOrPdf,
}

impl FileFilter {
    /// Whether a file name passes this filter, judged by extension.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            FileFilter::Pdf => is_pdf_file(name),
            FileFilter::Image => is_image_file(name),
            FileFilter::ImageOrPdf => is_image_file(name) || is_pdf_file(name),
        }
    }

    /// Short description used in selector headings ("Found 3 PDF file(s)").
    pub fn describe(&self) -> &'static str {
        match self {
            FileFilter::Pdf => "PDF",
            FileFilter::Image => "image",
            FileFilter::ImageOrPdf => "image/PDF",
        }
    }
}

/// Extensions accepted as images, lowercase with leading dot.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "avif",
];

pub fn is_image_file(name: &str) -> bool {
    match extension_lower(name) {
        Some(ext) => IMAGE_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

pub fn is_pdf_file(name: &str) -> bool {
    extension_lower(name).as_deref() == Some("pdf")
}

fn extension_lower(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// List the immediate files of `dir` that pass `filter`, sorted
/// case-insensitively by name. Subdirectories are never descended into or
/// listed; entries whose metadata cannot be read are skipped.
pub fn list_files(dir: &Path, filter: FileFilter) -> io::Result<Vec<FileEntry>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if !filter.matches(&name) {
            continue;
        }

        let meta = match entry.metadata() {
            Ok(m) => m,
            Err(_) => continue,
        };
        if meta.is_dir() {
            continue;
        }

        files.push(FileEntry {
            path: dir.join(&name),
            size: meta.len(),
            name,
        });
    }

    files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(files)
}

/// Heuristic for "this keystroke/paste is actually a filesystem path".
///
/// Used by the file selector to flip into manual-entry mode when the user
/// pastes or drags a path instead of navigating the list. Accepts Windows
/// drive-letter prefixes (`C:\...`, `C:/...`), UNC prefixes (`\\server\...`)
/// and anything that carries both a path separator and a file extension.
pub fn looks_like_path(s: &str) -> bool {
    if s.len() < 3 {
        return false;
    }

    let bytes = s.as_bytes();
    if bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/')
    {
        return true;
    }
    if s.starts_with("\\\\") {
        return true;
    }

    let has_separator = s.contains('/') || s.contains('\\');
    has_separator && Path::new(s).extension().is_some()
}

/// `photo.png` + `"_conv"` + `"webp"` -> `photo_conv.webp`, same directory.
pub fn output_path_with_suffix(input: &Path, suffix: &str, ext: &str) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    dir.join(format!("{}{}.{}", stem, suffix, ext))
}

/// Output directory for PDF page extraction: a sibling named `<stem>_images`.
pub fn pdf_output_dir(input: &Path) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    dir.join(format!("{}_images", stem))
}

/// Output path for compression. PDFs keep their extension; every other
/// input is redirected to `.jpg`, the format the size-targeted encoder
/// actually supports.
pub fn compress_output_path(input: &Path) -> PathBuf {
    let ext = if is_pdf_file(&input.to_string_lossy()) {
        "pdf"
    } else {
        "jpg"
    };
    output_path_with_suffix(input, "_comp", ext)
}

/// Human-readable byte count: `512 B`, `2.0 KB`, `104.9 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", bytes as f64 / div as f64, b"KMGTPE"[exp] as char)
}

/// Directory the selector starts browsing in: the executable's directory,
/// falling back to the working directory.
pub fn default_browse_dir() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            return dir.to_path_buf();
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Fire-and-forget "show this path in the OS file browser" capability.
///
/// Injected into the wizards' done-step handling so the state machines stay
/// deterministic and tests can substitute a recorder.
pub trait FolderOpener: Send + Sync {
    fn reveal(&self, path: &Path);
}

/// Production opener backed by the platform file browser.
pub struct SystemOpener;

impl FolderOpener for SystemOpener {
    fn reveal(&self, path: &Path) {
        if let Err(e) = open::that_detached(path) {
            warn!(path = %path.display(), error = %e, "failed to open folder");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_heuristic_accepts_real_paths() {
        assert!(looks_like_path("C:\\scans\\report.pdf"));
        assert!(looks_like_path("D:/photos/cat.png"));
        assert!(looks_like_path("\\\\server\\share\\a.png"));
        assert!(looks_like_path("/home/user/a.pdf"));
        assert!(looks_like_path("sub/dir/a.jpg"));
    }

    #[test]
    fn path_heuristic_rejects_plain_text() {
        assert!(!looks_like_path("hello"));
        assert!(!looks_like_path("a.b"));
        assert!(!looks_like_path("ab"));
        assert!(!looks_like_path("no separator here"));
        assert!(!looks_like_path("dir/without_extension"));
    }

    #[test]
    fn filters_match_by_extension() {
        assert!(FileFilter::Pdf.matches("Scan.PDF"));
        assert!(!FileFilter::Pdf.matches("photo.png"));
        assert!(FileFilter::Image.matches("photo.TIF"));
        assert!(!FileFilter::Image.matches("doc.pdf"));
        assert!(FileFilter::ImageOrPdf.matches("doc.pdf"));
        assert!(FileFilter::ImageOrPdf.matches("photo.webp"));
        assert!(!FileFilter::ImageOrPdf.matches("notes.txt"));
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(104_857_600), "100.0 MB");
    }

    #[test]
    fn output_paths() {
        assert_eq!(
            output_path_with_suffix(Path::new("/tmp/photo.png"), "_conv", "webp"),
            PathBuf::from("/tmp/photo_conv.webp")
        );
        assert_eq!(
            pdf_output_dir(Path::new("/tmp/report.pdf")),
            PathBuf::from("/tmp/report_images")
        );
        assert_eq!(
            compress_output_path(Path::new("/tmp/photo.png")),
            PathBuf::from("/tmp/photo_comp.jpg")
        );
        assert_eq!(
            compress_output_path(Path::new("/tmp/doc.pdf")),
            PathBuf::from("/tmp/doc_comp.pdf")
        );
    }
}
