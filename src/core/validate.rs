//! Client-side upload validation.
//!
//! Every check here runs before any network call: unsupported types,
//! oversized files, and over-large batches are rejected locally, each
//! violation reported individually.

use std::fmt;
use std::path::{Path, PathBuf};

/// Maximum files accepted in a single upload batch.
pub const MAX_FILES: usize = 25;

/// Maximum size of a single file (10 MB).
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Extensions the processing pipeline accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 6] = ["pdf", "png", "jpg", "jpeg", "doc", "docx"];

/// A single validation failure, phrased for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRejection {
    UnsupportedType { name: String },
    TooLarge { name: String, size: u64 },
    Unreadable { name: String },
    TooMany { count: usize },
}

impl fmt::Display for FileRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType { name } => {
                write!(f, "{name}: invalid file type, only PDF, PNG, JPG, DOC allowed")
            }
            Self::TooLarge { name, size } => {
                write!(
                    f,
                    "{name}: file too large ({}), maximum {} allowed",
                    super::format::file_size(*size),
                    super::format::file_size(MAX_FILE_BYTES)
                )
            }
            Self::Unreadable { name } => write!(f, "{name}: file not found or unreadable"),
            Self::TooMany { count } => {
                write!(f, "maximum {MAX_FILES} files allowed per upload, got {count}")
            }
        }
    }
}

/// Lowercased extension of a path, if any.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("(unnamed)")
        .to_string()
}

/// MIME type inferred from the extension, for multipart parts.
pub fn mime_for_path(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

/// Validate a single candidate file: extension allowlist, existence, size.
pub fn validate_file(path: &Path) -> Option<FileRejection> {
    let name = display_name(path);

    match extension(path) {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => return Some(FileRejection::UnsupportedType { name }),
    }

    let meta = match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta,
        _ => return Some(FileRejection::Unreadable { name }),
    };

    if meta.len() > MAX_FILE_BYTES {
        return Some(FileRejection::TooLarge {
            name,
            size: meta.len(),
        });
    }

    None
}

/// Validate an upload batch. An oversized batch rejects everything (matching
/// the service limit); otherwise each file is checked individually and the
/// valid subset survives.
pub fn validate_batch(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<FileRejection>) {
    if paths.len() > MAX_FILES {
        return (
            Vec::new(),
            vec![FileRejection::TooMany { count: paths.len() }],
        );
    }

    let mut accepted = Vec::new();
    let mut rejections = Vec::new();

    for path in paths {
        match validate_file(path) {
            Some(rejection) => rejections.push(rejection),
            None => accepted.push(path.clone()),
        }
    }

    (accepted, rejections)
}
