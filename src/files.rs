//! files
//!
//! Turns configured glob patterns into blobs ready for upload.
//!
//! # Pattern Semantics
//!
//! - Patterns are relative to the working directory
//! - `*` stays within one path segment, `**` crosses segments
//! - Dot-files match like any other file
//! - Only regular files are returned, deduplicated, in first-match order
//! - A pattern starting with `!` removes already-matched paths
//! - A literal pattern naming a directory stands for everything below it
//!
//! # Encoding
//!
//! Files with a known binary extension are read as bytes and sent as
//! base64; everything else is read as UTF-8 text.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};

use crate::core::types::{BlobEncoding, FileBlob};
use crate::error::{ErrorCode, PluginError};

/// Extensions uploaded as base64.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "bmp", "svg", "pdf", "zip", "tar", "gz", "bz2", "7z",
    "woff", "woff2", "ttf", "eot", "otf", "mp3", "mp4", "avi", "mov", "exe", "dll", "so", "dylib",
];

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Resolve patterns to file paths relative to `cwd`.
///
/// # Errors
///
/// `ENOFILES` if a pattern is not a valid glob.
pub fn resolve_files(patterns: &[String], cwd: &Path) -> Result<Vec<String>, PluginError> {
    let mut matched: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let root = Pattern::escape(&cwd.to_string_lossy());

    for pattern in patterns {
        if let Some(negated) = pattern.strip_prefix('!') {
            let negated = expand_directory(negated, cwd);
            let exclude = Pattern::new(&negated).map_err(|e| invalid_pattern(pattern, e))?;
            matched.retain(|path| {
                let keep = !exclude.matches_with(path, match_options());
                if !keep {
                    seen.remove(path);
                }
                keep
            });
            continue;
        }

        let full = format!(
            "{}/{}",
            root.trim_end_matches('/'),
            expand_directory(pattern, cwd)
        );
        let entries = glob::glob_with(&full, match_options()).map_err(|e| invalid_pattern(pattern, e))?;

        for entry in entries.flatten() {
            if !entry.is_file() {
                continue;
            }
            let Ok(relative) = entry.strip_prefix(cwd) else {
                warn!(path = %entry.display(), "Skipping file outside the working directory");
                continue;
            };
            let relative = to_slash_path(relative);
            if seen.insert(relative.clone()) {
                matched.push(relative);
            }
        }
    }

    debug!(count = matched.len(), "Resolved file patterns");
    Ok(matched)
}

/// `dist` becomes `dist/**` when `cwd/dist` is a directory.
fn expand_directory(pattern: &str, cwd: &Path) -> String {
    let has_magic = pattern.contains(['*', '?', '[']);
    if !has_magic && !pattern.is_empty() && cwd.join(pattern).is_dir() {
        format!("{}/**", pattern.trim_end_matches('/'))
    } else {
        pattern.to_string()
    }
}

fn invalid_pattern(pattern: &str, err: impl std::fmt::Display) -> PluginError {
    PluginError::with_details(
        ErrorCode::NoFiles,
        format!("Failed to resolve file pattern: {}", pattern),
        err.to_string(),
    )
}

/// Join path components with `/` regardless of platform.
fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether a path is uploaded as base64.
///
/// # Example
///
/// ```
/// use release_commit::files::is_binary_path;
///
/// assert!(is_binary_path("assets/logo.PNG"));
/// assert!(!is_binary_path("CHANGELOG.md"));
/// assert!(!is_binary_path("Makefile"));
/// ```
pub fn is_binary_path(path: &str) -> bool {
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    if ext.contains('/') {
        return false;
    }
    let ext = ext.to_ascii_lowercase();
    BINARY_EXTENSIONS.contains(&ext.as_str())
}

/// Read one file as a blob.
///
/// # Errors
///
/// `ENOFILES` naming the path if it cannot be read (or is not UTF-8 text).
pub fn read_file_as_blob(path: &str, cwd: &Path) -> Result<FileBlob, PluginError> {
    let full = cwd.join(path);
    let read_error = |e: std::io::Error| {
        PluginError::with_details(
            ErrorCode::NoFiles,
            format!("Failed to read file: {}", path),
            e.to_string(),
        )
    };

    if is_binary_path(path) {
        let bytes = fs::read(&full).map_err(read_error)?;
        Ok(FileBlob {
            path: path.to_string(),
            content: STANDARD.encode(bytes),
            encoding: BlobEncoding::Base64,
        })
    } else {
        let content = fs::read_to_string(&full).map_err(read_error)?;
        Ok(FileBlob {
            path: path.to_string(),
            content,
            encoding: BlobEncoding::Utf8,
        })
    }
}

/// Read several files as blobs, in order.
pub fn read_files_as_blobs(paths: &[String], cwd: &Path) -> Result<Vec<FileBlob>, PluginError> {
    paths.iter().map(|p| read_file_as_blob(p, cwd)).collect()
}
