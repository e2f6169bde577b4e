use std::borrow::Cow;
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// File name looked up when an export path points at a directory
pub const EXPORT_FILE_NAME: &str = "conversations.json";

/// Validates that a file's size is within `max_bytes`
///
/// Takes an open file handle to avoid TOCTOU (time-of-check-time-of-use)
/// race conditions where the file could be modified between the size check
/// and subsequent file operations.
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than `max_bytes`
pub fn validate_file_size(file: &File, path: &Path, max_bytes: u64) -> Result<u64> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > max_bytes {
        bail!("File too large: {} ({} bytes, max {} bytes)", path.display(), file_size, max_bytes);
    }

    Ok(file_size)
}

/// Expands a leading `~` to the home directory
///
/// # Examples
///
/// ```no_run
/// use chat_history_explorer::utils::expand_tilde;
///
/// let path = expand_tilde("~/exports/chatgpt");
/// assert!(!path.starts_with("~"));
/// ```
pub fn expand_tilde(raw: &str) -> PathBuf {
    expand_tilde_internal(raw, dirs::home_dir())
}

pub(crate) fn expand_tilde_internal(raw: &str, home: Option<PathBuf>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(raw);
    };

    if raw == "~" {
        home
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(raw)
    }
}

/// Resolves a configured export location to the `conversations.json` file
///
/// Directories resolve to the export file inside them; anything else is
/// returned unchanged so a missing file surfaces as an I/O error later.
pub fn resolve_export_file(path: &Path) -> PathBuf {
    if path.is_dir() { path.join(EXPORT_FILE_NAME) } else { path.to_path_buf() }
}

/// Directory holding an export's media files (the export file's parent)
pub fn asset_root_for(export_file: &Path) -> PathBuf {
    match export_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use chat_history_explorer::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/exports/conversations.json");
/// // Returns "~/exports/conversations.json" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
