use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One regular file found under an export's asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Snapshot of the files under an asset root, taken once per load.
#[derive(Debug, Clone, Default)]
pub struct AssetFileIndex {
    files: Vec<IndexedFile>,
    by_name: HashMap<String, usize>,
}

impl AssetFileIndex {
    /// Recursively index `root`.
    ///
    /// Unreadable entries are logged and skipped; a missing root yields an
    /// empty index, which simply leaves every asset unresolved.
    pub fn build(root: &Path) -> Self {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(root = %root.display(), error = %e, "skipping unreadable asset entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            files.push(IndexedFile { name: name.to_string(), path: entry.into_path(), size });
        }

        // Deterministic "first match" regardless of directory iteration order
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self::from_files(files)
    }

    pub fn from_files(files: Vec<IndexedFile>) -> Self {
        let mut by_name = HashMap::new();
        for (i, file) in files.iter().enumerate() {
            by_name.entry(file.name.clone()).or_insert(i);
        }
        Self { files, by_name }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Exact file-name lookup (Claude uploads).
    pub fn find_by_name(&self, name: &str) -> Option<&IndexedFile> {
        self.by_name.get(name).map(|&i| &self.files[i])
    }

    /// File named `<id>` or `<id>` followed by `-`, `_` or `.`; shortest name wins.
    pub fn find_by_pointer_id(&self, id: &str) -> Option<&IndexedFile> {
        if id.is_empty() {
            return None;
        }
        self.files
            .iter()
            .filter(|file| name_matches_id(&file.name, id))
            .min_by(|a, b| a.name.len().cmp(&b.name.len()).then_with(|| a.path.cmp(&b.path)))
    }
}

fn name_matches_id(name: &str, id: &str) -> bool {
    match name.strip_prefix(id) {
        Some("") => true,
        Some(rest) => rest.starts_with(['-', '_', '.']),
        None => false,
    }
}

/// Bare id of an asset pointer.
///
/// `file-service://file-abc` → `file-abc`, `sediment://file_abc` → `file_abc`;
/// pointers without a scheme are already ids.
pub fn pointer_id(pointer: &str) -> Option<&str> {
    let pointer = pointer.trim();
    let id = match pointer.split_once("://") {
        Some((_, rest)) => rest.trim_matches('/'),
        None => pointer,
    };
    if id.is_empty() { None } else { Some(id) }
}
