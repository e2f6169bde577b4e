use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::index::{AssetFileIndex, IndexedFile, pointer_id};
use crate::models::{AssetInfo, AssetKind, Provider};

/// Characters left unescaped in a URL path segment
const SEGMENT_SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

const ASSET_ID_HEX_LEN: usize = 24;

/// Position of an asset-bearing block inside a parsed export.
#[derive(Debug, Clone, Copy)]
pub struct AssetKey<'a> {
    pub conversation_id: &'a str,
    pub message_id: &'a str,
    pub block_type: &'a str,
    pub block_index: usize,
}

/// A registered asset: where it came from and where its bytes live, if anywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetEntry {
    pub asset_id: String,
    pub provider: Provider,
    pub conversation_id: String,
    pub message_id: String,
    pub resolved_path: Option<PathBuf>,
    pub info: AssetInfo,
}

impl AssetEntry {
    pub fn is_resolved(&self) -> bool {
        self.resolved_path.is_some()
    }

    /// MIME type for serving the bytes: explicit metadata first, then the file extension.
    pub fn media_type(&self) -> String {
        if let Some(mime) = &self.info.mime_type {
            return mime.clone();
        }
        self.resolved_path
            .as_deref()
            .map(media_type_for_path)
            .unwrap_or("application/octet-stream")
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssetKindStats {
    pub total: usize,
    pub resolved: usize,
}

/// Read-only lookup from `asset_id` to asset entries of one provider export.
///
/// Rebuilt from scratch on every load; ids are only meaningful within that load.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    provider: Provider,
    entries: HashMap<String, AssetEntry>,
}

impl AssetRegistry {
    pub fn empty(provider: Provider) -> Self {
        Self { provider, entries: HashMap::new() }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn get(&self, asset_id: &str) -> Option<&AssetEntry> {
        self.entries.get(asset_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetEntry> {
        self.entries.values()
    }

    /// Total and resolved counts per asset kind.
    pub fn stats(&self) -> BTreeMap<AssetKind, AssetKindStats> {
        let mut stats: BTreeMap<AssetKind, AssetKindStats> = BTreeMap::new();
        for entry in self.entries.values() {
            let slot = stats.entry(entry.info.kind).or_default();
            slot.total += 1;
            if entry.is_resolved() {
                slot.resolved += 1;
            }
        }
        stats
    }
}

/// Accumulates asset entries while one export is being normalized.
#[derive(Debug)]
pub struct AssetRegistryBuilder {
    provider: Provider,
    files: AssetFileIndex,
    entries: HashMap<String, AssetEntry>,
}

impl AssetRegistryBuilder {
    /// Index `root` and start an empty registry for `provider`.
    pub fn new(provider: Provider, root: &Path) -> Self {
        let files = AssetFileIndex::build(root);
        tracing::debug!(provider = %provider, root = %root.display(), files = files.len(), "indexed asset root");
        Self::with_index(provider, files)
    }

    pub fn with_index(provider: Provider, files: AssetFileIndex) -> Self {
        Self { provider, files, entries: HashMap::new() }
    }

    /// Assign an id to the asset at `key`, resolve it, and record it.
    ///
    /// Returns `info` completed with `asset_id`, resolution state, `asset_url`
    /// and any size/mime details learned from the local file. Unresolved
    /// assets are recorded too, with `is_resolved == false` and no URL.
    pub fn register(&mut self, key: AssetKey<'_>, mut info: AssetInfo) -> AssetInfo {
        let source = info.source_pointer.clone().unwrap_or_default();
        let asset_id = compute_asset_id(self.provider, &key, &source);

        let resolved = self.resolve(info.kind, &source).cloned();

        info.asset_id = Some(asset_id.clone());
        info.is_resolved = resolved.is_some();
        info.asset_url = None;
        if let Some(file) = &resolved {
            info.asset_url = Some(asset_url(self.provider, &asset_id));
            info.size_bytes = info.size_bytes.or(Some(file.size));
            if info.mime_type.is_none() {
                info.mime_type = Some(media_type_for_path(&file.path).to_string());
            }
        }

        self.entries.insert(
            asset_id.clone(),
            AssetEntry {
                asset_id,
                provider: self.provider,
                conversation_id: key.conversation_id.to_string(),
                message_id: key.message_id.to_string(),
                resolved_path: resolved.map(|file| file.path),
                info: info.clone(),
            },
        );

        info
    }

    fn resolve(&self, kind: AssetKind, source: &str) -> Option<&IndexedFile> {
        match kind {
            AssetKind::File => self.files.find_by_name(source.trim()),
            AssetKind::Image | AssetKind::Audio => {
                pointer_id(source).and_then(|id| self.files.find_by_pointer_id(id))
            }
        }
    }

    pub fn finish(self) -> AssetRegistry {
        AssetRegistry { provider: self.provider, entries: self.entries }
    }
}

fn compute_asset_id(provider: Provider, key: &AssetKey<'_>, source: &str) -> String {
    let block_index = key.block_index.to_string();
    let mut hasher = Sha256::new();
    for field in [
        provider.as_str(),
        key.conversation_id,
        key.message_id,
        key.block_type,
        source,
        block_index.as_str(),
    ] {
        hasher.update(field.as_bytes());
        hasher.update([0x1f_u8]);
    }
    let mut id = hex::encode(hasher.finalize());
    id.truncate(ASSET_ID_HEX_LEN);
    id
}

/// `/api/assets/<provider>/<asset_id>` with percent-encoded segments.
pub fn asset_url(provider: Provider, asset_id: &str) -> String {
    format!(
        "/api/assets/{}/{}",
        utf8_percent_encode(provider.as_str(), SEGMENT_SAFE),
        utf8_percent_encode(asset_id, SEGMENT_SAFE)
    )
}

/// MIME type guessed from a file extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "weba" => "audio/webm",
        "webm" => "video/webm",
        "mp4" => "video/mp4",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}
