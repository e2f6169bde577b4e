use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::Provider;

/// Read-only favorites store keyed by `(provider, external_id)`.
pub trait FavoriteLookup {
    fn is_favorite(&self, provider: Provider, external_id: &str) -> bool;
}

#[derive(Debug, Deserialize)]
struct FavoriteEntry {
    provider: String,
    conversation_id: String,
}

/// Favorites loaded from a JSON file of
/// `[{"provider": "chatgpt", "conversation_id": "..."}]` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    ids: HashMap<Provider, HashSet<String>>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load favorites from `path`. A missing file is an empty set.
    ///
    /// Entries naming an unknown provider or an empty id are skipped with a
    /// logged warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a JSON
    /// array of favorite entries.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no favorites file");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to open favorites file: {}", path.display()));
            }
        };

        let entries: Vec<FavoriteEntry> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse favorites file: {}", path.display()))?;

        let mut favorites = Self::default();
        for entry in entries {
            let id = entry.conversation_id.trim();
            match entry.provider.parse::<Provider>() {
                Ok(provider) if !id.is_empty() => favorites.insert(provider, id),
                _ => tracing::warn!(
                    provider = %entry.provider,
                    conversation_id = %entry.conversation_id,
                    "ignoring invalid favorite entry"
                ),
            }
        }
        Ok(favorites)
    }

    pub fn insert(&mut self, provider: Provider, external_id: impl Into<String>) {
        self.ids.entry(provider).or_default().insert(external_id.into());
    }

    pub fn len(&self) -> usize {
        self.ids.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.values().all(HashSet::is_empty)
    }
}

impl FavoriteLookup for FavoriteSet {
    fn is_favorite(&self, provider: Provider, external_id: &str) -> bool {
        self.ids.get(&provider).is_some_and(|ids| ids.contains(external_id))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let favorites = FavoriteSet::load(&dir.path().join("favorites.json")).unwrap();
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_load_skips_invalid_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(
            &path,
            r#"[
                {"provider": "chatgpt", "conversation_id": "c-1"},
                {"provider": "Claude", "conversation_id": " u-1 "},
                {"provider": "gemini", "conversation_id": "g-1"},
                {"provider": "claude", "conversation_id": ""}
            ]"#,
        )
        .unwrap();

        let favorites = FavoriteSet::load(&path).unwrap();
        assert_eq!(favorites.len(), 2);
        assert!(favorites.is_favorite(Provider::ChatGpt, "c-1"));
        assert!(favorites.is_favorite(Provider::Claude, "u-1"));
        assert!(!favorites.is_favorite(Provider::Claude, "c-1"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("favorites.json");
        fs::write(&path, r#"{"provider": "chatgpt"}"#).unwrap();

        let err = FavoriteSet::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse favorites file"));
    }
}
