//! Library loader for the configured provider exports.
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach suitable for CLI tools:
//!
//! - **File-level errors**: An unreadable, oversized, non-JSON or unrecognized export is
//!   logged and recorded as [`ProviderStatus::Failed`]; that provider contributes zero
//!   conversations and the other provider still loads.
//! - **Conversation-level errors**: Handled by the parsers, which skip the conversation and
//!   record a warning.
//! - **Never fatal**: [`load_library`] is infallible. An empty library is a valid, degraded
//!   result, not an error.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rayon::prelude::*;

use super::favorites::FavoriteLookup;
use super::library::{Library, ProviderStatus};
use crate::models::{ParseWarnings, Provider};
use crate::parsers::{ExportError, ParseOptions, ParsedExport, parse_export};
use crate::utils::{Settings, format_path_with_tilde, resolve_export_file};

/// Parse every configured provider export and join favorites.
///
/// Exports are parsed independently and in parallel; each parse only reads its
/// own file and writes its own collections.
///
/// # Arguments
///
/// * `settings` - Export locations; providers without a path are not loaded
/// * `options` - Parser policy shared by every export
/// * `favorites` - Queried by `(provider, external_id)` to set `is_favorite`
///
/// # Returns
///
/// A [`Library`] with conversations sorted newest first. Per-provider failures
/// are reported through [`Library::status`].
///
/// # Examples
///
/// ```no_run
/// use chat_history_explorer::indexer::{FavoriteSet, load_library};
/// use chat_history_explorer::parsers::ParseOptions;
/// use chat_history_explorer::utils::Settings;
///
/// let settings = Settings::from_env();
/// let favorites = FavoriteSet::load(&settings.favorites_path)?;
/// let library = load_library(&settings, &ParseOptions::default(), &favorites);
/// println!("Loaded {} conversations", library.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_library(
    settings: &Settings,
    options: &ParseOptions,
    favorites: &dyn FavoriteLookup,
) -> Library {
    let jobs: Vec<(Provider, PathBuf)> = settings
        .configured_providers()
        .into_iter()
        .filter_map(|provider| {
            settings.provider_path(provider).map(|path| (provider, resolve_export_file(path)))
        })
        .collect();

    let results: Vec<(Provider, PathBuf, Result<ParsedExport, ExportError>)> = jobs
        .into_par_iter()
        .map(|(provider, path)| {
            let result = parse_export(&path, options);
            (provider, path, result)
        })
        .collect();

    let mut conversations = Vec::new();
    let mut assets = BTreeMap::new();
    let mut warnings = BTreeMap::new();
    let mut statuses = BTreeMap::new();

    for (configured, source, result) in results {
        match result {
            Ok(export) => {
                if export.provider != configured {
                    tracing::warn!(
                        configured = %configured,
                        detected = %export.provider,
                        path = %format_path_with_tilde(&source),
                        "export is for a different provider than configured"
                    );
                }
                eprintln!(
                    "Loaded {} {} conversations from {} ({} skipped, {} warnings)",
                    export.conversations.len(),
                    export.provider.label(),
                    format_path_with_tilde(&source),
                    export.skipped,
                    export.warnings.len()
                );
                statuses.insert(
                    configured,
                    ProviderStatus::Loaded {
                        source,
                        conversations: export.conversations.len(),
                        skipped: export.skipped,
                    },
                );
                // Keyed by the detected provider so lookups match `conversation.provider`
                if assets.insert(export.provider, export.assets).is_some() {
                    tracing::warn!(
                        provider = %export.provider,
                        "two exports for one provider; keeping the last asset registry"
                    );
                }
                warnings
                    .entry(export.provider)
                    .or_insert_with(ParseWarnings::new)
                    .extend(export.warnings);
                conversations.extend(export.conversations.into_iter().map(|mut conversation| {
                    conversation.is_favorite =
                        favorites.is_favorite(conversation.provider, &conversation.external_id);
                    conversation
                }));
            }
            Err(error) => {
                tracing::warn!(
                    provider = %configured,
                    path = %format_path_with_tilde(&source),
                    error = %error,
                    "failed to load export"
                );
                statuses.insert(configured, ProviderStatus::Failed { source, error });
            }
        }
    }

    let library = Library::new(conversations, assets, warnings, statuses);
    tracing::info!(
        conversations = library.len(),
        failed_providers = library.failed_providers(),
        "library loaded"
    );
    library
}
