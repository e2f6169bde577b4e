use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::context::ParseContext;
use super::detect::{DetectedFormat, detect_format};
use super::error::{ConversationError, ExportError};
use super::text::string_or_none;
use super::{chatgpt, claude};
use crate::assets::{AssetRegistry, AssetRegistryBuilder};
use crate::models::{ConversationRecord, ParseWarnings, Provider, WarningKind};
use crate::utils::asset_root_for;

/// Largest export file accepted by default (512 MiB)
pub const DEFAULT_MAX_FILE_BYTES: u64 = 512 * 1024 * 1024;

/// What to do with a Claude file whose name and matching attachment name are both empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyNameDedup {
    /// Treat the pair as one upload and hide the file block
    #[default]
    Suppress,
    /// Show both blocks
    Keep,
}

/// Parser policy knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub empty_name_dedup: EmptyNameDedup,
    pub max_file_bytes: u64,
    /// Instant display groups are computed against; `None` means now
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            empty_name_dedup: EmptyNameDedup::default(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            reference_time: None,
        }
    }
}

/// Everything produced by parsing one provider export.
#[derive(Debug, Clone)]
pub struct ParsedExport {
    pub provider: Provider,
    pub source: PathBuf,
    pub conversations: Vec<ConversationRecord>,
    pub warnings: ParseWarnings,
    pub assets: AssetRegistry,
    /// Array elements that did not become a conversation
    pub skipped: usize,
}

impl ParsedExport {
    pub fn into_parts(self) -> (Vec<ConversationRecord>, ParseWarnings) {
        (self.conversations, self.warnings)
    }

    pub fn message_count(&self) -> usize {
        self.conversations.iter().map(|c| c.messages.len()).sum()
    }
}

/// Parse a provider `conversations.json` file.
///
/// The provider is detected per file; media next to the file is used to
/// resolve asset pointers. Per-conversation problems are recorded as warnings
/// and never fail the call.
///
/// # Errors
///
/// Returns [`ExportError`] when the file cannot be read, exceeds
/// `options.max_file_bytes`, is not a JSON array, or contains no element
/// matching either provider.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use chat_history_explorer::parsers::{ParseOptions, parse_export};
///
/// let export = parse_export(Path::new("exports/chatgpt/conversations.json"), &ParseOptions::default())?;
/// println!("{} conversations, {} warnings", export.conversations.len(), export.warnings.len());
/// # Ok::<(), chat_history_explorer::parsers::ExportError>(())
/// ```
pub fn parse_export(path: &Path, options: &ParseOptions) -> Result<ParsedExport, ExportError> {
    let io_error = |source| ExportError::Io { path: path.to_path_buf(), source };

    // Size is checked on the open handle so the file cannot change in between
    let file = File::open(path).map_err(io_error)?;
    let size = file.metadata().map_err(io_error)?.len();
    if size > options.max_file_bytes {
        return Err(ExportError::TooLarge {
            path: path.to_path_buf(),
            size,
            max: options.max_file_bytes,
        });
    }

    let root: Value = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| ExportError::Json { path: path.to_path_buf(), source })?;

    parse_export_value(&root, path, &asset_root_for(path), options)
}

/// Parse an already-loaded export. `source` is only used in errors and logs.
///
/// # Errors
///
/// Returns [`ExportError::NotAnArray`] or [`ExportError::UnsupportedFormat`].
pub fn parse_export_value(
    root: &Value,
    source: &Path,
    asset_root: &Path,
    options: &ParseOptions,
) -> Result<ParsedExport, ExportError> {
    let items = root.as_array().ok_or_else(|| ExportError::NotAnArray { path: source.to_path_buf() })?;

    let provider = items
        .iter()
        .find_map(|item| detect_format(item).provider())
        .ok_or_else(|| ExportError::UnsupportedFormat { path: source.to_path_buf() })?;

    let mut warnings = ParseWarnings::new();
    let mut assets = AssetRegistryBuilder::new(provider, asset_root);
    let mut ctx = ParseContext {
        options,
        warnings: &mut warnings,
        assets: &mut assets,
        now: options.reference_time.unwrap_or_else(Utc::now),
    };

    let mut conversations = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            ctx.warnings.push(
                WarningKind::UnrecognizedRecord,
                None,
                format!("element {} is not an object", index),
            );
            skipped += 1;
            continue;
        };

        let label = best_effort_id(object, index);
        let detected = detect_format(item);
        if detected.provider() != Some(provider) {
            let message = match detected {
                DetectedFormat::Unknown => "matches neither provider format".to_string(),
                other => format!("looks like {:?} inside a {} export", other, provider.label()),
            };
            ctx.warn(WarningKind::UnrecognizedRecord, &label, message);
            skipped += 1;
            continue;
        }

        let result = match provider {
            Provider::ChatGpt => chatgpt::parse_conversation(object, &mut ctx),
            Provider::Claude => claude::parse_conversation(object, &mut ctx),
        };
        match result {
            Ok(conversation) => conversations.push(conversation),
            Err(e) => {
                let kind = match e {
                    ConversationError::MalformedTree(_) => WarningKind::MalformedTree,
                    _ => WarningKind::SkippedConversation,
                };
                ctx.warn(kind, &label, format!("skipped: {}", e));
                skipped += 1;
            }
        }
    }

    let assets = assets.finish();
    tracing::info!(
        provider = %provider,
        source = %source.display(),
        conversations = conversations.len(),
        skipped,
        warnings = warnings.len(),
        assets = assets.len(),
        "parsed export"
    );

    Ok(ParsedExport {
        provider,
        source: source.to_path_buf(),
        conversations,
        warnings,
        assets,
        skipped,
    })
}

/// Identifier used in warnings for a conversation that may lack one.
fn best_effort_id(object: &Map<String, Value>, index: usize) -> String {
    ["id", "conversation_id", "uuid"]
        .into_iter()
        .find_map(|key| string_or_none(object.get(key)))
        .unwrap_or_else(|| format!("#{}", index))
}
