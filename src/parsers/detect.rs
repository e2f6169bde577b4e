use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::export::DEFAULT_MAX_FILE_BYTES;
use super::timestamps::{parse_iso, parse_unix_seconds};
use crate::models::Provider;
use crate::utils::validate_file_size;

/// Result of classifying one raw conversation element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedFormat {
    ChatGpt,
    Claude,
    Unknown,
}

impl DetectedFormat {
    pub fn provider(self) -> Option<Provider> {
        match self {
            Self::ChatGpt => Some(Provider::ChatGpt),
            Self::Claude => Some(Provider::Claude),
            Self::Unknown => None,
        }
    }
}

/// Classify a single conversation element by its key signature.
///
/// `mapping` + `current_node` is ChatGPT, `uuid` + `chat_messages` is Claude.
/// Never fails; anything else is [`DetectedFormat::Unknown`].
///
/// # Examples
///
/// ```
/// use chat_history_explorer::parsers::{DetectedFormat, detect_format};
/// use serde_json::json;
///
/// let raw = json!({"uuid": "c1", "chat_messages": []});
/// assert_eq!(detect_format(&raw), DetectedFormat::Claude);
/// assert_eq!(detect_format(&json!([])), DetectedFormat::Unknown);
/// ```
pub fn detect_format(raw: &Value) -> DetectedFormat {
    let Some(object) = raw.as_object() else {
        return DetectedFormat::Unknown;
    };

    if object.contains_key("mapping") && object.contains_key("current_node") {
        DetectedFormat::ChatGpt
    } else if object.contains_key("uuid") && object.contains_key("chat_messages") {
        DetectedFormat::Claude
    } else {
        DetectedFormat::Unknown
    }
}

/// Quick facts about an export file, without normalizing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub provider: Provider,
    pub conversations: usize,
    pub first_date: Option<DateTime<Utc>>,
    pub last_date: Option<DateTime<Utc>>,
}

/// Validate an export file before committing to a full parse.
///
/// The provider is detected from the first array element only.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a non-empty JSON array
/// of objects, or its first element matches neither provider.
pub fn inspect_export_file(path: &Path) -> Result<ExportSummary> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open export file: {}", path.display()))?;
    validate_file_size(&file, path, DEFAULT_MAX_FILE_BYTES)?;

    let root: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid JSON in export file: {}", path.display()))?;

    let Some(items) = root.as_array() else {
        bail!("Export file is not a JSON array: {}", path.display());
    };
    let Some(first) = items.first() else {
        bail!("Export file contains no conversations: {}", path.display());
    };
    if !first.is_object() {
        bail!("First element of {} is not a conversation object", path.display());
    }

    let Some(provider) = detect_format(first).provider() else {
        bail!("No conversations found / unsupported format: {}", path.display());
    };

    let dates: Vec<DateTime<Utc>> = items
        .iter()
        .filter_map(|item| {
            let object = item.as_object()?;
            match provider {
                Provider::ChatGpt => parse_unix_seconds(object.get("create_time")).ok(),
                Provider::Claude => parse_iso(object.get("created_at")).ok(),
            }
        })
        .collect();

    Ok(ExportSummary {
        provider,
        conversations: items.len(),
        first_date: dates.iter().min().copied(),
        last_date: dates.iter().max().copied(),
    })
}
