//! Best-effort text and metadata extraction from untyped provider JSON.

use serde_json::{Map, Value};

use crate::models::BlockData;

const MAX_DEPTH: usize = 5;
const MAX_LIST_ITEMS: usize = 12;
const MAX_OBJECT_KEYS: usize = 16;

const SKIPPED_KEYS: &[&str] = &["content_type", "type", "role", "status", "recipient", "channel"];
const PRIORITY_KEYS: &[&str] = &[
    "text", "thinking", "summary", "message", "title", "name", "content", "url", "snippet",
    "domain",
];

/// Keys whose string values are kept even when long (truncated to 2000 chars)
const LONG_TEXT_KEYS: &[&str] = &[
    "asset_pointer",
    "audio_asset_pointer",
    "video_container_asset_pointer",
    "url",
    "ref_id",
    "file_name",
    "file_type",
    "tool_use_id",
    "command",
    "name",
    "id",
];
const BODY_KEYS: &[&str] = &["text", "thinking", "parts", "content", "thoughts"];
const MAX_LONG_TEXT_CHARS: usize = 2000;
const MAX_SHORT_TEXT_CHARS: usize = 200;

/// Flatten an arbitrary JSON value into renderable text.
///
/// Objects are walked priority keys first, structural keys (`type`, `role`,
/// ...) are skipped. Never fails; returns an empty string when nothing is found.
pub fn extract_text(value: Option<&Value>) -> String {
    value.map(|value| extract_at_depth(value, 0)).unwrap_or_default()
}

fn extract_at_depth(value: &Value, depth: usize) -> String {
    if depth > MAX_DEPTH {
        return String::new();
    }

    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => join_non_empty(
            items.iter().take(MAX_LIST_ITEMS).map(|item| extract_at_depth(item, depth + 1)),
        ),
        Value::Object(map) => {
            let ordered = PRIORITY_KEYS
                .iter()
                .copied()
                .filter(|key| map.contains_key(*key))
                .chain(map.keys().map(String::as_str).filter(|key| !PRIORITY_KEYS.contains(key)))
                .take(MAX_OBJECT_KEYS)
                .filter(|key| !SKIPPED_KEYS.contains(key));

            join_non_empty(
                ordered.filter_map(|key| map.get(key)).map(|v| extract_at_depth(v, depth + 1)),
            )
        }
    }
}

fn join_non_empty(parts: impl Iterator<Item = String>) -> String {
    let parts: Vec<String> = parts.filter(|part| !part.is_empty()).collect();
    parts.join("\n").trim().to_string()
}

/// Scalar fields of a payload worth keeping as block metadata.
pub fn lightweight_metadata(payload: &Map<String, Value>) -> BlockData {
    let mut data = BlockData::new();

    for (key, value) in payload {
        if BODY_KEYS.contains(&key.as_str()) {
            continue;
        }
        match value {
            Value::Bool(_) | Value::Number(_) => {
                data.insert(key.clone(), value.clone());
            }
            Value::String(s) if LONG_TEXT_KEYS.contains(&key.as_str()) => {
                data.insert(key.clone(), Value::String(truncate_chars(s, MAX_LONG_TEXT_CHARS)));
            }
            Value::String(s) if s.chars().count() <= MAX_SHORT_TEXT_CHARS => {
                data.insert(key.clone(), value.clone());
            }
            _ => {}
        }
    }

    data
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_index, _)) => s[..byte_index].to_string(),
        None => s.to_string(),
    }
}

/// Non-empty trimmed string, or `None`.
pub fn string_or_none(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

pub fn u64_or_none(value: Option<&Value>) -> Option<u64> {
    match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn f64_or_none(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
