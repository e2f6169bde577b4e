use std::collections::HashSet;

use serde_json::{Map, Value};

use super::references::apply_content_references;
use crate::models::{AssetInfo, BlockType, ContentBlock, ParseWarnings, WarningKind, humanize_tag};
use crate::parsers::text::{
    extract_text, f64_or_none, lightweight_metadata, normalize_whitespace, string_or_none,
    u64_or_none,
};

const KNOWN_CONTENT_TYPES: &[&str] = &[
    "text",
    "code",
    "multimodal_text",
    "thoughts",
    "reasoning_recap",
    "execution_output",
    "sonic_webpage",
    "tether_quote",
    "tether_browsing_display",
    "system_error",
];

const KNOWN_PART_TYPES: &[&str] = &[
    "text",
    "image_asset_pointer",
    "audio_asset_pointer",
    "audio_transcription",
    "real_time_user_audio_video_asset_pointer",
];

/// Tool and system output kept with its full payload under `data.raw`
const PASS_THROUGH_TYPES: &[&str] =
    &["execution_output", "sonic_webpage", "tether_quote", "tether_browsing_display", "system_error"];

const POINTER_KEYS: &[&str] =
    &["asset_pointer", "audio_asset_pointer", "video_container_asset_pointer", "id"];

/// Normalize one ChatGPT `message.content` object into blocks.
///
/// Never fails: unknown content or part types become blocks of their literal
/// tag with best-effort text, and a warning keyed by the tag is recorded.
/// Returns an empty list for content with nothing to show (e.g. empty system
/// prompts), which callers use to drop the message.
pub fn normalize_content(
    content: Option<&Value>,
    metadata: Option<&Map<String, Value>>,
    conversation_id: &str,
    warnings: &mut ParseWarnings,
) -> Vec<ContentBlock> {
    let Some(content) = content.and_then(Value::as_object) else {
        return Vec::new();
    };
    let content_type = content.get("content_type").and_then(Value::as_str).unwrap_or("unknown");

    if !KNOWN_CONTENT_TYPES.contains(&content_type) {
        warnings.push(
            WarningKind::UnknownContentType { tag: content_type.to_string() },
            Some(conversation_id),
            format!("unrecognized content_type '{}'", content_type),
        );
    }

    let mut blocks = match content_type {
        "thoughts" => text_block(BlockType::Thoughts, extract_text(content.get("thoughts")), content),
        "reasoning_recap" => {
            text_block(BlockType::ReasoningRecap, extract_text(content.get("content")), content)
        }
        "tether_browsing_display" => {
            let text = non_empty(extract_text(content.get("summary")))
                .unwrap_or_else(|| extract_text(content.get("result")));
            text_block(BlockType::TetherBrowsingDisplay, text, content)
        }
        _ => parts_blocks(content_type, content, conversation_id, warnings),
    };

    if content_type == "code" && blocks.is_empty() {
        let metadata = metadata.cloned().unwrap_or_default();
        let code = non_empty(extract_text(metadata.get("finished_text")))
            .unwrap_or_else(|| extract_text(metadata.get("initial_text")));
        if !code.is_empty() {
            let mut merged = metadata;
            merged.extend(content.clone());
            blocks.push(ContentBlock::new(BlockType::Code, code).with_data(lightweight_metadata(&merged)));
        }
    }

    if blocks.is_empty() {
        match fallback_block(content_type, content) {
            Some(block) => blocks.push(block),
            None => return Vec::new(),
        }
    }

    if PASS_THROUGH_TYPES.contains(&content_type) {
        for block in &mut blocks {
            block.insert("raw", Value::Object(content.clone()));
        }
    }

    finalize(blocks, metadata)
}

fn text_block(block_type: BlockType, text: String, content: &Map<String, Value>) -> Vec<ContentBlock> {
    if text.is_empty() {
        return Vec::new();
    }
    vec![ContentBlock::new(block_type, text).with_data(lightweight_metadata(content))]
}

/// `text`/`code`/`multimodal_text` and anything unknown: direct text plus parts.
fn parts_blocks(
    content_type: &str,
    content: &Map<String, Value>,
    conversation_id: &str,
    warnings: &mut ParseWarnings,
) -> Vec<ContentBlock> {
    let string_type = match content_type {
        "multimodal_text" => BlockType::Text,
        other => BlockType::from_tag(other),
    };
    let mut blocks = Vec::new();

    let direct = extract_text(content.get("text"));
    if !direct.is_empty() {
        let mut block = ContentBlock::new(string_type.clone(), direct).with_data(lightweight_metadata(content));
        tag_language(&mut block, content);
        blocks.push(block);
    }

    // Only multimodal parts are separate blocks; other string parts join into one
    let per_part = content_type == "multimodal_text";
    let mut joined: Vec<&str> = Vec::new();
    let mut joined_at = None;

    let parts = content.get("parts").and_then(Value::as_array).into_iter().flatten();
    for part in parts {
        match part {
            Value::String(s) if !s.trim().is_empty() => {
                if per_part {
                    blocks.push(ContentBlock::new(string_type.clone(), s.trim()));
                } else {
                    joined_at.get_or_insert(blocks.len());
                    joined.push(s.trim());
                }
            }
            Value::Object(part) => blocks.push(part_block(part, conversation_id, warnings)),
            _ => {}
        }
    }

    if let Some(index) = joined_at {
        let mut block = ContentBlock::new(string_type, joined.join("\n")).with_data(lightweight_metadata(content));
        tag_language(&mut block, content);
        blocks.insert(index, block);
    }

    blocks
}

fn tag_language(block: &mut ContentBlock, content: &Map<String, Value>) {
    if block.block_type == BlockType::Code
        && let Some(language) = string_or_none(content.get("language"))
    {
        block.insert("language", language);
    }
}

/// One typed `multimodal_text` part.
fn part_block(part: &Map<String, Value>, conversation_id: &str, warnings: &mut ParseWarnings) -> ContentBlock {
    let part_type = ["content_type", "type"]
        .into_iter()
        .find_map(|key| part.get(key).and_then(Value::as_str))
        .unwrap_or("object");
    if !KNOWN_PART_TYPES.contains(&part_type) {
        warnings.push(
            WarningKind::UnknownContentType { tag: part_type.to_string() },
            Some(conversation_id),
            format!("unrecognized part type '{}'", part_type),
        );
    }

    let block_type = BlockType::from_tag(part_type);
    let text = non_empty(extract_text(part.get("text")))
        .or_else(|| non_empty(extract_text(part.get("message"))))
        .unwrap_or_else(|| extract_text(part.get("title")));

    let mut data = lightweight_metadata(part);
    let asset = asset_info(&block_type, part);
    let mut block = ContentBlock::new(block_type, text);
    // Nested pointer objects are not scalars, so record the resolved pointer string
    if let Some(pointer) = asset.as_ref().and_then(|asset| asset.source_pointer.clone()) {
        data.entry("asset_pointer".to_string()).or_insert(Value::String(pointer));
    }
    block.data = data;
    if let Some(asset) = asset {
        block.set_asset(&asset);
    }
    block
}

/// Unresolved asset metadata for pointer parts; `None` for non-asset parts.
fn asset_info(block_type: &BlockType, part: &Map<String, Value>) -> Option<AssetInfo> {
    let kind = block_type.asset_kind()?;
    let nested = POINTER_KEYS
        .iter()
        .filter_map(|key| part.get(*key))
        .find_map(Value::as_object);

    let field = |key: &str| part.get(key).or_else(|| nested.and_then(|nested| nested.get(key)));

    let pointer = POINTER_KEYS
        .iter()
        .find_map(|key| string_or_none(part.get(*key)))
        .or_else(|| nested.and_then(|nested| string_or_none(nested.get("asset_pointer"))));

    let mut info = AssetInfo::unresolved(kind, pointer);
    info.mime_type = string_or_none(field("mime_type"));
    info.size_bytes = u64_or_none(field("size_bytes"));
    info.width = u64_or_none(field("width")).and_then(|w| u32::try_from(w).ok());
    info.height = u64_or_none(field("height")).and_then(|h| u32::try_from(h).ok());
    info.format = string_or_none(field("format"));
    info.duration = ["duration_seconds", "duration_sec", "duration"]
        .into_iter()
        .find_map(|key| f64_or_none(field(key)))
        .or_else(|| {
            let metadata = field("metadata").and_then(Value::as_object)?;
            f64_or_none(metadata.get("end")).zip(f64_or_none(metadata.get("start"))).map(|(end, start)| end - start)
        });
    Some(info)
}

/// Block for content that produced nothing else; `None` means "drop the message".
fn fallback_block(content_type: &str, content: &Map<String, Value>) -> Option<ContentBlock> {
    let mut text = extract_text(Some(&Value::Object(content.clone())));
    if text.is_empty() && content_type == "text" {
        return None;
    }
    if text.trim().eq_ignore_ascii_case(content_type.trim()) {
        if content_type == "text" {
            return None;
        }
        text.clear();
    }
    if text.is_empty() {
        text = format!("[{}]", humanize_tag(content_type));
    }
    Some(ContentBlock::new(BlockType::from_tag(content_type), text).with_data(lightweight_metadata(content)))
}

/// Render citations, then drop empty and duplicate blocks.
fn finalize(blocks: Vec<ContentBlock>, metadata: Option<&Map<String, Value>>) -> Vec<ContentBlock> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(blocks.len());

    for mut block in blocks {
        let rendered = apply_content_references(&block.text, metadata).trim().to_string();
        if rendered.is_empty() {
            continue;
        }
        if !seen.insert(dedupe_key(&block, &rendered)) {
            continue;
        }
        block.text = rendered;
        out.push(block);
    }
    out
}

fn dedupe_key(block: &ContentBlock, rendered: &str) -> (String, String, Option<String>) {
    let pointer = block
        .asset()
        .and_then(|asset| asset.source_pointer)
        .or_else(|| block.data_str("asset_pointer").map(str::to_string));
    (block.block_type.as_str().to_string(), normalize_whitespace(rendered), pointer)
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}
