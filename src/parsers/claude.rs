//! Claude `conversations.json` normalization.
//!
//! Claude messages are already linear. Each message has typed `content`
//! blocks plus two upload arrays: `attachments` (with extracted text) and
//! `files` (binary uploads). The same upload often appears in both; the file
//! copy is suppressed when the attachment at the same index carries the same
//! name.

use serde_json::{Map, Value};

use super::context::ParseContext;
use super::error::ConversationError;
use super::export::EmptyNameDedup;
use super::text::{extract_text, lightweight_metadata, string_or_none, u64_or_none};
use super::timestamps::{RawTimestamp, parse_iso};
use crate::models::{
    AssetInfo, AssetKind, BlockType, ContentBlock, ConversationRecord, MessageRecord, Provider,
    Role, WarningKind,
};
use crate::utils::time_group;

/// Normalize one Claude conversation object.
///
/// # Errors
///
/// Returns [`ConversationError::MissingId`] without a `uuid` and
/// [`ConversationError::InvalidShape`] when `chat_messages` is not an array.
pub(crate) fn parse_conversation(
    raw: &Map<String, Value>,
    ctx: &mut ParseContext<'_>,
) -> Result<ConversationRecord, ConversationError> {
    let id = string_or_none(raw.get("uuid")).ok_or(ConversationError::MissingId)?;
    let raw_messages = match raw.get("chat_messages") {
        Some(Value::Array(messages)) => messages.as_slice(),
        None | Some(Value::Null) => &[],
        Some(_) => {
            return Err(ConversationError::InvalidShape("chat_messages is not an array".to_string()));
        }
    };

    let created_raw = parse_iso(raw.get("created_at"));
    let mut created = created_raw.resolve(None, ctx.warnings, &id, "created_at");
    let mut updated = parse_iso(raw.get("updated_at")).resolve(Some(created), ctx.warnings, &id, "updated_at");

    let mut messages = Vec::with_capacity(raw_messages.len());
    for raw_message in raw_messages.iter().filter_map(Value::as_object) {
        if let Some(message) = parse_message(raw_message, &id, created, ctx) {
            messages.push(message);
        }
    }

    if !messages.is_empty() {
        let first = messages.iter().map(|m| m.created_at).min().unwrap_or(created);
        let last = messages.iter().map(|m| m.created_at).max().unwrap_or(updated);
        created = match created_raw {
            RawTimestamp::Missing => first,
            _ => created.min(first),
        };
        updated = updated.max(last).max(created);
    }

    Ok(ConversationRecord {
        provider: Provider::Claude,
        title: string_or_none(raw.get("name")).unwrap_or_default(),
        group: time_group(&created, &ctx.now),
        external_id: id,
        created_at: created,
        updated_at: updated,
        messages,
        is_favorite: false,
    })
}

fn parse_message(
    raw: &Map<String, Value>,
    conversation_id: &str,
    conversation_created: chrono::DateTime<chrono::Utc>,
    ctx: &mut ParseContext<'_>,
) -> Option<MessageRecord> {
    let message_id = string_or_none(raw.get("uuid"))?;

    let mut blocks: Vec<ContentBlock> = raw
        .get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .map(|block| content_block(block, conversation_id, ctx))
        .collect();

    // `text` is derived from `content`; only a fallback
    if blocks.is_empty() {
        let fallback = extract_text(raw.get("text"));
        if !fallback.is_empty() {
            blocks.push(ContentBlock::text(fallback));
        }
    }

    // Indices are positions in the raw arrays, non-object entries included
    let attachments = raw_list(raw.get("attachments"));
    let files = raw_list(raw.get("files"));

    for (index, attachment) in attachments.iter().enumerate() {
        if let Some(attachment) = attachment.as_object() {
            blocks.push(attachment_block(attachment, index));
        }
    }
    for (index, file) in files.iter().enumerate() {
        let Some(file) = file.as_object() else {
            continue;
        };
        let paired = attachments.get(index).and_then(Value::as_object);
        if is_duplicate_upload(paired, file, ctx.options.empty_name_dedup) {
            continue;
        }
        blocks.push(file_block(file, index));
    }

    if blocks.is_empty() {
        return None;
    }
    ctx.register_assets(conversation_id, &message_id, &mut blocks);

    let sender = raw.get("sender").and_then(Value::as_str).unwrap_or("unknown");
    let role = match sender {
        "human" | "user" => Role::User,
        "assistant" => Role::Assistant,
        other => {
            ctx.warn(
                WarningKind::UnknownRole { role: other.to_string() },
                conversation_id,
                format!("sender '{}' mapped to system", other),
            );
            Role::System
        }
    };

    let created_at = parse_iso(raw.get("created_at")).resolve(
        Some(conversation_created),
        ctx.warnings,
        conversation_id,
        "message created_at",
    );
    let updated_at = match parse_iso(raw.get("updated_at")) {
        RawTimestamp::Missing => None,
        other => Some(other.resolve(None, ctx.warnings, conversation_id, "message updated_at")),
    };

    Some(MessageRecord { id: message_id, role, created_at, updated_at, model: None, blocks })
}

fn raw_list(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

fn content_block(block: &Map<String, Value>, conversation_id: &str, ctx: &mut ParseContext<'_>) -> ContentBlock {
    let tag = block.get("type").and_then(Value::as_str).unwrap_or("unknown");
    let block_type = BlockType::from_tag(tag);
    let first = |keys: &[&str]| keys.iter().map(|key| extract_text(block.get(*key))).find(|text| !text.is_empty());

    let text = match &block_type {
        BlockType::Text => first(&["text"]),
        BlockType::Thinking => first(&["thinking"]),
        BlockType::ToolUse => first(&["message", "input"]),
        BlockType::ToolResult => first(&["message", "content", "display_content"]),
        BlockType::VoiceNote => first(&["text", "title"]),
        BlockType::TokenBudget | BlockType::Flag => None,
        _ => {
            ctx.warn(
                WarningKind::UnknownBlockType { tag: tag.to_string() },
                conversation_id,
                format!("unrecognized content block type '{}'", tag),
            );
            Some(extract_text(Some(&Value::Object(block.clone()))))
        }
    };

    let mut data = lightweight_metadata(block);
    if matches!(block_type, BlockType::ToolUse | BlockType::ToolResult) {
        data.insert("raw".to_string(), Value::Object(block.clone()));
    }
    ContentBlock::new(block_type, text.unwrap_or_default()).with_data(data)
}

fn attachment_block(attachment: &Map<String, Value>, index: usize) -> ContentBlock {
    let file_name =
        string_or_none(attachment.get("file_name")).unwrap_or_else(|| format!("attachment-{}", index + 1));
    let file_type = string_or_none(attachment.get("file_type")).unwrap_or_else(|| "unknown".to_string());
    // Kept verbatim: search and export need the full extracted text
    let extracted = attachment
        .get("extracted_content")
        .and_then(Value::as_str)
        .filter(|content| !content.trim().is_empty());

    let mut data = lightweight_metadata(attachment);
    data.insert("file_name".to_string(), file_name.clone().into());
    data.insert("file_type".to_string(), file_type.clone().into());
    data.insert("attachment_index".to_string(), index.into());
    if let Some(size) = u64_or_none(attachment.get("file_size")) {
        data.insert("file_size".to_string(), size.into());
    }
    data.insert("has_extracted_content".to_string(), extracted.is_some().into());

    let text = match extracted {
        Some(content) => {
            data.insert("attachment_label".to_string(), format!("{} ({})", file_name, file_type).into());
            data.insert("extracted_content_length".to_string(), content.chars().count().into());
            content.to_string()
        }
        None => format!("[Attachment] {} ({})", file_name, file_type),
    };

    ContentBlock::new(BlockType::Attachment, text).with_data(data)
}

fn file_block(file: &Map<String, Value>, index: usize) -> ContentBlock {
    let raw_name = string_or_none(file.get("file_name"));
    let file_name = raw_name.clone().unwrap_or_else(|| format!("file-{}", index + 1));

    let mut data = lightweight_metadata(file);
    data.insert("file_name".to_string(), file_name.clone().into());
    data.insert("file_index".to_string(), index.into());

    let mut block = ContentBlock::new(BlockType::File, format!("[File] {}", file_name)).with_data(data);
    // Only real upload names can match a file on disk
    if raw_name.is_some() {
        block.set_asset(&AssetInfo::unresolved(AssetKind::File, raw_name));
    }
    block
}

/// Whether `file` repeats the attachment at the same index.
fn is_duplicate_upload(
    attachment: Option<&Map<String, Value>>,
    file: &Map<String, Value>,
    empty_names: EmptyNameDedup,
) -> bool {
    let Some(attachment) = attachment else {
        return false;
    };
    let attachment_name = string_or_none(attachment.get("file_name"));
    let file_name = string_or_none(file.get("file_name"));

    match (attachment_name, file_name) {
        (Some(a), Some(f)) => a.to_lowercase() == f.to_lowercase(),
        (None, None) => empty_names == EmptyNameDedup::Suppress,
        _ => false,
    }
}
