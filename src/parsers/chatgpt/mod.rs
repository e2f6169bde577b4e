//! ChatGPT `conversations.json` normalization.
//!
//! Each conversation is a tree of message nodes (`mapping`) where edits and
//! regenerations create forks. Only the branch ending at `current_node` is
//! kept; see [`tree`] for the walk and [`content`] for block mapping.

pub mod content;
pub mod references;
pub mod tree;

use serde_json::{Map, Value};

use self::content::normalize_content;
use self::tree::ConversationTree;
use super::context::ParseContext;
use super::error::ConversationError;
use super::text::string_or_none;
use super::timestamps::{RawTimestamp, parse_unix_seconds};
use crate::models::{ConversationRecord, MessageRecord, Provider, Role, WarningKind};
use crate::utils::time_group;

/// Normalize one ChatGPT conversation object.
///
/// # Errors
///
/// Returns [`ConversationError`] when the conversation has no id, no usable
/// `mapping`, or a tree whose active branch cannot be resolved. The caller
/// records a warning and moves on to the next conversation.
pub(crate) fn parse_conversation(
    raw: &Map<String, Value>,
    ctx: &mut ParseContext<'_>,
) -> Result<ConversationRecord, ConversationError> {
    let id = string_or_none(raw.get("id"))
        .or_else(|| string_or_none(raw.get("conversation_id")))
        .ok_or(ConversationError::MissingId)?;

    let mapping = raw
        .get("mapping")
        .and_then(Value::as_object)
        .ok_or_else(|| ConversationError::InvalidShape("mapping is not an object".to_string()))?;

    let tree = ConversationTree::from_mapping(mapping);
    let branch = tree
        .active_branch(raw.get("current_node").and_then(Value::as_str))
        .map_err(|e| ConversationError::MalformedTree(e.to_string()))?;

    if branch.used_fallback {
        tracing::warn!(conversation_id = %id, "current_node missing from mapping, following first children");
        ctx.warn(WarningKind::MalformedTree, &id, "current_node missing from mapping; used first-child chain");
    }
    if branch.tie_breaks > 0 {
        ctx.warn(
            WarningKind::MalformedTree,
            &id,
            format!("{} node(s) had no child toward current_node; picked latest child", branch.tie_breaks),
        );
    }

    let created_raw = parse_unix_seconds(raw.get("create_time"));
    let mut created = created_raw.resolve(None, ctx.warnings, &id, "create_time");
    let mut updated =
        parse_unix_seconds(raw.get("update_time")).resolve(Some(created), ctx.warnings, &id, "update_time");
    let default_model = string_or_none(raw.get("default_model_slug"));

    let mut messages = Vec::new();
    for (node_id, message) in tree.messages(&branch) {
        if let Some(record) = parse_message(node_id, message, &id, created, default_model.as_deref(), ctx) {
            messages.push(record);
        }
    }

    if let (Some(first), Some(last)) = (messages.first(), messages.last()) {
        created = match created_raw {
            RawTimestamp::Missing => first.created_at,
            _ => created.min(first.created_at),
        };
        updated = updated.max(last.created_at).max(created);
    }

    Ok(ConversationRecord {
        provider: Provider::ChatGpt,
        title: string_or_none(raw.get("title")).unwrap_or_default(),
        group: time_group(&created, &ctx.now),
        external_id: id,
        created_at: created,
        updated_at: updated,
        messages,
        is_favorite: false,
    })
}

/// `None` for hidden messages and messages with nothing to render.
fn parse_message(
    node_id: &str,
    message: &Map<String, Value>,
    conversation_id: &str,
    conversation_created: chrono::DateTime<chrono::Utc>,
    default_model: Option<&str>,
    ctx: &mut ParseContext<'_>,
) -> Option<MessageRecord> {
    let metadata = message.get("metadata").and_then(Value::as_object);
    let hidden = metadata
        .and_then(|metadata| metadata.get("is_visually_hidden_from_conversation"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if hidden {
        return None;
    }

    let message_id = string_or_none(message.get("id")).unwrap_or_else(|| node_id.to_string());
    let mut blocks = normalize_content(message.get("content"), metadata, conversation_id, ctx.warnings);
    if blocks.is_empty() {
        return None;
    }
    ctx.register_assets(conversation_id, &message_id, &mut blocks);

    let raw_role = message
        .get("author")
        .and_then(|author| author.get("role"))
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let role = map_role(raw_role).unwrap_or_else(|| {
        ctx.warn(
            WarningKind::UnknownRole { role: raw_role.to_string() },
            conversation_id,
            format!("author role '{}' mapped to system", raw_role),
        );
        Role::System
    });

    let created_at = parse_unix_seconds(message.get("create_time")).resolve(
        Some(conversation_created),
        ctx.warnings,
        conversation_id,
        "message create_time",
    );
    let updated_at = match parse_unix_seconds(message.get("update_time")) {
        RawTimestamp::Missing => None,
        raw => Some(raw.resolve(None, ctx.warnings, conversation_id, "message update_time")),
    };

    let model = metadata
        .and_then(|metadata| string_or_none(metadata.get("model_slug")))
        .or_else(|| default_model.map(str::to_string));

    Some(MessageRecord { id: message_id, role, created_at, updated_at, model, blocks })
}

fn map_role(role: &str) -> Option<Role> {
    match role {
        "user" => Some(Role::User),
        "assistant" => Some(Role::Assistant),
        "tool" => Some(Role::Tool),
        "system" => Some(Role::System),
        _ => None,
    }
}
