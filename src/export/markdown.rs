use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::models::{BlockFilter, BlockType, ConversationRecord, MessageRecord};
use crate::utils::format_timestamp;

/// Output flavor of an exported conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Markdown,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Text => "txt",
        }
    }
}

/// Render one conversation as Markdown.
///
/// The header carries title, provider, id, creation time and open URL. Each
/// message with visible text becomes a `## <created> - <role>` section; `text`
/// and `code` blocks are written verbatim, every other block type is labeled
/// `**[<type>]**`.
pub fn render_conversation(conversation: &ConversationRecord, filter: &BlockFilter) -> String {
    render(conversation, filter, ExportFormat::Markdown)
}

pub fn render(conversation: &ConversationRecord, filter: &BlockFilter, format: ExportFormat) -> String {
    let created = format_timestamp(&conversation.created_at);
    let sections = conversation.messages.iter().filter_map(|message| {
        let body = message_body(message, filter, format)?;
        let stamp = format_timestamp(&message.created_at);
        Some(match format {
            ExportFormat::Markdown => format!("## {} - {}\n\n{}", stamp, message.role, body),
            ExportFormat::Text => format!("{} - {}\n{}", stamp, message.role, body),
        })
    });

    let mut parts = match format {
        ExportFormat::Markdown => vec![format!(
            "# {}\n\n- Provider: `{}`\n- Conversation ID: `{}`\n- Created: `{}`\n- Open URL: {}",
            conversation.display_title(),
            conversation.provider,
            conversation.external_id,
            created,
            conversation.open_url()
        )],
        ExportFormat::Text => vec![format!(
            "{}\nProvider: {}\nConversation ID: {}\nCreated: {}\nOpen URL: {}",
            conversation.display_title(),
            conversation.provider,
            conversation.external_id,
            created,
            conversation.open_url()
        )],
    };
    parts.extend(sections);

    let mut document = parts.join("\n\n");
    document.push('\n');
    document
}

fn message_body(message: &MessageRecord, filter: &BlockFilter, format: ExportFormat) -> Option<String> {
    let parts: Vec<String> = message
        .visible_blocks(filter)
        .filter_map(|block| {
            let text = block.text.trim();
            if text.is_empty() {
                return None;
            }
            Some(match (&block.block_type, format) {
                (BlockType::Text | BlockType::Code, _) => text.to_string(),
                (other, ExportFormat::Markdown) => format!("**[{}]**\n\n{}", other.as_str(), text),
                (other, ExportFormat::Text) => format!("[{}] {}", other.as_str(), text),
            })
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join("\n\n"))
}

/// `<provider>/<YYYY-MM-DD>-<hash12>.<ext>`, stable for a given conversation.
pub fn export_file_name(conversation: &ConversationRecord, format: ExportFormat) -> PathBuf {
    let digest = hex::encode(Sha256::digest(conversation.external_id.as_bytes()));
    Path::new(conversation.provider.as_str()).join(format!(
        "{}-{}.{}",
        conversation.created_at.format("%Y-%m-%d"),
        &digest[..12],
        format.extension()
    ))
}

/// Write one conversation under `out_dir` and return the file path.
///
/// # Errors
///
/// Returns an error if the provider directory or the file cannot be written.
pub fn export_conversation(
    conversation: &ConversationRecord,
    filter: &BlockFilter,
    format: ExportFormat,
    out_dir: &Path,
) -> Result<PathBuf> {
    let path = out_dir.join(export_file_name(conversation, format));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create export directory: {}", parent.display()))?;
    }

    fs::write(&path, render(conversation, filter, format))
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), id = %conversation.external_id, "exported conversation");
    Ok(path)
}
