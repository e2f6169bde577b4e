use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::block::{BlockCategory, ContentBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    ChatGpt,
    Claude,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::ChatGpt, Provider::Claude];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Claude => "claude",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ChatGpt => "ChatGPT",
            Self::Claude => "Claude",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "chatgpt" => Ok(Self::ChatGpt),
            "claude" => Ok(Self::Claude),
            other => Err(anyhow!("Unknown provider: '{}' (expected chatgpt or claude)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
    System,
    /// Synthetic rows inserted by presentation layers (e.g. time gaps)
    Internal,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::System => "system",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility switches applied by export and search consumers.
///
/// The parser always emits every block; these only decide what is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFilter {
    pub include_system: bool,
    pub include_tool: bool,
    pub include_thinking: bool,
    pub include_attachments: bool,
}

impl BlockFilter {
    pub fn all() -> Self {
        Self {
            include_system: true,
            include_tool: true,
            include_thinking: true,
            include_attachments: true,
        }
    }

    fn allows(&self, role: Role, block: &ContentBlock) -> bool {
        match block.category() {
            BlockCategory::Thinking if !self.include_thinking => false,
            BlockCategory::Tool if !self.include_tool => false,
            BlockCategory::Attachment if !self.include_attachments => false,
            BlockCategory::System if !self.include_system => false,
            _ => self.include_tool || role != Role::Tool,
        }
    }
}

impl Default for BlockFilter {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub model: Option<String>,
    pub blocks: Vec<ContentBlock>,
}

impl MessageRecord {
    pub fn visible_blocks<'a>(
        &'a self,
        filter: &'a BlockFilter,
    ) -> impl Iterator<Item = &'a ContentBlock> + 'a {
        let role_visible = filter.include_system || self.role != Role::System;
        self.blocks.iter().filter(move |block| role_visible && filter.allows(self.role, block))
    }

    /// Flattened text of the visible blocks, blank-line separated.
    pub fn text(&self, filter: &BlockFilter) -> String {
        let parts: Vec<&str> = self
            .visible_blocks(filter)
            .map(|block| block.text.trim())
            .filter(|text| !text.is_empty())
            .collect();
        parts.join("\n\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub provider: Provider,
    pub external_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<MessageRecord>,
    pub group: String,
    #[serde(default)]
    pub is_favorite: bool,
}

impl ConversationRecord {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() { "[Untitled]" } else { &self.title }
    }

    pub fn open_url(&self) -> String {
        match self.provider {
            Provider::ChatGpt => format!("https://chat.openai.com/c/{}", self.external_id),
            Provider::Claude => format!("https://claude.ai/chat/{}", self.external_id),
        }
    }

    /// Seconds between conversation start and its latest message.
    pub fn total_length_seconds(&self) -> i64 {
        self.messages
            .iter()
            .map(|message| message.created_at)
            .max()
            .map(|end| (end - self.created_at).num_seconds().max(0))
            .unwrap_or(0)
    }

    pub fn key(&self) -> (Provider, &str) {
        (self.provider, self.external_id.as_str())
    }
}
