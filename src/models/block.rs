use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::asset::{AssetInfo, AssetKind};

/// Open per-type metadata carried by a [`ContentBlock`].
pub type BlockData = Map<String, Value>;

/// Block type tag.
///
/// Known provider types get their own variant; anything else is kept verbatim
/// in [`BlockType::Other`] so new provider content never fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Text,
    Code,
    Thinking,
    Thoughts,
    ReasoningRecap,
    ToolUse,
    ToolResult,
    ExecutionOutput,
    SonicWebpage,
    TetherQuote,
    TetherBrowsingDisplay,
    SystemError,
    ImageAssetPointer,
    AudioAssetPointer,
    RealTimeUserAudioVideoAssetPointer,
    AudioTranscription,
    Attachment,
    File,
    VoiceNote,
    TokenBudget,
    Flag,
    Other(String),
}

/// Coarse grouping used by the visibility switches of the export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockCategory {
    Text,
    Thinking,
    Tool,
    Attachment,
    System,
    Other,
}

impl BlockType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "code" => Self::Code,
            "thinking" => Self::Thinking,
            "thoughts" => Self::Thoughts,
            "reasoning_recap" => Self::ReasoningRecap,
            "tool_use" => Self::ToolUse,
            "tool_result" => Self::ToolResult,
            "execution_output" => Self::ExecutionOutput,
            "sonic_webpage" => Self::SonicWebpage,
            "tether_quote" => Self::TetherQuote,
            "tether_browsing_display" => Self::TetherBrowsingDisplay,
            "system_error" => Self::SystemError,
            "image_asset_pointer" => Self::ImageAssetPointer,
            "audio_asset_pointer" => Self::AudioAssetPointer,
            "real_time_user_audio_video_asset_pointer" => Self::RealTimeUserAudioVideoAssetPointer,
            "audio_transcription" => Self::AudioTranscription,
            "attachment" => Self::Attachment,
            "file" => Self::File,
            "voice_note" => Self::VoiceNote,
            "token_budget" => Self::TokenBudget,
            "flag" => Self::Flag,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Thinking => "thinking",
            Self::Thoughts => "thoughts",
            Self::ReasoningRecap => "reasoning_recap",
            Self::ToolUse => "tool_use",
            Self::ToolResult => "tool_result",
            Self::ExecutionOutput => "execution_output",
            Self::SonicWebpage => "sonic_webpage",
            Self::TetherQuote => "tether_quote",
            Self::TetherBrowsingDisplay => "tether_browsing_display",
            Self::SystemError => "system_error",
            Self::ImageAssetPointer => "image_asset_pointer",
            Self::AudioAssetPointer => "audio_asset_pointer",
            Self::RealTimeUserAudioVideoAssetPointer => "real_time_user_audio_video_asset_pointer",
            Self::AudioTranscription => "audio_transcription",
            Self::Attachment => "attachment",
            Self::File => "file",
            Self::VoiceNote => "voice_note",
            Self::TokenBudget => "token_budget",
            Self::Flag => "flag",
            Self::Other(tag) => tag,
        }
    }

    pub fn category(&self) -> BlockCategory {
        match self {
            Self::Text | Self::Code | Self::AudioTranscription | Self::VoiceNote => {
                BlockCategory::Text
            }
            Self::Thinking | Self::Thoughts | Self::ReasoningRecap => BlockCategory::Thinking,
            Self::ToolUse
            | Self::ToolResult
            | Self::ExecutionOutput
            | Self::SonicWebpage
            | Self::TetherQuote
            | Self::TetherBrowsingDisplay => BlockCategory::Tool,
            Self::ImageAssetPointer
            | Self::AudioAssetPointer
            | Self::RealTimeUserAudioVideoAssetPointer
            | Self::Attachment
            | Self::File => BlockCategory::Attachment,
            Self::SystemError => BlockCategory::System,
            Self::TokenBudget | Self::Flag | Self::Other(_) => BlockCategory::Other,
        }
    }

    /// Asset kind for ChatGPT pointer parts, `None` for everything else.
    pub fn asset_kind(&self) -> Option<AssetKind> {
        match self {
            Self::ImageAssetPointer => Some(AssetKind::Image),
            Self::AudioAssetPointer | Self::RealTimeUserAudioVideoAssetPointer => {
                Some(AssetKind::Audio)
            }
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Placeholder shown when a block has nothing better to render.
    pub fn placeholder(&self) -> String {
        match self.asset_kind() {
            Some(AssetKind::Image) => "[Image]".to_string(),
            Some(AssetKind::Audio) => "[Audio]".to_string(),
            _ => format!("[{}]", humanize_tag(self.as_str())),
        }
    }
}

impl From<String> for BlockType {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        block_type.as_str().to_string()
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `"tool_use"` → `"Tool use"`
pub fn humanize_tag(tag: &str) -> String {
    let spaced = tag.replace('_', " ");
    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => "Unknown".to_string(),
    }
}

/// Atomic unit of normalized message content.
///
/// `text` is never empty: constructors substitute [`BlockType::placeholder`]
/// when a provider payload has no renderable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub text: String,
    #[serde(default)]
    pub data: BlockData,
}

impl ContentBlock {
    pub fn new(block_type: BlockType, text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.trim().is_empty() { block_type.placeholder() } else { text };
        Self { block_type, text, data: BlockData::new() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(BlockType::Text, text)
    }

    pub fn with_data(mut self, data: BlockData) -> Self {
        self.data = data;
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.data.insert(key.to_string(), value.into());
    }

    pub fn category(&self) -> BlockCategory {
        self.block_type.category()
    }

    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    pub fn data_u64(&self, key: &str) -> Option<u64> {
        self.data.get(key).and_then(Value::as_u64)
    }

    pub fn data_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    /// Typed view over `data.asset`.
    pub fn asset(&self) -> Option<AssetInfo> {
        self.data.get("asset").and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn set_asset(&mut self, asset: &AssetInfo) {
        // AssetInfo only holds strings, numbers and bools
        if let Ok(value) = serde_json::to_value(asset) {
            self.data.insert("asset".to_string(), value);
        }
    }
}
