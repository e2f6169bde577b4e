//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// 2023-11-14T22:13:20Z
pub const BASE_TIME: f64 = 1_700_000_000.0;

/// Temporary data directory holding provider exports and their media
pub struct ExportDir {
    temp_dir: TempDir,
}

impl ExportDir {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn chatgpt_dir(&self) -> PathBuf {
        self.path().join("chatgpt")
    }

    pub fn claude_dir(&self) -> PathBuf {
        self.path().join("claude")
    }

    /// Write `chatgpt/conversations.json` and return its path
    pub fn write_chatgpt(&self, export: &Value) -> PathBuf {
        self.write_export(&self.chatgpt_dir(), &export.to_string())
    }

    /// Write `claude/conversations.json` and return its path
    pub fn write_claude(&self, export: &Value) -> PathBuf {
        self.write_export(&self.claude_dir(), &export.to_string())
    }

    pub fn write_export(&self, dir: &Path, content: &str) -> PathBuf {
        fs::create_dir_all(dir).expect("Failed to create export dir");
        let path = dir.join("conversations.json");
        fs::write(&path, content).expect("Failed to write conversations.json");
        path
    }

    /// Drop a media file next to an export (relative to the export directory)
    pub fn add_media(&self, export_dir: &Path, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = export_dir.join(relative);
        fs::create_dir_all(path.parent().expect("media path has a parent"))
            .expect("Failed to create media dir");
        fs::write(&path, bytes).expect("Failed to write media file");
        path
    }

    pub fn write_favorites(&self, entries: &[(&str, &str)]) -> PathBuf {
        let favorites: Vec<Value> = entries
            .iter()
            .map(|(provider, id)| json!({"provider": provider, "conversation_id": id}))
            .collect();
        let path = self.path().join("favorites.json");
        fs::write(&path, Value::Array(favorites).to_string()).expect("Failed to write favorites");
        path
    }
}

impl Default for ExportDir {
    fn default() -> Self {
        Self::new()
    }
}

/// ChatGPT message payload: `{id, author, content, create_time, metadata}`
pub fn chatgpt_message(id: &str, role: &str, text: &str, create_time: f64) -> Value {
    json!({
        "id": id,
        "author": {"role": role},
        "create_time": create_time,
        "content": {"content_type": "text", "parts": [text]},
        "metadata": {}
    })
}

/// Builder for one ChatGPT conversation with a parent-pointer `mapping`.
///
/// Starts with a `root` node carrying no message.
pub struct ChatGptConversationBuilder {
    id: String,
    title: String,
    create_time: Option<Value>,
    mapping: serde_json::Map<String, Value>,
    current_node: Option<String>,
    last: String,
}

impl ChatGptConversationBuilder {
    pub fn new(id: &str, title: &str) -> Self {
        let mut mapping = serde_json::Map::new();
        mapping.insert(
            "root".to_string(),
            json!({"id": "root", "parent": null, "children": [], "message": null}),
        );
        Self {
            id: id.to_string(),
            title: title.to_string(),
            create_time: Some(json!(BASE_TIME)),
            mapping,
            current_node: None,
            last: "root".to_string(),
        }
    }

    pub fn create_time(mut self, value: Value) -> Self {
        self.create_time = Some(value);
        self
    }

    /// Append a text message under the most recently added node
    pub fn message(self, node_id: &str, role: &str, text: &str) -> Self {
        let offset = self.mapping.len() as f64;
        let parent = self.last.clone();
        self.node(node_id, &parent, chatgpt_message(node_id, role, text, BASE_TIME + offset))
    }

    /// Add a node with an explicit parent and message payload
    pub fn node(mut self, node_id: &str, parent: &str, message: Value) -> Self {
        if let Some(Value::Object(parent_node)) = self.mapping.get_mut(parent)
            && let Some(Value::Array(children)) = parent_node.get_mut("children")
        {
            children.push(json!(node_id));
        }
        self.mapping.insert(
            node_id.to_string(),
            json!({"id": node_id, "parent": parent, "children": [], "message": message}),
        );
        self.last = node_id.to_string();
        self
    }

    /// Continue appending from `node_id` (to build forks)
    pub fn from_node(mut self, node_id: &str) -> Self {
        self.last = node_id.to_string();
        self
    }

    pub fn current_node(mut self, node_id: &str) -> Self {
        self.current_node = Some(node_id.to_string());
        self
    }

    pub fn build(self) -> Value {
        let current = self.current_node.unwrap_or(self.last);
        let mut conversation = json!({
            "id": self.id,
            "title": self.title,
            "mapping": Value::Object(self.mapping),
            "current_node": current,
        });
        if let Some(create_time) = self.create_time {
            conversation["create_time"] = create_time.clone();
            conversation["update_time"] = create_time;
        }
        conversation
    }
}

/// Builder for one Claude message
pub struct ClaudeMessageBuilder {
    message: Value,
}

impl ClaudeMessageBuilder {
    pub fn new(uuid: &str, sender: &str) -> Self {
        Self {
            message: json!({
                "uuid": uuid,
                "sender": sender,
                "text": "",
                "content": [],
                "created_at": "2023-11-14T22:13:20Z",
                "updated_at": "2023-11-14T22:13:20Z",
                "attachments": [],
                "files": []
            }),
        }
    }

    pub fn created_at(mut self, value: &str) -> Self {
        self.message["created_at"] = json!(value);
        self
    }

    /// Set the top-level `text` field only
    pub fn text_field(mut self, text: &str) -> Self {
        self.message["text"] = json!(text);
        self
    }

    pub fn block(mut self, block: Value) -> Self {
        if let Some(content) = self.message["content"].as_array_mut() {
            content.push(block);
        }
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.block(json!({"type": "text", "text": text}))
    }

    pub fn attachment(mut self, file_name: &str, extracted_content: &str) -> Self {
        if let Some(attachments) = self.message["attachments"].as_array_mut() {
            attachments.push(json!({
                "file_name": file_name,
                "file_type": "txt",
                "file_size": extracted_content.len(),
                "extracted_content": extracted_content
            }));
        }
        self
    }

    pub fn file(mut self, file_name: &str) -> Self {
        if let Some(files) = self.message["files"].as_array_mut() {
            files.push(json!({"file_name": file_name}));
        }
        self
    }

    pub fn build(self) -> Value {
        self.message
    }
}

/// Builder for one Claude conversation
pub struct ClaudeConversationBuilder {
    conversation: Value,
}

impl ClaudeConversationBuilder {
    pub fn new(uuid: &str, name: &str) -> Self {
        Self {
            conversation: json!({
                "uuid": uuid,
                "name": name,
                "created_at": "2023-11-14T22:13:20Z",
                "updated_at": "2023-11-14T22:13:20Z",
                "chat_messages": []
            }),
        }
    }

    pub fn created_at(mut self, value: &str) -> Self {
        self.conversation["created_at"] = json!(value);
        self.conversation["updated_at"] = json!(value);
        self
    }

    pub fn message(mut self, message: ClaudeMessageBuilder) -> Self {
        if let Some(messages) = self.conversation["chat_messages"].as_array_mut() {
            messages.push(message.build());
        }
        self
    }

    pub fn build(self) -> Value {
        self.conversation
    }
}

/// Export array from already-built conversations
pub fn export_of(conversations: Vec<Value>) -> Value {
    Value::Array(conversations)
}
