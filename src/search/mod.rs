//! Strict (substring) search over loaded conversations.
//!
//! A query is lowercased and matched as a substring of each conversation's
//! display title and of each message's flattened text. Wrapping the query in
//! double quotes searches for the exact phrase between them, surrounding
//! whitespace trimmed. Hits come back in library order, a conversation's
//! title hit before its message hits.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{BlockFilter, ConversationRecord, MessageRecord, Provider, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Conversation,
    Message,
}

/// One search result.
///
/// For conversation hits `text` previews the first message (empty when there
/// is none) and `role` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub kind: HitKind,
    pub provider: Provider,
    pub conversation_id: String,
    pub title: String,
    pub message_id: Option<String>,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub open_url: String,
}

impl SearchHit {
    fn new(kind: HitKind, conversation: &ConversationRecord, message: Option<&MessageRecord>) -> Self {
        Self {
            kind,
            provider: conversation.provider,
            conversation_id: conversation.external_id.clone(),
            title: conversation.display_title().to_string(),
            message_id: message.map(|m| m.id.clone()),
            role: message.filter(|_| kind == HitKind::Message).map(|m| m.role),
            created_at: message.map_or(conversation.created_at, |m| m.created_at),
            text: message.map(|m| m.text(&BlockFilter::all())).unwrap_or_default(),
            open_url: conversation.open_url(),
        }
    }
}

/// Normalized needle: quotes stripped for exact phrases, lowercased.
pub fn normalize_query(query: &str) -> Option<String> {
    let query = query.trim();
    let needle = match query.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        Some(phrase) => phrase.trim(),
        None => query,
    };
    (!needle.is_empty()).then(|| needle.to_lowercase())
}

/// Case-insensitive substring search returning at most `limit` hits.
///
/// Blank queries return nothing.
///
/// # Examples
///
/// ```no_run
/// use chat_history_explorer::search::strict_search;
/// # let conversations: Vec<chat_history_explorer::ConversationRecord> = Vec::new();
///
/// for hit in strict_search(&conversations, "\"borrow checker\"", 20) {
///     println!("{} {}", hit.provider, hit.title);
/// }
/// ```
pub fn strict_search<'a, I>(conversations: I, query: &str, limit: usize) -> Vec<SearchHit>
where
    I: IntoIterator<Item = &'a ConversationRecord>,
{
    let Some(needle) = normalize_query(query) else {
        return Vec::new();
    };

    let mut hits = Vec::new();
    for conversation in conversations {
        if hits.len() >= limit {
            break;
        }
        if conversation.display_title().to_lowercase().contains(&needle) {
            hits.push(SearchHit::new(HitKind::Conversation, conversation, conversation.messages.first()));
        }
        for message in &conversation.messages {
            if hits.len() >= limit {
                break;
            }
            if message.text(&BlockFilter::all()).to_lowercase().contains(&needle) {
                hits.push(SearchHit::new(HitKind::Message, conversation, Some(message)));
            }
        }
    }

    hits.truncate(limit);
    hits
}
