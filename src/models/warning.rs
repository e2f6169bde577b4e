use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a non-fatal parse diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// ChatGPT mapping without a root, or a `current_node` the root cannot reach
    MalformedTree,
    UnknownContentType { tag: String },
    UnknownBlockType { tag: String },
    /// Timestamp present but unparseable; epoch-zero was used instead
    TimestampParse,
    /// Array element matching neither provider signature
    UnrecognizedRecord,
    SkippedConversation,
    UnknownRole { role: String },
}

impl WarningKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MalformedTree => "malformed_tree",
            Self::UnknownContentType { .. } => "unknown_content_type",
            Self::UnknownBlockType { .. } => "unknown_block_type",
            Self::TimestampParse => "timestamp_parse",
            Self::UnrecognizedRecord => "unrecognized_record",
            Self::SkippedConversation => "skipped_conversation",
            Self::UnknownRole { .. } => "unknown_role",
        }
    }

    /// The unknown tag for schema-drift kinds.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::UnknownContentType { tag } | Self::UnknownBlockType { tag } => Some(tag),
            Self::UnknownRole { role } => Some(role),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub kind: WarningKind,
    pub conversation_id: Option<String>,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.conversation_id {
            Some(id) => write!(f, "[{}] {}: {}", self.kind.label(), id, self.message),
            None => write!(f, "[{}] {}", self.kind.label(), self.message),
        }
    }
}

/// Warning collector threaded through one parse run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarnings {
    warnings: Vec<ParseWarning>,
}

impl ParseWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: WarningKind,
        conversation_id: Option<&str>,
        message: impl Into<String>,
    ) {
        let warning = ParseWarning {
            kind,
            conversation_id: conversation_id.map(str::to_string),
            message: message.into(),
        };
        tracing::debug!(warning = %warning, "parse warning");
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, other: ParseWarnings) {
        self.warnings.extend(other.warnings);
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseWarning> {
        self.warnings.iter()
    }

    pub fn count_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for warning in &self.warnings {
            *counts.entry(warning.kind.label()).or_insert(0) += 1;
        }
        counts
    }

    /// Occurrences of every unknown content/block type tag.
    pub fn unknown_tag_inventory(&self) -> BTreeMap<String, usize> {
        let mut inventory = BTreeMap::new();
        for warning in &self.warnings {
            if let WarningKind::UnknownContentType { tag } | WarningKind::UnknownBlockType { tag } =
                &warning.kind
            {
                *inventory.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        inventory
    }

    pub fn samples(&self, limit: usize) -> &[ParseWarning] {
        &self.warnings[..limit.min(self.warnings.len())]
    }

    pub fn into_vec(self) -> Vec<ParseWarning> {
        self.warnings
    }
}

impl IntoIterator for ParseWarnings {
    type Item = ParseWarning;
    type IntoIter = std::vec::IntoIter<ParseWarning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.into_iter()
    }
}
