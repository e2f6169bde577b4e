use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Audio,
    File,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::File => "file",
        };
        f.write_str(label)
    }
}

/// Normalized asset metadata stored under `data.asset` of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    #[serde(default)]
    pub asset_id: Option<String>,
    pub kind: AssetKind,
    #[serde(default)]
    pub source_pointer: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    pub is_resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_url: Option<String>,
}

impl AssetInfo {
    pub fn unresolved(kind: AssetKind, source_pointer: Option<String>) -> Self {
        Self {
            asset_id: None,
            kind,
            source_pointer,
            mime_type: None,
            size_bytes: None,
            width: None,
            height: None,
            format: None,
            duration: None,
            is_resolved: false,
            asset_url: None,
        }
    }
}
