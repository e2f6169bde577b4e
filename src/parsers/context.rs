use chrono::{DateTime, Utc};

use super::export::ParseOptions;
use crate::assets::{AssetKey, AssetRegistryBuilder};
use crate::models::{ContentBlock, ParseWarnings, WarningKind};

/// Mutable state threaded through the normalizers for one export.
pub(crate) struct ParseContext<'a> {
    pub options: &'a ParseOptions,
    pub warnings: &'a mut ParseWarnings,
    pub assets: &'a mut AssetRegistryBuilder,
    /// Reference instant for display groups
    pub now: DateTime<Utc>,
}

impl ParseContext<'_> {
    pub fn warn(&mut self, kind: WarningKind, conversation_id: &str, message: impl Into<String>) {
        self.warnings.push(kind, Some(conversation_id), message);
    }

    /// Give every asset-bearing block its id, resolution state and URL.
    ///
    /// Runs on a message's final block list so `block_index` matches what
    /// consumers see.
    pub fn register_assets(
        &mut self,
        conversation_id: &str,
        message_id: &str,
        blocks: &mut [ContentBlock],
    ) {
        for (block_index, block) in blocks.iter_mut().enumerate() {
            let Some(info) = block.asset() else {
                continue;
            };
            let key = AssetKey {
                conversation_id,
                message_id,
                block_type: block.block_type.as_str(),
                block_index,
            };
            let info = self.assets.register(key, info);
            block.set_asset(&info);
        }
    }
}
