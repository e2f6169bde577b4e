//! Local asset resolution for provider exports.
//!
//! Media referenced by conversations (ChatGPT image/audio pointers, Claude
//! uploaded files) is matched against the files sitting next to the export's
//! `conversations.json`. Matching is best-effort: an unresolved asset is a
//! normal state (`is_resolved == false`, no `asset_url`), never an error.

pub mod index;
pub mod registry;

pub use index::{AssetFileIndex, IndexedFile, pointer_id};
pub use registry::{
    AssetEntry, AssetKey, AssetKindStats, AssetRegistry, AssetRegistryBuilder, asset_url,
    media_type_for_path,
};
