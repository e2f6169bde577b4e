//! Chat History Explorer - Normalize and browse ChatGPT and Claude conversation exports
//!
//! This library turns the `conversations.json` files produced by the ChatGPT and
//! Claude data exports into one provider-neutral model. It supports:
//!
//! - Detecting the provider of an export from its record shape
//! - Walking ChatGPT's branching message trees down the active branch
//! - Normalizing every message into typed content blocks with never-empty text
//! - Resolving image, audio and file pointers against media next to the export
//! - Loading both providers into one library with favorites joined in
//! - Filtering, strict search and Markdown export over the loaded conversations
//!
//! # Example
//!
//! ```no_run
//! use chat_history_explorer::{ParseOptions, parse_export};
//! use std::path::Path;
//!
//! let export = parse_export(Path::new("exports/claude/conversations.json"), &ParseOptions::default())?;
//! for conversation in &export.conversations {
//!     println!("{} ({} messages)", conversation.display_title(), conversation.messages.len());
//! }
//! println!("{} warnings", export.warnings.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod assets;
pub mod cli;
pub mod export;
pub mod filters;
pub mod indexer;
pub mod models;
pub mod parsers;
pub mod search;
pub mod utils;

// Re-export commonly used types
pub use indexer::{FavoriteLookup, FavoriteSet, Library, load_library};
pub use models::{BlockType, ContentBlock, ConversationRecord, MessageRecord, Provider};
pub use parsers::{ParseOptions, ParsedExport, detect_format, parse_export};
pub use utils::{Settings, format_path_with_tilde};
