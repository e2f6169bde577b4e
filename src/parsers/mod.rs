//! Provider export parsers for ChatGPT and Claude `conversations.json` files
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach:
//!
//! - **Per-conversation failures**: A conversation with no id, an unusable shape or a
//!   ChatGPT tree whose active branch cannot be resolved is skipped. A [`ParseWarning`]
//!   carrying its best-effort identifier is recorded and parsing continues.
//!
//! - **Schema drift**: Unknown content types, block types and roles never fail. They
//!   become labeled fallback blocks (or the `system` role) and are recorded as warnings
//!   keyed by the unknown tag, so `inspect` can report an inventory.
//!
//! - **Bad timestamps**: A present but unparseable timestamp becomes epoch-zero with a
//!   warning; the conversation is still imported.
//!
//! - **Per-file failures**: An unreadable file, invalid JSON, a non-array root or a file in
//!   which no element matches either provider is an [`ExportError`]. Callers report it and
//!   continue with zero conversations for that provider.
//!
//! Warnings are collected in an explicit [`ParseWarnings`] value rather than only logged,
//! so tests and the CLI can assert on counts.
//!
//! [`ParseWarning`]: crate::models::ParseWarning
//! [`ParseWarnings`]: crate::models::ParseWarnings

pub mod chatgpt;
pub mod claude;
mod context;
pub mod detect;
pub mod error;
pub mod export;
pub mod text;
pub mod timestamps;

pub use detect::{DetectedFormat, ExportSummary, detect_format, inspect_export_file};
pub use error::{ConversationError, ExportError};
pub use export::{
    DEFAULT_MAX_FILE_BYTES, EmptyNameDedup, ParseOptions, ParsedExport, parse_export,
    parse_export_value,
};
