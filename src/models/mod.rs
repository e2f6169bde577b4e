//! Normalized conversation model shared by every provider parser.
//!
//! - [`ContentBlock`] - atomic unit of message content (type tag, text, open metadata)
//! - [`MessageRecord`] - one message with its ordered blocks
//! - [`ConversationRecord`] - one conversation in canonical message order
//! - [`AssetInfo`] - typed view over the `asset` entry of a block's metadata
//! - [`ParseWarnings`] - non-fatal diagnostics collected during a parse
//!
//! Records are built once per parse and never mutated afterwards, apart from
//! the favorite flag joined in by the library loader.

pub mod asset;
pub mod block;
pub mod conversation;
pub mod warning;

pub use asset::{AssetInfo, AssetKind};
pub use block::{BlockCategory, BlockData, BlockType, ContentBlock, humanize_tag};
pub use conversation::{BlockFilter, ConversationRecord, MessageRecord, Provider, Role};
pub use warning::{ParseWarning, ParseWarnings, WarningKind};
