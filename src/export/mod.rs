//! Conversation export to Markdown or plain text files.
//!
//! Exports are read-only views over parsed records: block visibility is
//! decided by a [`BlockFilter`](crate::models::BlockFilter) and the parser
//! output is never altered.

pub mod markdown;

pub use markdown::{
    ExportFormat, export_conversation, export_file_name, render, render_conversation,
};
