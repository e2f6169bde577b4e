//! Library loading for configured provider exports
//!
//! # Error Handling Strategy
//!
//! The indexer isolates failures per provider export:
//!
//! - **Provider-level failures**: A missing, unreadable or unrecognized export is logged and
//!   recorded in the provider's [`ProviderStatus`]; the other provider still loads.
//!
//! - **Favorites**: The favorites file is read-only input. A missing file means no favorites;
//!   a malformed one is an error for the caller to report (the CLI logs it and continues).
//!
//! - **Summary reporting**: Per-export counts of parsed and skipped conversations and
//!   warnings are printed to stderr, giving users visibility into load completeness.

pub mod builder;
pub mod favorites;
pub mod library;

pub use builder::load_library;
pub use favorites::{FavoriteLookup, FavoriteSet};
pub use library::{Library, ProviderStatus};
