//! Knowledge Base module - the curated vibe-to-attribute mapping store.
//!
//! The knowledge base consists of:
//! - **Tables**: named mapping files, one JSON object per file
//! - **Entries**: a vibe key (short phrase) mapped to an attribute dictionary
//!
//! Loaded once, immutable afterwards. A fresh load is required to pick up
//! data changes; there is no live reload.

mod entry;
mod store;

pub use entry::VibeEntry;
pub(crate) use entry::json_to_value;
pub use store::*;
