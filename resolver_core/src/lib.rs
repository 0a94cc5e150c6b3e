//! # Resolver Core
//!
//! The "brain" of the vibe-to-attribute system. This crate interfaces with
//! `apparel_catalog`, maps free-text phrases onto a curated knowledge base,
//! and resolves noisy multi-source attribute candidates into one
//! authoritative attribute set, asking follow-up questions when information
//! is missing.
//!
//! ## Core Components
//!
//! - **knowledge_base**: immutable store of vibe-to-attribute mapping tables
//! - **matcher**: tiered similarity matching (exact, dense semantic, sparse lexical)
//! - **fusion**: priority- and confidence-driven candidate merging
//! - **clarification**: completeness checking and follow-up question generation
//! - **session**: per-conversation attribute accumulation across turns
//! - **pipeline**: the sequential resolution call chain and external collaborator traits
//!
//! ## Design Philosophy
//!
//! - **Init-once, read-many**: the knowledge base and matcher are built once
//!   and shared read-only across resolution requests
//! - **Degrade, never abort**: a missing data directory, an unavailable
//!   embedding backend, or a failed oracle call narrows the result instead of
//!   surfacing an error to the user
//! - **Closed domain**: attribute keys, categories, and bounded value tables
//!   come from `apparel_catalog`; nothing here invents attribute names

pub mod clarification;
pub mod extraction;
pub mod fusion;
pub mod knowledge_base;
pub mod matcher;
pub mod oracle;
pub mod pipeline;
pub mod render;
pub mod session;

pub use clarification::*;
pub use extraction::*;
pub use fusion::*;
pub use knowledge_base::*;
pub use matcher::*;
pub use oracle::*;
pub use pipeline::*;
pub use render::*;
pub use session::*;
