//! # Apparel Catalog
//!
//! The "Catalog Bible" crate - contains the attribute domain, valid-value tables,
//! and the product catalog for the vibe resolver. This crate is the single source
//! of truth for which attributes exist and which values they may take; it contains
//! no resolution logic.

pub mod attributes;
pub mod catalog;
pub mod config;

pub use attributes::*;
pub use catalog::*;
pub use config::*;
