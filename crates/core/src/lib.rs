//! Finished-goods catalog domain types.
//!
//! This crate contains the **pure data model** (no IO): products as fetched
//! from the ERP, category summaries derived from them, and the last-sync
//! metadata that drives the freshness policy.

pub mod category;
pub mod metadata;
pub mod product;

pub use category::{Category, derive_categories};
pub use metadata::{SyncMetadata, freshness_threshold, needs_sync};
pub use product::{CategoryId, Product, ProductId};
