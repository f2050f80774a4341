//! SQLite-backed structured store holding the finished-goods catalog.
//!
//! Three collections live here: products, derived categories, and the
//! singleton last-sync metadata row. The store is the only authoritative
//! copy; everything handed to the presentation layer is a transient,
//! read-only projection.

pub mod error;
pub mod query;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use query::CatalogQueries;
pub use store::ProductStore;
