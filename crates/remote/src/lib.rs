//! Fetch client for the upstream ERP finished-goods endpoint.
//!
//! One authenticated GET per call, a 30-second timeout, and typed errors.
//! No retries and no caching live here: retries are the sync orchestrator's
//! call, and the local store is the cache.

pub mod client;
pub mod config;
pub mod error;
pub mod record;

pub use client::{FetchProducts, ProductBatch, RemoteClient};
pub use config::{ConfigError, RemoteConfig};
pub use error::RemoteFetchError;
pub use record::{ErpBatch, ErpRecord};
