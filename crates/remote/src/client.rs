//! HTTP client for the ERP finished-goods endpoint.

use async_trait::async_trait;
use serde_json::Value;

use gudang_core::Product;

use crate::config::RemoteConfig;
use crate::error::RemoteFetchError;
use crate::record::ErpBatch;

/// A fetched sync generation, ready for bulk replace.
#[derive(Debug, Clone)]
pub struct ProductBatch {
    pub products: Vec<Product>,
    /// Row count as reported by the ERP, when present.
    pub reported_count: Option<u64>,
}

/// Seam between the sync orchestrator and the network.
#[async_trait]
pub trait FetchProducts: Send + Sync {
    /// Perform one live fetch of the full finished-goods list.
    async fn fetch_batch(&self) -> Result<ProductBatch, RemoteFetchError>;
}

/// Live reqwest-backed client.
///
/// Every call is one authenticated round-trip against the configured
/// endpoint; the response shape is validated before anything is handed to
/// the store.
#[derive(Debug)]
pub struct RemoteClient {
    config: RemoteConfig,
}

impl RemoteClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FetchProducts for RemoteClient {
    async fn fetch_batch(&self) -> Result<ProductBatch, RemoteFetchError> {
        tracing::debug!(endpoint = %self.config.endpoint, "fetching finished-goods batch");

        let client = reqwest::Client::new();
        let resp = client
            .get(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RemoteFetchError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                RemoteFetchError::Timeout
            } else {
                RemoteFetchError::MalformedPayload(e.to_string())
            }
        })?;

        // `records` must be a list; anything else is a malformed payload,
        // not an empty batch.
        if !body.get("records").is_some_and(Value::is_array) {
            return Err(RemoteFetchError::MalformedPayload(
                "`records` is missing or not a list".to_string(),
            ));
        }

        let batch: ErpBatch = serde_json::from_value(body)
            .map_err(|e| RemoteFetchError::MalformedPayload(e.to_string()))?;

        let reported_count = batch.row_count;
        let products: Vec<Product> = batch
            .records
            .into_iter()
            .map(|record| record.into_product())
            .collect();

        tracing::debug!(received = products.len(), "fetched finished-goods batch");
        Ok(ProductBatch {
            products,
            reported_count,
        })
    }
}

fn classify_transport_error(err: reqwest::Error) -> RemoteFetchError {
    if err.is_timeout() {
        RemoteFetchError::Timeout
    } else {
        RemoteFetchError::NetworkUnreachable(err.to_string())
    }
}
