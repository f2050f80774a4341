//! Read-only query surface for the presentation layer.

use std::sync::Arc;

use gudang_core::{Category, CategoryId, Product, SyncMetadata};

use crate::error::StoreResult;
use crate::store::ProductStore;

/// Read-only view over the local store.
///
/// This is the only handle the presentation layer gets: reads, no lifecycle
/// or mutation access. Results are transient projections that must be
/// discarded and re-derived, never written back; consumers re-query after
/// every sync-complete notification instead of caching.
#[derive(Debug, Clone)]
pub struct CatalogQueries {
    store: Arc<ProductStore>,
}

impl CatalogQueries {
    pub fn new(store: Arc<ProductStore>) -> Self {
        Self { store }
    }

    /// Full product list.
    pub async fn all(&self) -> StoreResult<Vec<Product>> {
        self.store.get_all().await
    }

    /// Products in one category.
    pub async fn by_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>> {
        self.store.get_by_category(category_id).await
    }

    /// Case-insensitive substring search over name or code.
    pub async fn search(&self, term: &str) -> StoreResult<Vec<Product>> {
        self.store.search(term).await
    }

    /// Derived category summaries.
    pub async fn categories(&self) -> StoreResult<Vec<Category>> {
        self.store.get_categories().await
    }

    /// Last successful sync, if any.
    pub async fn last_sync(&self) -> StoreResult<Option<SyncMetadata>> {
        self.store.get_metadata().await
    }
}

#[cfg(test)]
mod tests {
    use gudang_core::ProductId;

    use super::*;

    #[tokio::test]
    async fn queries_delegate_to_the_store() {
        let store = Arc::new(ProductStore::in_memory());
        store
            .replace_all(&[Product {
                id: ProductId(1),
                code: "FG-0001".to_string(),
                name: "BERAS MENIR 5KG".to_string(),
                category_id: CategoryId(10),
                category_name: "BERAS".to_string(),
                parent1: "FINISHED GOODS".to_string(),
                parent2: "FOOD".to_string(),
                weight: 5.0,
                small_uom: "KG".to_string(),
                big_uom: "SAK".to_string(),
            }])
            .await
            .unwrap();

        let queries = CatalogQueries::new(store);

        assert_eq!(queries.all().await.unwrap().len(), 1);
        assert_eq!(queries.search("menir").await.unwrap().len(), 1);
        assert_eq!(queries.by_category(CategoryId(10)).await.unwrap().len(), 1);
        assert_eq!(queries.categories().await.unwrap().len(), 1);
        assert_eq!(queries.last_sync().await.unwrap().unwrap().record_count, 1);
    }
}
