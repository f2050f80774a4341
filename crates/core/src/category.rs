//! Category summaries derived from the product list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::product::{CategoryId, Product};

/// A product category, derived by grouping products by category id.
///
/// Categories have no existence independent of products: they are fully
/// recomputed on every sync and destroyed together with the products on wipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent1: String,
    pub parent2: String,
    /// Number of products carrying this category id.
    pub product_count: u64,
}

/// Group products by category id into category summaries, ordered by id.
///
/// The display name and parent labels are taken from the first member seen;
/// member counts are exact.
pub fn derive_categories(products: &[Product]) -> Vec<Category> {
    let mut by_id: BTreeMap<i64, Category> = BTreeMap::new();

    for product in products {
        by_id
            .entry(product.category_id.0)
            .and_modify(|category| category.product_count += 1)
            .or_insert_with(|| Category {
                id: product.category_id,
                name: product.category_name.clone(),
                parent1: product.parent1.clone(),
                parent2: product.parent2.clone(),
                product_count: 1,
            });
    }

    by_id.into_values().collect()
}
