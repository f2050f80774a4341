//! Wire types for the ERP finished-goods endpoint.

use serde::Deserialize;

use gudang_core::{CategoryId, Product, ProductId};

/// One product line as the ERP serializes it.
///
/// Field names follow the upstream JSON keys verbatim (including the
/// capitalized `Weight`); unknown extra keys in the payload are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ErpRecord {
    pub id: i64,
    pub product_code: String,
    pub product_name: String,
    /// Category display name.
    pub catname: String,
    /// Numeric category id.
    pub catname_value: i64,
    #[serde(default)]
    pub parent1: String,
    #[serde(default)]
    pub parent2: String,
    #[serde(rename = "Weight", default)]
    pub weight: f64,
    #[serde(default)]
    pub smalluom: String,
    #[serde(default)]
    pub biguom: String,
}

impl ErpRecord {
    pub fn into_product(self) -> Product {
        Product {
            id: ProductId(self.id),
            code: self.product_code,
            name: self.product_name,
            category_id: CategoryId(self.catname_value),
            category_name: self.catname,
            parent1: self.parent1,
            parent2: self.parent2,
            weight: self.weight,
            small_uom: self.smalluom,
            big_uom: self.biguom,
        }
    }
}

/// Response envelope of the finished-goods endpoint.
#[derive(Debug, Deserialize)]
pub struct ErpBatch {
    pub records: Vec<ErpRecord>,
    #[serde(rename = "row-count", default)]
    pub row_count: Option<u64>,
}
