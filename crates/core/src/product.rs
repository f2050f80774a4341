//! Finished-goods records as delivered by the ERP.

use serde::{Deserialize, Serialize};

/// Identifier of a finished-goods product (ERP-assigned, numeric).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of a product category (ERP-assigned, numeric).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl core::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One finished-goods line item.
///
/// Products are created in bulk when a sync completes, never individually
/// mutated, and destroyed in bulk on wipe. `id` is unique within one sync
/// generation; a full resync replaces the prior generation wholesale (no
/// partial merge, no diffing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub name: String,
    pub category_id: CategoryId,
    pub category_name: String,
    /// First parent-hierarchy label (e.g. division).
    pub parent1: String,
    /// Second parent-hierarchy label (e.g. group).
    pub parent2: String,
    pub weight: f64,
    pub small_uom: String,
    pub big_uom: String,
}
