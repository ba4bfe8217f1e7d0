//! Catalog storage abstraction.
//!
//! The analytics work on a full in-memory snapshot; a store only has to hand
//! out that snapshot, commit a batch of curve labels atomically, and support
//! the ingestion seam (bulk insert, clear).

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use thiserror::Error;

use stockcurve_catalog::{CurveUpdate, NewProduct, Product};

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint (sku) would be violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store failed; nothing from the operation was kept.
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Catalog store.
///
/// ## Contract
///
/// - `snapshot` returns every product ordered by creation, so ties in the
///   classifier's stable sort resolve the same way on every pass.
/// - `apply_curve_updates` is all-or-nothing. Updates naming a product that no
///   longer exists are skipped; the return value counts the rows written.
/// - `insert_products` is all-or-nothing; a sku already in the store (or twice
///   in the batch) is a `StoreError::Conflict`. Identifiers are assigned here.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn snapshot(&self) -> Result<Vec<Product>, StoreError>;

    async fn apply_curve_updates(&self, updates: &[CurveUpdate]) -> Result<u64, StoreError>;

    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError>;

    /// Delete every product. Returns the number deleted.
    async fn clear(&self) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn snapshot(&self) -> Result<Vec<Product>, StoreError> {
        (**self).snapshot().await
    }

    async fn apply_curve_updates(&self, updates: &[CurveUpdate]) -> Result<u64, StoreError> {
        (**self).apply_curve_updates(updates).await
    }

    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        (**self).insert_products(products).await
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        (**self).clear().await
    }
}

/// First sku that appears twice in `batch` or already exists in `existing`.
pub(crate) fn first_conflicting_sku<'a>(
    batch: &'a [NewProduct],
    existing: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let mut seen: std::collections::HashSet<&str> = existing.into_iter().collect();
    batch
        .iter()
        .map(|p| p.sku.as_str())
        .find(|sku| !seen.insert(sku))
}
