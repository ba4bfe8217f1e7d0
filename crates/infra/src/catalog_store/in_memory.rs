use std::collections::HashMap;
use std::sync::RwLock;

use stockcurve_catalog::{CurveUpdate, NewProduct, Product};
use stockcurve_core::ProductId;

use super::{CatalogStore, StoreError, first_conflicting_sku};

/// In-memory catalog store.
///
/// Intended for tests/dev. Insertion order is creation order. Every write
/// happens under one write lock after validation, so a failed call leaves the
/// catalog untouched.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: RwLock<Vec<Product>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with already-identified products (curves included).
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn snapshot(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(products.clone())
    }

    async fn apply_curve_updates(&self, updates: &[CurveUpdate]) -> Result<u64, StoreError> {
        if updates.is_empty() {
            return Ok(0);
        }

        let mut products = self.products.write().map_err(|_| StoreError::LockPoisoned)?;
        let index: HashMap<ProductId, usize> =
            products.iter().enumerate().map(|(i, p)| (p.id, i)).collect();

        let mut written = 0u64;
        for update in updates {
            if let Some(&i) = index.get(&update.product_id) {
                products[i].curve = Some(update.curve);
                written += 1;
            }
        }
        Ok(written)
    }

    async fn insert_products(&self, batch: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        let mut products = self.products.write().map_err(|_| StoreError::LockPoisoned)?;

        if let Some(sku) = first_conflicting_sku(&batch, products.iter().map(|p| p.sku.as_str())) {
            return Err(StoreError::Conflict(format!("sku '{sku}' already exists")));
        }

        let inserted: Vec<Product> = batch
            .into_iter()
            .map(|new| Product::from_new(ProductId::new(), new))
            .collect();
        products.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let mut products = self.products.write().map_err(|_| StoreError::LockPoisoned)?;
        let deleted = products.len() as u64;
        products.clear();
        Ok(deleted)
    }
}
