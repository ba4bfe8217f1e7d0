//! Classification pass runner.
//!
//! A pass is: snapshot the catalog, classify it in memory (pure), then commit
//! only the labels that changed in one store transaction.
//!
//! `pass_lock` is held from snapshot to commit. Passes are serialized by it,
//! and so are the catalog writes routed through [`ClassificationService::insert_products`]
//! and [`ClassificationService::clear`]: a row lands either before a pass
//! (and gets labeled) or after its commit, never in between. Writes made on
//! the store directly bypass the lock.

use tokio::sync::Mutex;
use tracing::instrument;

use stockcurve_analytics::{ClassifierConfig, RankedProduct, classify};
use stockcurve_catalog::{NewProduct, Product};

use crate::catalog_store::{CatalogStore, StoreError};

/// Outcome of one committed pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Every product in importance order with its new label.
    pub ranked: Vec<RankedProduct>,
    /// Number of products classified.
    pub classified: usize,
    /// Number of stored labels that actually changed.
    pub relabeled: u64,
}

pub struct ClassificationService<S: CatalogStore> {
    store: S,
    config: ClassifierConfig,
    pass_lock: Mutex<()>,
}

impl<S: CatalogStore> ClassificationService<S> {
    pub fn new(store: S, config: ClassifierConfig) -> Self {
        Self {
            store,
            config,
            pass_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Run one classification pass and commit it.
    ///
    /// On error nothing is committed and stored labels are unchanged.
    #[instrument(skip(self), err)]
    pub async fn run(&self) -> Result<ClassificationReport, StoreError> {
        let _guard = self.pass_lock.lock().await;

        let products = self.store.snapshot().await?;
        let classification = classify(&products, &self.config);
        let relabeled = self.store.apply_curve_updates(&classification.updates).await?;

        tracing::info!(
            classified = classification.len(),
            relabeled,
            "classification pass committed"
        );

        Ok(ClassificationReport {
            classified: classification.len(),
            relabeled,
            ranked: classification.ranked,
        })
    }

    /// Insert a batch once no pass is in flight.
    pub async fn insert_products(&self, batch: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        let _guard = self.pass_lock.lock().await;
        self.store.insert_products(batch).await
    }

    /// Delete the catalog once no pass is in flight.
    pub async fn clear(&self) -> Result<u64, StoreError> {
        let _guard = self.pass_lock.lock().await;
        self.store.clear().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::catalog_store::InMemoryCatalogStore;
    use stockcurve_catalog::{Curve, CurveUpdate};
    use stockcurve_core::ProductId;

    fn new_product(sku: &str, sale_price: f64, stock: i64) -> NewProduct {
        NewProduct {
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            cost_price: sale_price / 2.0,
            sale_price,
            stock,
        }
    }

    async fn seeded_store() -> Arc<InMemoryCatalogStore> {
        let store = Arc::new(InMemoryCatalogStore::new());
        store
            .insert_products(vec![
                // importance 100 / 1000 / 150 → shares 80, 92, 100 after ranking
                new_product("LOW", 1.0, 100),
                new_product("TOP", 10.0, 100),
                new_product("MID", 5.0, 30),
            ])
            .await
            .unwrap();
        store
    }

    fn curve_by_sku(products: &[Product], sku: &str) -> Option<Curve> {
        products.iter().find(|p| p.sku == sku).and_then(|p| p.curve)
    }

    /// Store whose commit always fails; everything else delegates.
    struct FailingCommit(Arc<InMemoryCatalogStore>);

    #[async_trait::async_trait]
    impl CatalogStore for FailingCommit {
        async fn snapshot(&self) -> Result<Vec<Product>, StoreError> {
            self.0.snapshot().await
        }

        async fn apply_curve_updates(&self, _updates: &[CurveUpdate]) -> Result<u64, StoreError> {
            Err(StoreError::Backend("commit refused".to_string()))
        }

        async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
            self.0.insert_products(products).await
        }

        async fn clear(&self) -> Result<u64, StoreError> {
            self.0.clear().await
        }
    }

    #[tokio::test]
    async fn pass_labels_and_persists_every_product() {
        let store = seeded_store().await;
        let service = ClassificationService::new(store.clone(), ClassifierConfig::default());

        let report = service.run().await.unwrap();
        assert_eq!(report.classified, 3);
        assert_eq!(report.relabeled, 3);

        let ranked: Vec<(&str, Curve)> = report.ranked.iter().map(|r| (r.sku.as_str(), r.curve)).collect();
        assert_eq!(ranked, vec![("TOP", Curve::A), ("MID", Curve::B), ("LOW", Curve::C)]);

        let stored = store.snapshot().await.unwrap();
        assert_eq!(curve_by_sku(&stored, "TOP"), Some(Curve::A));
        assert_eq!(curve_by_sku(&stored, "MID"), Some(Curve::B));
        assert_eq!(curve_by_sku(&stored, "LOW"), Some(Curve::C));
    }

    #[tokio::test]
    async fn second_pass_relabels_nothing() {
        let service = ClassificationService::new(seeded_store().await, ClassifierConfig::default());
        service.run().await.unwrap();

        let again = service.run().await.unwrap();
        assert_eq!(again.classified, 3);
        assert_eq!(again.relabeled, 0);
    }

    #[tokio::test]
    async fn empty_catalog_is_a_no_op() {
        let service = ClassificationService::new(InMemoryCatalogStore::new(), ClassifierConfig::default());
        let report = service.run().await.unwrap();
        assert_eq!(report.classified, 0);
        assert_eq!(report.relabeled, 0);
        assert!(report.ranked.is_empty());
    }

    #[tokio::test]
    async fn failed_commit_propagates_and_keeps_old_labels() {
        let inner = seeded_store().await;
        let service = ClassificationService::new(FailingCommit(inner.clone()), ClassifierConfig::default());

        let err = service.run().await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(inner.snapshot().await.unwrap().iter().all(|p| p.curve.is_none()));
    }

    #[tokio::test]
    async fn overlapping_passes_do_not_double_count() {
        let service = ClassificationService::new(seeded_store().await, ClassifierConfig::default());

        let (first, second) = tokio::join!(service.run(), service.run());
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(first.relabeled + second.relabeled, 3);
        assert_eq!(first.ranked, second.ranked);
    }

    #[tokio::test]
    async fn custom_thresholds_are_honored() {
        let config = ClassifierConfig::new(50.0, 90.0).unwrap();
        let service = ClassificationService::new(seeded_store().await, config);

        let report = service.run().await.unwrap();
        let curves: Vec<Curve> = report.ranked.iter().map(|r| r.curve).collect();
        // shares 80 / 92 / 100 against 50 / 90
        assert_eq!(curves, vec![Curve::B, Curve::C, Curve::C]);
    }

    /// Store that records call order and yields inside `snapshot`, so a
    /// concurrent caller gets a chance to run mid-pass.
    struct RecordingStore {
        inner: InMemoryCatalogStore,
        calls: StdMutex<Vec<&'static str>>,
    }

    impl RecordingStore {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait::async_trait]
    impl CatalogStore for RecordingStore {
        async fn snapshot(&self) -> Result<Vec<Product>, StoreError> {
            self.record("snapshot");
            let products = self.inner.snapshot().await;
            tokio::task::yield_now().await;
            products
        }

        async fn apply_curve_updates(&self, updates: &[CurveUpdate]) -> Result<u64, StoreError> {
            self.record("commit");
            self.inner.apply_curve_updates(updates).await
        }

        async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
            self.record("insert");
            self.inner.insert_products(products).await
        }

        async fn clear(&self) -> Result<u64, StoreError> {
            self.record("clear");
            self.inner.clear().await
        }
    }

    #[tokio::test]
    async fn ingestion_waits_for_the_pass_in_flight() {
        let store = Arc::new(RecordingStore {
            inner: InMemoryCatalogStore::new(),
            calls: StdMutex::new(Vec::new()),
        });
        store.inner.insert_products(vec![new_product("OLD", 2.0, 5)]).await.unwrap();
        let service = ClassificationService::new(store.clone(), ClassifierConfig::default());

        let (report, inserted) = tokio::join!(
            service.run(),
            service.insert_products(vec![new_product("NEW", 1.0, 1)])
        );
        assert_eq!(report.unwrap().classified, 1);
        assert_eq!(inserted.unwrap().len(), 1);

        assert_eq!(*store.calls.lock().unwrap(), vec!["snapshot", "commit", "insert"]);

        service.clear().await.unwrap();
        assert!(store.inner.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_labels_are_corrected() {
        let labeled = |sku: &str, sale_price: f64, stock: i64, curve: Curve| Product {
            id: ProductId::new(),
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            cost_price: sale_price / 2.0,
            sale_price,
            stock,
            curve: Some(curve),
        };
        // Labels left over from an older catalog: TOP and LOW swapped, MID right.
        let store = Arc::new(InMemoryCatalogStore::with_products(vec![
            labeled("LOW", 1.0, 100, Curve::A),
            labeled("TOP", 10.0, 100, Curve::C),
            labeled("MID", 5.0, 30, Curve::B),
        ]));
        let service = ClassificationService::new(store.clone(), ClassifierConfig::default());

        let report = service.run().await.unwrap();
        assert_eq!(report.classified, 3);
        assert_eq!(report.relabeled, 2);

        let stored = store.snapshot().await.unwrap();
        assert_eq!(curve_by_sku(&stored, "TOP"), Some(Curve::A));
        assert_eq!(curve_by_sku(&stored, "MID"), Some(Curve::B));
        assert_eq!(curve_by_sku(&stored, "LOW"), Some(Curve::C));
    }
}
