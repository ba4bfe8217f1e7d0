use std::sync::Arc;

use stockcurve_analytics::ClassifierConfig;
use stockcurve_infra::{
    AppConfig, CatalogStore, ClassificationService, InMemoryCatalogStore, PostgresCatalogStore,
    StoreError,
};

/// Shared handler state: the catalog store and the single classification runner.
pub struct AppServices {
    store: Arc<dyn CatalogStore>,
    classification: ClassificationService<Arc<dyn CatalogStore>>,
}

impl AppServices {
    pub fn new(store: Arc<dyn CatalogStore>, classifier: ClassifierConfig) -> Self {
        Self {
            classification: ClassificationService::new(store.clone(), classifier),
            store,
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory(classifier: ClassifierConfig) -> Self {
        Self::new(Arc::new(InMemoryCatalogStore::new()), classifier)
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    pub fn classification(&self) -> &ClassificationService<Arc<dyn CatalogStore>> {
        &self.classification
    }
}

/// Pick the catalog backend from config: Postgres when `DATABASE_URL` is set,
/// in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresCatalogStore::connect(url).await?;
            store.ensure_schema().await?;
            tracing::info!("using postgres catalog store");
            Ok(AppServices::new(Arc::new(store), config.classifier))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory catalog store");
            Ok(AppServices::in_memory(config.classifier))
        }
    }
}
