//! Infrastructure layer: catalog storage, the classification pass runner,
//! and configuration.

pub mod catalog_store;
pub mod classification;
pub mod config;

pub use catalog_store::{CatalogStore, InMemoryCatalogStore, PostgresCatalogStore, StoreError};
pub use classification::{ClassificationReport, ClassificationService};
pub use config::{AppConfig, ConfigError, CorsOrigins};
