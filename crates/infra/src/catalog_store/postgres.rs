//! Postgres-backed catalog store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | sku inserted concurrently |
//! | Database (other) | Any other | `Backend` | constraint/type failures |
//! | PoolClosed / Io / other | N/A | `Backend` | connection failures |
//!
//! ## Numeric range
//!
//! Prices are `NUMERIC(12, 2)` and stock is `BIGINT`. Sanitized values always
//! fit: amounts are capped at `stockcurve_core::MAX_AMOUNT` and stock is an
//! `i64`, so an ingested row is never rejected for its magnitude.
//!
//! ## Transactions
//!
//! Curve commits and bulk inserts run inside one transaction each. An early
//! return drops the transaction, which rolls it back, so a failure midway
//! leaves no partial relabeling or partial batch behind.

use std::sync::Arc;

use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use tracing::{Span, instrument};

use stockcurve_catalog::{Curve, CurveUpdate, NewProduct, Product};
use stockcurve_core::{ProductId, sanitize_amount, sanitize_quantity};

use super::{CatalogStore, StoreError, first_conflicting_sku};

const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id          UUID PRIMARY KEY,
    sku         TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    cost_price  NUMERIC(12, 2),
    sale_price  NUMERIC(12, 2),
    stock       BIGINT NOT NULL DEFAULT 0,
    curve       CHAR(1) CHECK (curve IN ('A', 'B', 'C')),
    last_sync   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_NAME_INDEX: &str = "CREATE INDEX IF NOT EXISTS products_name_idx ON products (name)";

/// Postgres catalog store over the `products` table.
///
/// `PgPool` is `Send + Sync`; the store can be shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` with a small pool.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table and its indexes if missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for ddl in [CREATE_PRODUCTS_TABLE, CREATE_NAME_INDEX] {
            sqlx::query(ddl)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(product_count = tracing::field::Empty), err)]
    pub async fn load_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                sku,
                name,
                cost_price::float8 AS cost_price,
                sale_price::float8 AS sale_price,
                stock::int8 AS stock,
                curve
            FROM products
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_products", e))?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            let row = <ProductRow as sqlx::FromRow<'_, PgRow>>::from_row(&row)
                .map_err(|e| StoreError::Backend(format!("failed to decode product row: {e}")))?;
            products.push(row.into());
        }

        Span::current().record("product_count", products.len());
        Ok(products)
    }

    /// Commit a batch of curve labels in one transaction.
    #[instrument(skip(self, updates), fields(update_count = updates.len()), err)]
    pub async fn commit_curves(&self, updates: &[CurveUpdate]) -> Result<u64, StoreError> {
        if updates.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut written = 0u64;
        for update in updates {
            let result = sqlx::query(
                "UPDATE products SET curve = $1, last_sync = NOW() WHERE id = $2",
            )
            .bind(update.curve.as_str())
            .bind(update.product_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_curve", e))?;
            written += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(written)
    }

    #[instrument(skip(self, batch), fields(batch_size = batch.len()), err)]
    pub async fn insert_batch(&self, batch: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        if batch.is_empty() {
            return Ok(vec![]);
        }

        let skus: Vec<String> = batch.iter().map(|p| p.sku.clone()).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let existing: Vec<String> = sqlx::query("SELECT sku FROM products WHERE sku = ANY($1)")
            .bind(&skus)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("check_skus", e))?
            .into_iter()
            .map(|row| row.try_get::<String, _>("sku"))
            .collect::<Result<_, _>>()
            .map_err(|e| StoreError::Backend(format!("failed to decode sku: {e}")))?;

        if let Some(sku) = first_conflicting_sku(&batch, existing.iter().map(String::as_str)) {
            return Err(StoreError::Conflict(format!("sku '{sku}' already exists")));
        }

        let mut inserted = Vec::with_capacity(batch.len());
        for new in batch {
            let product = Product::from_new(ProductId::new(), new);
            sqlx::query(
                r#"
                INSERT INTO products (id, sku, name, cost_price, sale_price, stock)
                VALUES ($1, $2, $3, $4::float8, $5::float8, $6::int8)
                "#,
            )
            .bind(product.id.as_uuid())
            .bind(&product.sku)
            .bind(&product.name)
            .bind(product.cost_price)
            .bind(product.sale_price)
            .bind(product.stock)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_product", e))?;
            inserted.push(product);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(inserted)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_all", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn snapshot(&self) -> Result<Vec<Product>, StoreError> {
        self.load_products().await
    }

    async fn apply_curve_updates(&self, updates: &[CurveUpdate]) -> Result<u64, StoreError> {
        self.commit_curves(updates).await
    }

    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, StoreError> {
        self.insert_batch(products).await
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        self.delete_all().await
    }
}

/// Map SQLx errors to store errors.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed during {operation}"))
        }
        other => StoreError::Backend(format!("{operation} failed: {other}")),
    }
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: uuid::Uuid,
    sku: String,
    name: String,
    cost_price: Option<f64>,
    sale_price: Option<f64>,
    stock: Option<i64>,
    curve: Option<String>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            cost_price: row.try_get("cost_price")?,
            sale_price: row.try_get("sale_price")?,
            stock: row.try_get("stock")?,
            curve: row.try_get("curve")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let curve = row.curve.as_deref().and_then(|raw| match raw.parse::<Curve>() {
            Ok(curve) => Some(curve),
            Err(e) => {
                tracing::warn!(sku = %row.sku, "ignoring stored curve: {e}");
                None
            }
        });

        Product {
            id: ProductId::from_uuid(row.id),
            sku: row.sku,
            name: row.name,
            cost_price: sanitize_amount(row.cost_price),
            sale_price: sanitize_amount(row.sale_price),
            stock: sanitize_quantity(row.stock),
            curve,
        }
    }
}
