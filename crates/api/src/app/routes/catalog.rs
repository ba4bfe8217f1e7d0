use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockcurve_analytics::find_duplicates;
use stockcurve_catalog::{NewProduct, RawProductRow};
use stockcurve_core::DomainError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/products", get(list_products).post(insert_products).delete(clear_products))
        .route("/duplicates", get(duplicates))
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store().snapshot().await {
        Ok(products) => Json(products.iter().map(dto::product_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Bulk insert. Numeric fields are sanitized, never rejected; a blank sku or
/// name rejects the whole batch.
pub async fn insert_products(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Vec<RawProductRow>>, JsonRejection>,
) -> axum::response::Response {
    let Json(rows) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text());
        }
    };

    let batch = match rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            NewProduct::from_raw(row).map_err(|e| match e {
                DomainError::Validation(msg) => DomainError::validation(format!("row {i}: {msg}")),
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(b) => b,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let inserted = match services.classification().insert_products(batch).await {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };

    tracing::info!(inserted = inserted.len(), "catalog rows inserted");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "inserted": inserted.len(),
            "ids": inserted.iter().map(|p| p.id.to_string()).collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

pub async fn clear_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.classification().clear().await {
        Ok(deleted) => {
            tracing::info!(deleted, "catalog cleared");
            Json(serde_json::json!({ "deleted": deleted })).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn duplicates(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let products = match services.store().snapshot().await {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };

    let report = find_duplicates(&products);
    tracing::info!(clean = report.is_clean(), "duplicate report served");

    Json(report).into_response()
}
