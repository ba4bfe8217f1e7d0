use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, post},
};

use stockcurve_analytics::products_in_curve;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/classify", post(classify))
        .route("/:curve", get(curve_products))
}

/// Run one classification pass over the whole catalog and commit it.
pub async fn classify(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let report = match services.classification().run().await {
        Ok(r) => r,
        Err(e) => return errors::store_error_to_response(e),
    };

    Json(serde_json::json!({
        "classified": report.classified,
        "relabeled": report.relabeled,
        "items": report.ranked.iter().map(dto::ranked_to_json).collect::<Vec<_>>(),
    }))
    .into_response()
}

pub async fn curve_products(
    Extension(services): Extension<Arc<AppServices>>,
    Path(curve): Path<String>,
) -> axum::response::Response {
    let curve = match errors::parse_curve(&curve) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let products = match services.store().snapshot().await {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };

    let members = products_in_curve(&products, curve);
    tracing::info!(curve = %curve, count = members.len(), "curve listing served");

    Json(serde_json::json!({
        "curve": curve.as_str(),
        "count": members.len(),
        "items": members.iter().map(dto::curve_member_to_json).collect::<Vec<_>>(),
    }))
    .into_response()
}
