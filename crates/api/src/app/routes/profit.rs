use std::sync::Arc;

use axum::{Json, Router, extract::Extension, response::IntoResponse, routing::get};

use stockcurve_analytics::{aggregate_by_curve, profit_share};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/curves", get(curve_profitability))
        .route("/share", get(curve_profit_share))
}

pub async fn curve_profitability(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let products = match services.store().snapshot().await {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };

    let stats = aggregate_by_curve(&products);
    tracing::info!(curves = stats.len(), "curve profitability served");

    Json(stats.iter().map(dto::curve_stats_to_json).collect::<Vec<_>>()).into_response()
}

pub async fn curve_profit_share(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let products = match services.store().snapshot().await {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };

    let shares = profit_share(&aggregate_by_curve(&products));
    tracing::info!(curves = shares.len(), "profit share served");

    Json(shares.iter().map(dto::profit_share_to_json).collect::<Vec<_>>()).into_response()
}
