use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use stockcurve_analytics::{DEFAULT_TOP_N, DashboardFilter, dashboard_summary};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/summary", get(summary))
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::DashboardQuery>,
) -> axum::response::Response {
    let curve = match query.curve.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) if raw.eq_ignore_ascii_case("all") => None,
        Some(raw) => match errors::parse_curve(raw) {
            Ok(c) => Some(c),
            Err(resp) => return resp,
        },
    };
    let filter = DashboardFilter {
        curve,
        search: query.q,
    };

    let products = match services.store().snapshot().await {
        Ok(p) => p,
        Err(e) => return errors::store_error_to_response(e),
    };

    let summary = dashboard_summary(
        &products,
        &filter,
        query.top.unwrap_or(DEFAULT_TOP_N),
        Utc::now(),
    );
    tracing::info!(total_products = summary.total_products, "dashboard summary served");

    Json(dto::summary_to_json(&summary)).into_response()
}
