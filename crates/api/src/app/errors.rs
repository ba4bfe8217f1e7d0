use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockcurve_catalog::Curve;
use stockcurve_core::DomainError;
use stockcurve_infra::StoreError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        other => {
            tracing::error!(error = %other, "catalog store failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "persistence_error",
                other.to_string(),
            )
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_curve(s: &str) -> Result<Curve, axum::response::Response> {
    s.parse::<Curve>().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "invalid_curve",
            "curve must be one of: A, B, C",
        )
    })
}
