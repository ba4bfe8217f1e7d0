use axum::Router;

pub mod abc_curve;
pub mod catalog;
pub mod dashboard;
pub mod profit;
pub mod system;

/// Router for every report and catalog endpoint.
pub fn router() -> Router {
    Router::new()
        .nest("/abc-curve", abc_curve::router())
        .nest("/profit", profit::router())
        .nest("/catalog", catalog::router())
        .nest("/dashboard", dashboard::router())
}
