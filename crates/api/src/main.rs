use std::sync::Arc;

use anyhow::Context;

use stockcurve_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    stockcurve_observability::init_with(config.log_format);

    let services = stockcurve_api::app::services::build_services(&config)
        .await
        .context("failed to initialize catalog store")?;

    let app = stockcurve_api::app::build_app(Arc::new(services), &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
