use anyhow::Context;

use stockcast_infra::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockcast_observability::init();

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    let app = stockcast_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        model = %config.model_name,
        lookback_days = config.lookback_days,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
