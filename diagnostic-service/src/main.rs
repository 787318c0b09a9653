use anyhow::{Context, Result};
use diagnostic_service::{
    api::{self, AppState},
    config::AppConfig,
    metrics_server, observability,
};
use motor_client::registry::MotorRegistry;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = AppConfig::load()?;
    observability::init_tracing(cfg.logging.format);

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let registry = MotorRegistry::load(&cfg.registry.path)?;

    let state = AppState {
        registry: Arc::new(registry),
        default_nominal_voltage: cfg.defaults.nominal_voltage,
        delimiter: cfg.ingest.delimiter_byte()?,
    };
    let app = api::router(state, cfg.http.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&cfg.http.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.http.bind_addr))?;
    tracing::info!(addr = %cfg.http.bind_addr, "diagnostic API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
