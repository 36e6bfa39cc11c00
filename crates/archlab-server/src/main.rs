use std::sync::Arc;

use archlab_core::{ai_configured, read_settings, ProjectStore};
use archlab_server::{create_app, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let settings = read_settings();
    if !ai_configured(&settings) {
        tracing::warn!(
            provider = %settings.provider,
            "no API key configured; generation requests will fail until ARCHLAB_API_KEY is set"
        );
    }
    let pipeline = archlab_design::pipeline_from_settings(&settings)?;
    let store = Arc::new(ProjectStore::open_default()?);

    if config.allowed_origins.is_empty() {
        tracing::warn!("CORS allows any origin; set ARCHLAB_ALLOWED_ORIGINS to restrict");
    }
    tracing::info!(
        addr = %config.addr,
        model = pipeline.model_name(),
        data = %store.dir().display(),
        "ArchLab API starting"
    );

    let app = create_app(&config, store, pipeline);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
