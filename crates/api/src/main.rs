use std::sync::Arc;

use anyhow::Context;

use placement_api::app::{self, AppServices};
use placement_api::config::AppConfig;
use placement_auth::Hs256CredentialStore;
use placement_infra::CounterReconciler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    placement_observability::init_with(config.log_format);

    if config.using_dev_secret {
        tracing::warn!("JWT_SECRET not set; using insecure dev secret");
    }
    tracing::debug!(config = ?config, "configuration loaded");

    let store = app::services::connect_store(config.database_url.as_deref()).await?;
    let services = AppServices::new(store);

    let reconciler = config
        .reconcile_interval
        .map(|every| CounterReconciler::spawn(services.lifecycle.clone(), every));

    let credentials = Arc::new(Hs256CredentialStore::new(config.jwt_secret.as_bytes(), config.token_ttl));
    let router = app::build_app(credentials, services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
        .context("server error")?;

    if let Some(handle) = reconciler {
        handle.shutdown().await;
    }
    Ok(())
}
