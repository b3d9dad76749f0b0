//! Service wiring shared by every handler.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use placement_infra::{ApplicationLifecycle, InMemoryPlacementStore, PlacementStore, PostgresPlacementStore, PostingService};

#[derive(Clone)]
pub struct AppServices {
    pub lifecycle: ApplicationLifecycle,
    pub postings: PostingService,
}

impl AppServices {
    pub fn new(store: Arc<dyn PlacementStore>) -> Self {
        Self {
            lifecycle: ApplicationLifecycle::new(store.clone()),
            postings: PostingService::new(store),
        }
    }
}

/// Postgres when a database URL is configured, otherwise in-memory.
pub async fn connect_store(database_url: Option<&str>) -> anyhow::Result<Arc<dyn PlacementStore>> {
    match database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to postgres")?;
            let store = PostgresPlacementStore::new(pool);
            store.migrate().await.context("failed to apply schema")?;
            tracing::info!("using postgres placement store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Ok(Arc::new(InMemoryPlacementStore::new()))
        }
    }
}
