//! Store selection and service wiring.

use std::sync::Arc;

use tracing::info;

use homies_infra::{
    DatabaseConfig, EventService, InMemoryStore, PostgresStore, Store, StoreError,
};

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub events: EventService,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            events: EventService::new(store),
        }
    }

    /// Process-local store seeded with the type catalog.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}

/// Postgres when a database is configured (migrations applied on start),
/// in-memory otherwise.
pub async fn build_services(database: Option<&DatabaseConfig>) -> Result<AppServices, StoreError> {
    let Some(db) = database else {
        info!("DATABASE_URL not set; using in-memory store");
        return Ok(AppServices::in_memory());
    };

    let store = PostgresStore::connect(&db.url, db.max_connections).await?;
    store.migrate().await?;
    info!(max_connections = db.max_connections, "connected to postgres");

    Ok(AppServices::new(Arc::new(store)))
}
