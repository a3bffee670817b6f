use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::info;

use crate::store::{MemoryStore, MySqlStore, Store};

pub const MEMORY_URL: &str = "memory://";

/// `memory://` selects the in-process store; anything else is a MySQL URL.
pub async fn init_store(database_url: &str) -> Result<Arc<dyn Store>> {
    if database_url.starts_with(MEMORY_URL) {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    info!("Connected to MySQL, migrations applied");
    Ok(Arc::new(MySqlStore::new(pool)))
}
