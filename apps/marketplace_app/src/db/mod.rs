// apps/marketplace_app/src/db/mod.rs

//! Storage backends and their bootstrap.

pub mod pg_storage;
pub mod seed;

use crate::config::AppConfig;
use anyhow::Context;
use commune_cart::{InMemoryStorage, StorageGateway};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};

pub use pg_storage::PgStorage;

/// Connects the configured backend: Postgres when `DATABASE_URL` is set, the
/// in-memory store (with demo data) otherwise.
pub async fn connect_storage(config: &AppConfig) -> anyhow::Result<Arc<dyn StorageGateway>> {
  let Some(database_url) = config.database_url.as_deref() else {
    warn!("DATABASE_URL not set; using the in-memory store. Data is lost on restart.");
    let storage = InMemoryStorage::new();
    seed::seed_in_memory(&storage);
    return Ok(Arc::new(storage));
  };

  let pool = PgPoolOptions::new()
    .max_connections(config.db_max_connections)
    .connect(database_url)
    .await
    .context("Failed to connect to the database")?;
  info!("Successfully connected to the database.");

  if config.run_migrations {
    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .context("Failed to run database migrations")?;
    info!("Database migrations applied.");
  }

  if config.seed_db {
    seed::seed_postgres(&pool).await.context("Failed to seed database")?;
  }

  Ok(Arc::new(PgStorage::new(pool)))
}
