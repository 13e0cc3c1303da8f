use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::catalog::{CatalogClient, ExerciseCache};
use crate::config::AppConfig;

pub type DbPool = SqlitePool;

/// Application state shared by every command
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
  pub exercise_cache: ExerciseCache,
}

impl AppState {
  pub fn new(db: DbPool, config: AppConfig) -> Self {
    let exercise_cache = ExerciseCache::new(config.cache_ttl);
    Self {
      db,
      config,
      exercise_cache,
    }
  }

  /// Catalog client for the configured backend
  pub fn catalog_client(&self) -> Result<CatalogClient, String> {
    CatalogClient::from_app_config(&self.config)
      .map_err(|e| format!("Failed to configure catalog client: {}", e))
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(database_url: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
  info!(database_url, "Initializing database");

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}
