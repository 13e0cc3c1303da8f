pub mod catalog;
pub mod engagement;
pub mod routines;

use crate::db::AppState;
use crate::models::Exercise;
use crate::store;
use tracing::info;

/// Exercise pool for generation and lookups.
///
/// The local snapshot wins; an empty store falls back to the backend catalog
/// (through the TTL cache) when one is configured.
pub async fn get_exercise_pool(state: &AppState) -> Result<Vec<Exercise>, String> {
  let local = store::load_exercises(&state.db).await?;
  if !local.is_empty() {
    return Ok(local);
  }

  if state.config.backend_url.is_none() {
    return Err(
      "No exercises available: run sync-catalog or import-csv first".to_string(),
    );
  }

  info!("Local catalog empty, fetching from backend");
  let client = state.catalog_client()?;
  state
    .exercise_cache
    .get_or_fetch(&client)
    .await
    .map_err(|e| format!("Failed to fetch exercise catalog: {}", e))
}

#[cfg(test)]
pub(crate) mod test_state {
  use crate::config::AppConfig;
  use crate::db::AppState;
  use sqlx::SqlitePool;
  use std::time::Duration;

  /// AppState over a test pool, optionally pointed at a mock backend
  pub fn app_state(pool: SqlitePool, backend_url: Option<String>) -> AppState {
    let config = AppConfig {
      database_url: "sqlite::memory:".to_string(),
      backend_anon_key: backend_url.as_ref().map(|_| "anon-key".to_string()),
      backend_url,
      cache_ttl: Duration::from_secs(300),
      log_level: "info".to_string(),
    };
    AppState::new(pool, config)
  }
}
