use crate::db::AppState;
use crate::import::import_exercises_from_path;
use crate::store;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// ---------------------------------------------------------------------------
/// Sync From Backend
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SyncSummary {
  pub fetched: usize,
  pub saved: usize,
  pub warnings: Vec<String>,
}

/// Pull the full exercise catalog from the backend into the local store.
/// Always bypasses the cache, then refreshes it.
pub async fn sync_catalog(state: &AppState) -> Result<SyncSummary, String> {
  let client = state.catalog_client()?;

  let (exercises, warnings) = client
    .fetch_exercises()
    .await
    .map_err(|e| format!("Failed to fetch exercise catalog: {}", e))?;

  for warning in &warnings {
    warn!(warning = %warning, "Skipped catalog row");
  }

  let saved = store::upsert_exercises(&state.db, &exercises).await?;
  let fetched = exercises.len();
  state.exercise_cache.put(exercises).await;

  info!(fetched, saved, "Catalog sync complete");
  Ok(SyncSummary {
    fetched,
    saved,
    warnings,
  })
}

/// ---------------------------------------------------------------------------
/// CSV Import
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ImportSummary {
  pub imported: usize,
  pub skipped: Vec<String>,
}

pub async fn import_catalog_csv(state: &AppState, path: &Path) -> Result<ImportSummary, String> {
  let report = import_exercises_from_path(path)
    .map_err(|e| format!("Failed to import {}: {}", path.display(), e))?;

  let imported = store::upsert_exercises(&state.db, &report.exercises).await?;
  // Local rows changed; drop any catalog copy fetched earlier
  state.exercise_cache.invalidate().await;

  Ok(ImportSummary {
    imported,
    skipped: report.skipped,
  })
}
