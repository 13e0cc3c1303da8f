use crate::db::AppState;
use crate::engagement::{calculate_program_engagement, score_program, EngagementOptions, EngagementResult};
use crate::models::Program;
use crate::report::{export_program_analytics, generate_heatmap_data, ExportFormat, HeatmapEntry};
use crate::store::{self, EngagementSnapshot};
use serde_json::Value;
use tracing::warn;

/// ---------------------------------------------------------------------------
/// Analysis
/// ---------------------------------------------------------------------------

async fn maybe_save(
  state: &AppState,
  program_name: Option<&str>,
  source: &str,
  result: &EngagementResult,
  save: bool,
) -> Result<(), String> {
  if save && result.error.is_none() {
    store::save_engagement_snapshot(&state.db, program_name, source, result).await?;
  }
  Ok(())
}

/// Score a program given as raw JSON in any accepted shape
pub async fn analyze_program_json(
  state: &AppState,
  program: &Value,
  options: &EngagementOptions,
  save: bool,
) -> Result<EngagementResult, String> {
  let result = calculate_program_engagement(program, options);
  let name = program.get("name").and_then(Value::as_str);
  maybe_save(state, name, "file", &result, save).await?;
  Ok(result)
}

/// Fetch a program from the backend and score it
pub async fn analyze_remote_program(
  state: &AppState,
  program_id: &str,
  options: &EngagementOptions,
  save: bool,
) -> Result<EngagementResult, String> {
  let client = state.catalog_client()?;
  let program = client
    .fetch_program(program_id)
    .await
    .map_err(|e| format!("Failed to fetch program {}: {}", program_id, e))?;

  let result = calculate_program_engagement(&program, options);
  let name = program.get("name").and_then(Value::as_str);
  maybe_save(state, name, "backend", &result, save).await?;
  Ok(result)
}

/// Score the locally saved plan
pub async fn analyze_saved_routines(
  state: &AppState,
  options: &EngagementOptions,
  save: bool,
) -> Result<EngagementResult, String> {
  let routines = store::load_saved_routines(&state.db).await?;
  if routines.is_empty() {
    warn!("No saved routines to analyze");
  }

  let program = Program::from_routines(Some("Saved plan".to_string()), &routines);
  let result = score_program(&program, options);
  maybe_save(state, program.name.as_deref(), "saved", &result, save).await?;
  Ok(result)
}

pub async fn get_latest_engagement(state: &AppState) -> Result<Option<EngagementSnapshot>, String> {
  store::latest_engagement_snapshot(&state.db).await
}

/// ---------------------------------------------------------------------------
/// Reporting
/// ---------------------------------------------------------------------------

pub fn get_heatmap(result: &EngagementResult) -> Vec<HeatmapEntry> {
  generate_heatmap_data(result)
}

pub fn export_analytics(result: &EngagementResult, format: &str) -> Result<String, String> {
  let format: ExportFormat = format.parse().map_err(|e| format!("{}", e))?;
  export_program_analytics(result, format).map_err(|e| format!("Failed to export analytics: {}", e))
}
