use crate::commands::get_exercise_pool;
use crate::db::AppState;
use crate::models::Routine;
use crate::routines::generate_routines;
use crate::store;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GeneratedPlan {
  pub frequency: u8,
  pub routines: Vec<Routine>,
  /// Row IDs when the plan was persisted
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub saved_ids: Vec<i64>,
}

/// Generate a weekly plan from the current exercise pool
pub async fn generate_weekly_plan(
  state: &AppState,
  frequency: u8,
  save: bool,
) -> Result<GeneratedPlan, String> {
  let pool = get_exercise_pool(state).await?;
  let routines = generate_routines(&pool, frequency).map_err(|e| e.to_string())?;

  let saved_ids = if save {
    store::save_routines(&state.db, &routines, frequency).await?
  } else {
    vec![]
  };

  Ok(GeneratedPlan {
    frequency,
    routines,
    saved_ids,
  })
}

pub async fn get_saved_routines(state: &AppState) -> Result<Vec<Routine>, String> {
  store::load_saved_routines(&state.db).await
}
