//! Local SQLite persistence for catalog snapshots, saved routines and
//! engagement history

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::db::DbPool;
use crate::engagement::EngagementResult;
use crate::models::{Exercise, ExerciseRow, Routine, RoutineExercise, SlotRole};

/// ---------------------------------------------------------------------------
/// Exercises
/// ---------------------------------------------------------------------------

/// Insert or refresh exercises by name. Returns the number of rows written.
pub async fn upsert_exercises(db: &DbPool, exercises: &[Exercise]) -> Result<usize, String> {
  let synced_at = Utc::now();
  let mut tx = db
    .begin()
    .await
    .map_err(|e| format!("Failed to start transaction: {}", e))?;

  for exercise in exercises {
    let to_json = |muscles: &Vec<String>| {
      serde_json::to_string(muscles).map_err(|e| format!("Failed to encode muscles: {}", e))
    };

    // A known external id under a new name is a rename: move the row onto
    // the new name so the name upsert below lands on it.
    if let Some(external_id) = &exercise.id {
      sqlx::query(
        r#"
        DELETE FROM exercises
        WHERE name = ?2
          AND external_id IS NOT ?1
          AND EXISTS (SELECT 1 FROM exercises WHERE external_id = ?1)
        "#,
      )
      .bind(external_id)
      .bind(&exercise.name)
      .execute(&mut *tx)
      .await
      .map_err(|e| format!("Failed to release name '{}': {}", exercise.name, e))?;

      let renamed = sqlx::query("UPDATE exercises SET name = ?2 WHERE external_id = ?1 AND name <> ?2")
        .bind(external_id)
        .bind(&exercise.name)
        .execute(&mut *tx)
        .await
        .map_err(|e| format!("Failed to rename exercise '{}': {}", exercise.name, e))?;

      if renamed.rows_affected() > 0 {
        debug!(external_id = %external_id, name = %exercise.name, "Exercise renamed upstream");
      }
    }

    sqlx::query(
      r#"
      INSERT INTO exercises (
        external_id, name, exercise_type, category,
        primary_muscles_json, secondary_muscles_json, tertiary_muscles_json,
        is_compound, default_sets, default_reps, equipment, difficulty, synced_at
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
      ON CONFLICT(name) DO UPDATE SET
        external_id = COALESCE(excluded.external_id, exercises.external_id),
        exercise_type = excluded.exercise_type,
        category = excluded.category,
        primary_muscles_json = excluded.primary_muscles_json,
        secondary_muscles_json = excluded.secondary_muscles_json,
        tertiary_muscles_json = excluded.tertiary_muscles_json,
        is_compound = excluded.is_compound,
        default_sets = excluded.default_sets,
        default_reps = excluded.default_reps,
        equipment = excluded.equipment,
        difficulty = excluded.difficulty,
        synced_at = excluded.synced_at
      "#,
    )
    .bind(&exercise.id)
    .bind(&exercise.name)
    .bind(&exercise.exercise_type)
    .bind(&exercise.category)
    .bind(to_json(&exercise.primary_muscles)?)
    .bind(to_json(&exercise.secondary_muscles)?)
    .bind(to_json(&exercise.tertiary_muscles)?)
    .bind(exercise.is_compound)
    .bind(exercise.default_sets.map(i64::from))
    .bind(&exercise.default_reps)
    .bind(&exercise.equipment)
    .bind(&exercise.difficulty)
    .bind(synced_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| format!("Failed to save exercise '{}': {}", exercise.name, e))?;
  }

  tx.commit()
    .await
    .map_err(|e| format!("Failed to commit exercises: {}", e))?;

  info!(count = exercises.len(), "Saved exercise catalog snapshot");
  Ok(exercises.len())
}

pub async fn load_exercises(db: &DbPool) -> Result<Vec<Exercise>, String> {
  let rows = sqlx::query_as::<_, ExerciseRow>("SELECT * FROM exercises ORDER BY id")
    .fetch_all(db)
    .await
    .map_err(|e| format!("Failed to load exercises: {}", e))?;

  Ok(rows.into_iter().map(ExerciseRow::into_exercise).collect())
}

/// ---------------------------------------------------------------------------
/// Routines
/// ---------------------------------------------------------------------------

/// Replace the saved plan with `routines`. Returns the new routine IDs.
pub async fn save_routines(
  db: &DbPool,
  routines: &[Routine],
  frequency: u8,
) -> Result<Vec<i64>, String> {
  let mut tx = db
    .begin()
    .await
    .map_err(|e| format!("Failed to start transaction: {}", e))?;

  sqlx::query("DELETE FROM routine_exercises")
    .execute(&mut *tx)
    .await
    .map_err(|e| format!("Failed to clear routine exercises: {}", e))?;
  sqlx::query("DELETE FROM routines")
    .execute(&mut *tx)
    .await
    .map_err(|e| format!("Failed to clear routines: {}", e))?;

  let mut ids = Vec::with_capacity(routines.len());
  for routine in routines {
    let routine_id = sqlx::query(
      r#"
      INSERT INTO routines (name, day_number, focus, frequency, is_volume_variant, source_day)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6)
      "#,
    )
    .bind(&routine.name)
    .bind(i64::from(routine.day_number))
    .bind(&routine.focus)
    .bind(i64::from(frequency))
    .bind(routine.is_volume_variant)
    .bind(routine.source_day.map(i64::from))
    .execute(&mut *tx)
    .await
    .map_err(|e| format!("Failed to save routine '{}': {}", routine.name, e))?
    .last_insert_rowid();

    for (position, entry) in routine.exercises.iter().enumerate() {
      let exercise_json = serde_json::to_string(&entry.exercise)
        .map_err(|e| format!("Failed to encode exercise: {}", e))?;

      sqlx::query(
        r#"
        INSERT INTO routine_exercises (
          routine_id, position, exercise_name, exercise_json, role, sets, reps, intensity
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
      )
      .bind(routine_id)
      .bind(position as i64)
      .bind(&entry.exercise.name)
      .bind(exercise_json)
      .bind(entry.role.to_string())
      .bind(i64::from(entry.sets))
      .bind(&entry.reps)
      .bind(i64::from(entry.intensity))
      .execute(&mut *tx)
      .await
      .map_err(|e| format!("Failed to save routine exercise: {}", e))?;
    }

    ids.push(routine_id);
  }

  tx.commit()
    .await
    .map_err(|e| format!("Failed to commit routines: {}", e))?;

  info!(count = ids.len(), frequency, "Saved routines");
  Ok(ids)
}

type RoutineRow = (i64, String, i64, String, bool, Option<i64>);
type RoutineExerciseRow = (String, String, i64, Option<String>, i64);

pub async fn load_saved_routines(db: &DbPool) -> Result<Vec<Routine>, String> {
  let rows: Vec<RoutineRow> = sqlx::query_as(
    "SELECT id, name, day_number, focus, is_volume_variant, source_day
     FROM routines ORDER BY day_number",
  )
  .fetch_all(db)
  .await
  .map_err(|e| format!("Failed to load routines: {}", e))?;

  let mut routines = Vec::with_capacity(rows.len());
  for (id, name, day_number, focus, is_volume_variant, source_day) in rows {
    let entries: Vec<RoutineExerciseRow> = sqlx::query_as(
      "SELECT exercise_json, role, sets, reps, intensity
       FROM routine_exercises WHERE routine_id = ?1 ORDER BY position",
    )
    .bind(id)
    .fetch_all(db)
    .await
    .map_err(|e| format!("Failed to load exercises for routine {}: {}", id, e))?;

    let exercises = entries
      .into_iter()
      .map(|(exercise_json, role, sets, reps, intensity)| {
        Ok(RoutineExercise {
          exercise: serde_json::from_str(&exercise_json)
            .map_err(|e| format!("Corrupt exercise in routine {}: {}", id, e))?,
          role: role.parse::<SlotRole>()?,
          sets: u32::try_from(sets).unwrap_or(0),
          reps,
          intensity: u8::try_from(intensity).unwrap_or(u8::MAX),
        })
      })
      .collect::<Result<Vec<_>, String>>()?;

    routines.push(Routine {
      name,
      day_number: u8::try_from(day_number).unwrap_or(0),
      focus,
      is_volume_variant,
      source_day: source_day.and_then(|d| u8::try_from(d).ok()),
      exercises,
    });
  }

  debug!(count = routines.len(), "Loaded saved routines");
  Ok(routines)
}

/// ---------------------------------------------------------------------------
/// Engagement Snapshots
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EngagementSnapshot {
  pub id: i64,
  pub program_name: Option<String>,
  pub source: String,
  pub result: EngagementResult,
  pub calculated_at: DateTime<Utc>,
}

pub async fn save_engagement_snapshot(
  db: &DbPool,
  program_name: Option<&str>,
  source: &str,
  result: &EngagementResult,
) -> Result<i64, String> {
  let result_json = serde_json::to_string(result)
    .map_err(|e| format!("Failed to encode engagement result: {}", e))?;

  let id = sqlx::query(
    r#"
    INSERT INTO engagement_snapshots (
      program_name, source, total_points, unique_muscles, overall_balance,
      result_json, calculated_at
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
  )
  .bind(program_name)
  .bind(source)
  .bind(result.program_stats.total_points)
  .bind(result.program_stats.unique_muscles as i64)
  .bind(result.balance.overall.map(|b| b.as_str()))
  .bind(result_json)
  .bind(result.calculated_at)
  .execute(db)
  .await
  .map_err(|e| format!("Failed to save engagement snapshot: {}", e))?
  .last_insert_rowid();

  Ok(id)
}

pub async fn latest_engagement_snapshot(db: &DbPool) -> Result<Option<EngagementSnapshot>, String> {
  let row: Option<(i64, Option<String>, String, String, DateTime<Utc>)> = sqlx::query_as(
    "SELECT id, program_name, source, result_json, calculated_at
     FROM engagement_snapshots ORDER BY calculated_at DESC, id DESC LIMIT 1",
  )
  .fetch_optional(db)
  .await
  .map_err(|e| format!("Failed to load engagement snapshot: {}", e))?;

  match row {
    Some((id, program_name, source, result_json, calculated_at)) => {
      let result = serde_json::from_str(&result_json)
        .map_err(|e| format!("Corrupt engagement snapshot {}: {}", id, e))?;
      Ok(Some(EngagementSnapshot {
        id,
        program_name,
        source,
        result,
        calculated_at,
      }))
    }
    None => Ok(None),
  }
}
