//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Exercise pool and program fixtures

use crate::models::Exercise;
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed the exercises table with the sample pool
/// Returns the row IDs of created exercises
pub async fn seed_test_exercises(pool: &SqlitePool) -> Vec<i64> {
  let mut ids = Vec::new();

  for exercise in sample_exercise_pool() {
    let to_json = |muscles: &Vec<String>| serde_json::to_string(muscles).expect("muscle list");

    let result = sqlx::query(
      r#"
      INSERT INTO exercises (
        external_id, name, exercise_type, category,
        primary_muscles_json, secondary_muscles_json, tertiary_muscles_json,
        is_compound
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
      "#,
    )
    .bind(&exercise.id)
    .bind(&exercise.name)
    .bind(&exercise.exercise_type)
    .bind(&exercise.category)
    .bind(to_json(&exercise.primary_muscles))
    .bind(to_json(&exercise.secondary_muscles))
    .bind(to_json(&exercise.tertiary_muscles))
    .bind(exercise.is_compound)
    .execute(pool)
    .await
    .expect("Failed to insert test exercise");

    ids.push(result.last_insert_rowid());
  }

  ids
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// A small but complete catalog: one warmup, one cooldown and working
/// exercises for every template slot except forearms.
pub fn sample_exercise_pool() -> Vec<Exercise> {
  let with_id = |id: &str, exercise: Exercise| Exercise {
    id: Some(id.to_string()),
    ..exercise
  };

  vec![
    with_id(
      "ex-01",
      Exercise::new("Treadmill Walk", "cardio").with_primary("Full Body"),
    ),
    with_id(
      "ex-02",
      Exercise::new("Barbell Row", "strength")
        .with_primary("Back")
        .with_secondary("Biceps")
        .with_tertiary("Rear Deltoids")
        .compound(),
    ),
    with_id(
      "ex-03",
      Exercise::new("Lat Pulldown", "strength")
        .with_primary("Lats")
        .with_secondary("Biceps"),
    ),
    with_id(
      "ex-04",
      Exercise::new("Barbell Curl", "strength").with_primary("Biceps"),
    ),
    with_id(
      "ex-05",
      Exercise::new("Bench Press", "strength")
        .with_primary("Chest")
        .with_secondary("Triceps")
        .with_tertiary("Front Deltoids")
        .compound(),
    ),
    with_id(
      "ex-06",
      Exercise::new("Tricep Pushdown", "strength").with_primary("Triceps"),
    ),
    with_id(
      "ex-07",
      Exercise::new("Back Squat", "strength")
        .with_primary("Quadriceps")
        .with_secondary("Glutes")
        .compound(),
    ),
    with_id(
      "ex-08",
      Exercise::new("Romanian Deadlift", "strength")
        .with_primary("Hamstrings")
        .with_secondary("Glutes")
        .compound(),
    ),
    with_id(
      "ex-09",
      Exercise::new("Standing Calf Raise", "strength").with_primary("Calves"),
    ),
    with_id(
      "ex-10",
      Exercise::new("Overhead Press", "strength")
        .with_primary("Shoulders")
        .with_secondary("Triceps")
        .compound(),
    ),
    with_id(
      "ex-11",
      Exercise::new("Crunch", "strength").with_primary("Abs"),
    ),
    with_id(
      "ex-12",
      Exercise::new("Hamstring Stretch", "stretching").with_primary("Hamstrings"),
    ),
  ]
}

/// Program in the backend's nested shape (program_routines → routine →
/// routine_exercises → exercise)
pub fn mock_program_json() -> Value {
  json!({
    "id": "prog-1",
    "name": "Test Program",
    "program_routines": [
      {
        "week_number": 1,
        "day_number": 1,
        "routine": {
          "name": "Push",
          "routine_exercises": [
            {
              "target_sets": 3,
              "exercise": {
                "id": "ex-05",
                "name": "Bench Press",
                "type": "strength",
                "primary_muscle": "Chest",
                "secondary_muscle": "Triceps"
              }
            }
          ]
        }
      },
      {
        "week_number": 1,
        "day_number": 2,
        "routine": {
          "name": "Pull",
          "routine_exercises": [
            {
              "sets": 2,
              "exercise": {
                "id": "ex-02",
                "name": "Barbell Row",
                "type": "strength",
                "primary_muscle": "Lats",
                "secondary_muscle": "Biceps"
              }
            }
          ]
        }
      }
    ]
  })
}

/// Catalog rows as served by the exercises_with_muscles view
pub fn mock_catalog_json() -> Value {
  json!([
    {
      "id": "ex-05",
      "name": "Bench Press",
      "exercise_type": "strength",
      "category": "Chest",
      "is_compound": true,
      "primary_muscle": "Chest",
      "secondary_muscle": "Triceps",
      "tertiary_muscle": null
    },
    {
      "id": "ex-04",
      "name": "Barbell Curl",
      "exercise_type": "strength",
      "category": "Arms",
      "is_compound": false,
      "primary_muscle": "Biceps",
      "secondary_muscle": null,
      "tertiary_muscle": null
    }
  ])
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('exercises', 'routines', 'routine_exercises', 'engagement_snapshots')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4, "Expected 4 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_exercises_returns_correct_count() {
    let pool = setup_test_db().await;

    let ids = seed_test_exercises(&pool).await;
    assert_eq!(ids.len(), sample_exercise_pool().len());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
      .fetch_one(&pool)
      .await
      .expect("Failed to count exercises");

    assert_eq!(count as usize, ids.len());

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_sample_pool_names_are_unique() {
    let pool = sample_exercise_pool();
    let mut names: Vec<&str> = pool.iter().map(|e| e.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), pool.len());
  }
}
