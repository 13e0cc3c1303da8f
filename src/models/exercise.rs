use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exercise in the single internal shape every analysis and generation
/// function works on. Upstream shapes are mapped here by `normalize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
  pub id: Option<String>,
  pub name: String,
  /// Declared type tag ("strength", "warmup", "stretching", ...)
  pub exercise_type: String,
  pub category: Option<String>,
  #[serde(default)]
  pub primary_muscles: Vec<String>,
  #[serde(default)]
  pub secondary_muscles: Vec<String>,
  #[serde(default)]
  pub tertiary_muscles: Vec<String>,
  #[serde(default)]
  pub is_compound: bool,
  pub default_sets: Option<u32>,
  pub default_reps: Option<String>,
  pub equipment: Option<String>,
  pub difficulty: Option<String>,
}

impl Exercise {
  pub fn new(name: &str, exercise_type: &str) -> Self {
    Self {
      id: None,
      name: name.to_string(),
      exercise_type: exercise_type.to_string(),
      category: None,
      primary_muscles: vec![],
      secondary_muscles: vec![],
      tertiary_muscles: vec![],
      is_compound: false,
      default_sets: None,
      default_reps: None,
      equipment: None,
      difficulty: None,
    }
  }

  pub fn with_primary(mut self, muscle: &str) -> Self {
    self.primary_muscles.push(muscle.to_string());
    self
  }

  pub fn with_secondary(mut self, muscle: &str) -> Self {
    self.secondary_muscles.push(muscle.to_string());
    self
  }

  pub fn with_tertiary(mut self, muscle: &str) -> Self {
    self.tertiary_muscles.push(muscle.to_string());
    self
  }

  pub fn compound(mut self) -> Self {
    self.is_compound = true;
    self
  }

  pub fn primary(&self) -> Option<&str> {
    self.primary_muscles.first().map(String::as_str)
  }

  pub fn secondary(&self) -> Option<&str> {
    self.secondary_muscles.first().map(String::as_str)
  }

  pub fn tertiary(&self) -> Option<&str> {
    self.tertiary_muscles.first().map(String::as_str)
  }

  /// Compound when flagged explicitly or when the type string says so
  pub fn is_compound_movement(&self) -> bool {
    self.is_compound || self.exercise_type.to_lowercase().contains("compound")
  }
}

/// Catalog snapshot row as stored in the local database.
/// Muscle lists are kept as JSON arrays.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseRow {
  pub id: i64,
  pub external_id: Option<String>,
  pub name: String,
  pub exercise_type: String,
  pub category: Option<String>,
  pub primary_muscles_json: String,
  pub secondary_muscles_json: String,
  pub tertiary_muscles_json: String,
  pub is_compound: bool,
  pub default_sets: Option<i64>,
  pub default_reps: Option<String>,
  pub equipment: Option<String>,
  pub difficulty: Option<String>,
  pub synced_at: Option<DateTime<Utc>>,
}

impl ExerciseRow {
  pub fn into_exercise(self) -> Exercise {
    let parse = |json: &str| serde_json::from_str::<Vec<String>>(json).unwrap_or_default();

    Exercise {
      id: self.external_id,
      name: self.name,
      exercise_type: self.exercise_type,
      category: self.category,
      primary_muscles: parse(&self.primary_muscles_json),
      secondary_muscles: parse(&self.secondary_muscles_json),
      tertiary_muscles: parse(&self.tertiary_muscles_json),
      is_compound: self.is_compound,
      default_sets: self.default_sets.and_then(|s| u32::try_from(s).ok()),
      default_reps: self.default_reps,
      equipment: self.equipment,
      difficulty: self.difficulty,
    }
  }
}
