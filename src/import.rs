//! Exercise catalog import from the seed CSV layout
//!
//! Columns: name, description, instructions, category, primary_muscle,
//! secondary_muscle, tertiary_muscle, equipment_needed, difficulty_level.
//! A literal `None` marks an empty muscle column. Every imported exercise is a
//! strength exercise, compound when it has a secondary muscle.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::Exercise;

const IMPORTED_EXERCISE_TYPE: &str = "strength";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
  #[error("Failed to read CSV: {0}")]
  Csv(#[from] csv::Error),

  #[error("Missing required column: {0}")]
  MissingColumn(&'static str),
}

impl Serialize for ImportError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

#[derive(Debug, Deserialize)]
struct CsvExerciseRecord {
  name: String,
  #[serde(default)]
  category: Option<String>,
  #[serde(default)]
  primary_muscle: Option<String>,
  #[serde(default)]
  secondary_muscle: Option<String>,
  #[serde(default)]
  tertiary_muscle: Option<String>,
  #[serde(default)]
  equipment_needed: Option<String>,
  #[serde(default)]
  difficulty_level: Option<String>,
}

/// Exercises read from a CSV plus one message per rejected row
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
  pub exercises: Vec<Exercise>,
  pub skipped: Vec<String>,
}

fn present(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
}

impl CsvExerciseRecord {
  fn into_exercise(self) -> Option<Exercise> {
    let name = self.name.trim();
    if name.is_empty() {
      return None;
    }

    let secondary = present(self.secondary_muscle);
    Some(Exercise {
      id: None,
      name: name.to_string(),
      exercise_type: IMPORTED_EXERCISE_TYPE.to_string(),
      category: present(self.category),
      primary_muscles: present(self.primary_muscle).into_iter().collect(),
      is_compound: secondary.is_some(),
      secondary_muscles: secondary.into_iter().collect(),
      tertiary_muscles: present(self.tertiary_muscle).into_iter().collect(),
      default_sets: None,
      default_reps: None,
      equipment: present(self.equipment_needed),
      difficulty: present(self.difficulty_level),
    })
  }
}

pub fn import_exercises<R: Read>(reader: R) -> Result<ImportReport, ImportError> {
  let mut rdr = csv::ReaderBuilder::new()
    .trim(csv::Trim::Headers)
    .flexible(true)
    .from_reader(reader);

  let headers = rdr.headers()?.clone();
  for required in ["name", "primary_muscle"] {
    if !headers.iter().any(|h| h == required) {
      return Err(ImportError::MissingColumn(required));
    }
  }

  let mut report = ImportReport::default();
  for (idx, record) in rdr.deserialize::<CsvExerciseRecord>().enumerate() {
    // Header is line 1
    let line = idx + 2;
    match record {
      Ok(record) => match record.into_exercise() {
        Some(exercise) if report.exercises.iter().any(|e| e.name == exercise.name) => {
          warn!(line, name = %exercise.name, "Duplicate exercise name in CSV");
          report
            .skipped
            .push(format!("Line {}: duplicate exercise '{}'", line, exercise.name));
        }
        Some(exercise) => report.exercises.push(exercise),
        None => {
          warn!(line, "CSV row has no exercise name");
          report.skipped.push(format!("Line {}: missing name", line));
        }
      },
      Err(e) => {
        warn!(line, error = %e, "Unreadable CSV row");
        report.skipped.push(format!("Line {}: {}", line, e));
      }
    }
  }

  info!(
    imported = report.exercises.len(),
    skipped = report.skipped.len(),
    "Parsed exercise CSV"
  );

  Ok(report)
}

pub fn import_exercises_from_path(path: &Path) -> Result<ImportReport, ImportError> {
  let file = std::fs::File::open(path).map_err(csv::Error::from)?;
  import_exercises(file)
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = "\
name,description,instructions,category,primary_muscle,secondary_muscle,tertiary_muscle,equipment_needed,difficulty_level
Barbell Bench Press,Flat press,\"Lower the bar, press up\",Free Weight,Chest,Triceps,Front Deltoids,Barbell,Intermediate
Cable Curl,Curl,Curl it,Machine,Biceps,None,None,Cable,Beginner
,No name,,Bodyweight,Abs,None,None,None,Beginner
";

  #[test]
  fn test_import_maps_columns() {
    let report = import_exercises(SAMPLE.as_bytes()).unwrap();

    assert_eq!(report.exercises.len(), 2);
    let bench = &report.exercises[0];
    assert_eq!(bench.name, "Barbell Bench Press");
    assert_eq!(bench.exercise_type, "strength");
    assert_eq!(bench.category.as_deref(), Some("Free Weight"));
    assert_eq!(bench.primary_muscles, vec!["Chest"]);
    assert_eq!(bench.secondary_muscles, vec!["Triceps"]);
    assert_eq!(bench.tertiary_muscles, vec!["Front Deltoids"]);
    assert_eq!(bench.equipment.as_deref(), Some("Barbell"));
    assert_eq!(bench.difficulty.as_deref(), Some("Intermediate"));
    assert!(bench.is_compound);
  }

  #[test]
  fn test_none_literal_means_absent() {
    let report = import_exercises(SAMPLE.as_bytes()).unwrap();
    let curl = &report.exercises[1];

    assert!(curl.secondary_muscles.is_empty());
    assert!(curl.tertiary_muscles.is_empty());
    assert!(!curl.is_compound);
  }

  #[test]
  fn test_rows_without_name_are_skipped() {
    let report = import_exercises(SAMPLE.as_bytes()).unwrap();
    assert_eq!(report.skipped, vec!["Line 4: missing name".to_string()]);
  }

  #[test]
  fn test_duplicate_names_are_skipped() {
    let csv = "name,primary_muscle\nSquat,Quadriceps\nSquat,Glutes\n";
    let report = import_exercises(csv.as_bytes()).unwrap();

    assert_eq!(report.exercises.len(), 1);
    assert_eq!(report.exercises[0].primary_muscles, vec!["Quadriceps"]);
    assert_eq!(report.skipped.len(), 1);
  }

  #[test]
  fn test_missing_column_is_error() {
    let csv = "title,muscle\nSquat,Quadriceps\n";
    assert!(matches!(
      import_exercises(csv.as_bytes()),
      Err(ImportError::MissingColumn("name"))
    ));
  }

  #[test]
  fn test_missing_file_is_error() {
    let result = import_exercises_from_path(Path::new("/nonexistent/exercises.csv"));
    assert!(matches!(result, Err(ImportError::Csv(_))));
  }
}
