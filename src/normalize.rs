//! Boundary normalization
//!
//! Upstream queries hand us programs and exercises in several shapes: muscle
//! groups under `primary_muscle_groups`, `primary_muscle_group` or
//! `primary_muscle`, routines wrapped in join rows, sets under different
//! keys. Everything is mapped here into `Exercise` / `Program` so the scorer
//! and the generator only ever see one shape. Malformed pieces are skipped
//! and reported as warnings.

use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{Exercise, Program, ProgramExercise, ProgramRoutine};

const ROUTINE_KEYS: &[&str] = &["routines", "program_routines", "workouts"];
const ROUTINE_WRAPPER_KEYS: &[&str] = &["routine", "routines"];
const ENTRY_KEYS: &[&str] = &["exercises", "routine_exercises", "program_exercises"];
const ENTRY_WRAPPER_KEYS: &[&str] = &["exercise", "exercises"];
const SET_KEYS: &[&str] = &["sets", "target_sets", "set_count"];
const DEFAULT_EXERCISE_TYPE: &str = "strength";

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
  #[error("Program must be an object, found {0}")]
  ProgramNotObject(&'static str),

  #[error("Program field `{field}` must be an array, found {found}")]
  RoutinesNotArray { field: String, found: &'static str },

  #[error("Exercise must be an object, found {0}")]
  ExerciseNotObject(&'static str),
}

/// ---------------------------------------------------------------------------
/// Value Helpers
/// ---------------------------------------------------------------------------

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

fn first_present<'a>(
  obj: &'a Map<String, Value>,
  keys: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
  keys
    .iter()
    .find_map(|k| obj.get(*k).filter(|v| !v.is_null()).map(|v| (*k, v)))
}

fn string_field(obj: &Map<String, Value>, keys: &[&'static str]) -> Option<String> {
  first_present(obj, keys).and_then(|(_, v)| match v {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  })
}

fn as_u32(value: &Value) -> Option<u32> {
  match value {
    Value::Number(n) => {
      if let Some(u) = n.as_u64() {
        u32::try_from(u).ok()
      } else {
        n.as_f64()
          .filter(|f| f.is_finite() && *f >= 0.0)
          .map(|f| f.round() as u32)
      }
    }
    Value::String(s) => s.trim().parse::<u32>().ok(),
    _ => None,
  }
}

fn u32_field(obj: &Map<String, Value>, keys: &[&'static str]) -> Option<u32> {
  first_present(obj, keys).and_then(|(_, v)| as_u32(v))
}

/// Collect muscle names from a string, a `{ name }` object, or an array of either
fn muscle_names(value: &Value) -> Vec<String> {
  match value {
    Value::String(s) => {
      let trimmed = s.trim();
      if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        vec![]
      } else {
        vec![trimmed.to_string()]
      }
    }
    Value::Object(obj) => obj
      .get("name")
      .or_else(|| obj.get("muscle_name"))
      .map(muscle_names)
      .unwrap_or_default(),
    Value::Array(items) => items.iter().flat_map(muscle_names).collect(),
    _ => vec![],
  }
}

fn tier_muscles(obj: &Map<String, Value>, tier: &str) -> Vec<String> {
  if let Some(groups) = obj.get("muscle_groups").and_then(Value::as_object) {
    let names = groups.get(tier).map(muscle_names).unwrap_or_default();
    if !names.is_empty() {
      return names;
    }
  }

  [
    format!("{}_muscle_groups", tier),
    format!("{}_muscle_group", tier),
    format!("{}_muscle", tier),
  ]
  .iter()
  .filter_map(|k| obj.get(k.as_str()))
  .map(muscle_names)
  .find(|names| !names.is_empty())
  .unwrap_or_default()
}

/// ---------------------------------------------------------------------------
/// Exercises
/// ---------------------------------------------------------------------------

pub fn normalize_exercise(value: &Value) -> Result<Exercise, NormalizeError> {
  let obj = value
    .as_object()
    .ok_or_else(|| NormalizeError::ExerciseNotObject(json_kind(value)))?;

  let category = string_field(obj, &["category"]);
  let exercise_type = string_field(obj, &["type", "exercise_type"])
    .or_else(|| category.clone())
    .unwrap_or_else(|| DEFAULT_EXERCISE_TYPE.to_string());

  Ok(Exercise {
    id: string_field(obj, &["id", "exercise_id"]),
    name: string_field(obj, &["name", "exercise_name"])
      .unwrap_or_else(|| "Unnamed exercise".to_string()),
    exercise_type,
    category,
    primary_muscles: tier_muscles(obj, "primary"),
    secondary_muscles: tier_muscles(obj, "secondary"),
    tertiary_muscles: tier_muscles(obj, "tertiary"),
    is_compound: obj
      .get("is_compound")
      .and_then(Value::as_bool)
      .unwrap_or(false),
    default_sets: u32_field(obj, &["default_sets", "suggested_sets"]),
    default_reps: string_field(obj, &["default_reps", "suggested_reps"]),
    equipment: string_field(obj, &["equipment_needed", "equipment"]),
    difficulty: string_field(obj, &["difficulty_level", "difficulty"]),
  })
}

/// Normalize a flat exercise list, skipping entries that are not objects
pub fn normalize_exercises(values: &[Value]) -> (Vec<Exercise>, Vec<String>) {
  let mut warnings = Vec::new();
  let exercises = values
    .iter()
    .enumerate()
    .filter_map(|(idx, v)| match normalize_exercise(v) {
      Ok(exercise) => Some(exercise),
      Err(e) => {
        warn!(index = idx, error = %e, "Skipping malformed exercise");
        warnings.push(format!("Skipping exercise {}: {}", idx + 1, e));
        None
      }
    })
    .collect();

  (exercises, warnings)
}

/// ---------------------------------------------------------------------------
/// Programs
/// ---------------------------------------------------------------------------

/// Normalize a program. Only a non-object program or a routines field that is
/// present but not an array is an error; every nested problem becomes a
/// warning and the offending routine or entry is dropped.
pub fn normalize_program(value: &Value) -> Result<(Program, Vec<String>), NormalizeError> {
  let obj = value
    .as_object()
    .ok_or_else(|| NormalizeError::ProgramNotObject(json_kind(value)))?;

  let mut warnings = Vec::new();
  let mut routines = Vec::new();

  match first_present(obj, ROUTINE_KEYS) {
    Some((_, Value::Array(items))) => {
      for (idx, item) in items.iter().enumerate() {
        if let Some(routine) = normalize_routine(item, idx, None, &mut warnings) {
          routines.push(routine);
        }
      }
    }
    Some((field, other)) => {
      return Err(NormalizeError::RoutinesNotArray {
        field: field.to_string(),
        found: json_kind(other),
      });
    }
    None => match obj.get("weeks") {
      Some(Value::Array(weeks)) => collect_week_routines(weeks, &mut routines, &mut warnings)?,
      Some(other) => {
        return Err(NormalizeError::RoutinesNotArray {
          field: "weeks".to_string(),
          found: json_kind(other),
        });
      }
      None => {
        warn!("Program has no routines");
        warnings.push("Program has no routines".to_string());
      }
    },
  }

  let program = Program {
    name: string_field(obj, &["name", "program_name", "title"]),
    routines,
  };

  Ok((program, warnings))
}

fn collect_week_routines(
  weeks: &[Value],
  routines: &mut Vec<ProgramRoutine>,
  warnings: &mut Vec<String>,
) -> Result<(), NormalizeError> {
  for (week_idx, week) in weeks.iter().enumerate() {
    let Some(week_obj) = week.as_object() else {
      warn!(week = week_idx + 1, "Skipping malformed week");
      warnings.push(format!("Skipping week {}: not an object", week_idx + 1));
      continue;
    };
    let week_number = u32_field(week_obj, &["week_number", "week"]).unwrap_or(week_idx as u32 + 1);

    let Some(Value::Array(days)) = week_obj.get("days") else {
      warn!(week = week_number, "Skipping week without days");
      warnings.push(format!("Skipping week {}: days missing or not an array", week_number));
      continue;
    };

    for (day_idx, day) in days.iter().enumerate() {
      let Some(day_obj) = day.as_object() else {
        warnings.push(format!("Skipping week {} day {}: not an object", week_number, day_idx + 1));
        continue;
      };
      let day_number = u32_field(day_obj, &["day_number", "day"]).unwrap_or(day_idx as u32 + 1);

      match first_present(day_obj, ROUTINE_KEYS) {
        Some((_, Value::Array(items))) => {
          for (idx, item) in items.iter().enumerate() {
            if let Some(mut routine) =
              normalize_routine(item, idx, Some(week_number), warnings)
            {
              routine.day_number = routine.day_number.or(Some(day_number));
              routines.push(routine);
            }
          }
        }
        Some((field, other)) => {
          return Err(NormalizeError::RoutinesNotArray {
            field: format!("weeks[{}].days[{}].{}", week_idx, day_idx, field),
            found: json_kind(other),
          });
        }
        None => {
          // A day can be the routine itself
          if let Some(mut routine) = normalize_routine(day, day_idx, Some(week_number), warnings) {
            routine.day_number = Some(day_number);
            routines.push(routine);
          }
        }
      }
    }
  }
  Ok(())
}

fn normalize_routine(
  item: &Value,
  idx: usize,
  week_number: Option<u32>,
  warnings: &mut Vec<String>,
) -> Option<ProgramRoutine> {
  let Some(wrapper) = item.as_object() else {
    warn!(routine = idx + 1, "Skipping malformed routine");
    warnings.push(format!("Skipping routine {}: not an object", idx + 1));
    return None;
  };

  // Join rows carry week/day numbering and nest the routine itself
  let routine_obj = ROUTINE_WRAPPER_KEYS
    .iter()
    .find_map(|k| wrapper.get(*k).and_then(Value::as_object))
    .unwrap_or(wrapper);

  let name = string_field(routine_obj, &["name", "routine_name", "title"])
    .or_else(|| string_field(wrapper, &["name"]));
  let label = name.clone().unwrap_or_else(|| format!("#{}", idx + 1));

  let entries = match first_present(routine_obj, ENTRY_KEYS) {
    Some((_, Value::Array(entries))) => entries,
    _ => {
      warn!(routine = %label, "Skipping routine: exercises missing or not an array");
      warnings.push(format!(
        "Skipping routine {}: exercises missing or not an array",
        label
      ));
      return None;
    }
  };

  let mut exercises = Vec::with_capacity(entries.len());
  for (entry_idx, entry) in entries.iter().enumerate() {
    match normalize_entry(entry) {
      Ok(exercise) => exercises.push(exercise),
      Err(e) => {
        warn!(routine = %label, entry = entry_idx + 1, error = %e, "Skipping malformed exercise entry");
        warnings.push(format!(
          "Skipping exercise {} in routine {}: {}",
          entry_idx + 1,
          label,
          e
        ));
      }
    }
  }

  Some(ProgramRoutine {
    name,
    week_number: u32_field(wrapper, &["week_number", "week"]).or(week_number),
    day_number: u32_field(wrapper, &["day_number", "day"])
      .or_else(|| u32_field(routine_obj, &["day_number", "day"])),
    exercises,
  })
}

fn normalize_entry(entry: &Value) -> Result<ProgramExercise, NormalizeError> {
  let entry_obj = entry
    .as_object()
    .ok_or_else(|| NormalizeError::ExerciseNotObject(json_kind(entry)))?;

  let exercise_value = ENTRY_WRAPPER_KEYS
    .iter()
    .find_map(|k| entry_obj.get(*k).filter(|v| v.is_object()))
    .unwrap_or(entry);

  let exercise = normalize_exercise(exercise_value)?;
  let sets = u32_field(entry_obj, SET_KEYS)
    .or(exercise.default_sets)
    .unwrap_or(1);

  Ok(ProgramExercise { exercise, sets })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_muscle_aliases() {
    let a = normalize_exercise(&json!({
      "name": "Bench Press",
      "primary_muscle_groups": { "name": "Chest" },
      "secondary_muscle_group": "Triceps",
      "tertiary_muscle": [{ "name": "Front Deltoids" }]
    }))
    .unwrap();
    assert_eq!(a.primary(), Some("Chest"));
    assert_eq!(a.secondary(), Some("Triceps"));
    assert_eq!(a.tertiary(), Some("Front Deltoids"));

    let b = normalize_exercise(&json!({
      "name": "Row",
      "type": "strength",
      "is_compound": true,
      "muscle_groups": { "primary": ["Lats", "Rhomboids"], "secondary": ["Biceps"] }
    }))
    .unwrap();
    assert_eq!(b.primary_muscles, vec!["Lats", "Rhomboids"]);
    assert_eq!(b.secondary(), Some("Biceps"));
    assert!(b.is_compound);
  }

  #[test]
  fn test_none_literal_is_absent() {
    let e = normalize_exercise(&json!({
      "name": "Plank",
      "primary_muscle": "Abs",
      "secondary_muscle": "None"
    }))
    .unwrap();
    assert!(e.secondary_muscles.is_empty());
  }

  #[test]
  fn test_type_falls_back_to_category() {
    let e = normalize_exercise(&json!({ "name": "Bike", "category": "Cardio" })).unwrap();
    assert_eq!(e.exercise_type, "Cardio");

    let e = normalize_exercise(&json!({ "name": "Curl" })).unwrap();
    assert_eq!(e.exercise_type, "strength");
  }

  #[test]
  fn test_exercise_must_be_object() {
    assert!(matches!(
      normalize_exercise(&json!("Squat")),
      Err(NormalizeError::ExerciseNotObject("string"))
    ));
  }

  #[test]
  fn test_program_join_shape() {
    let program = json!({
      "name": "Block A",
      "program_routines": [
        {
          "week_number": 1,
          "day_number": 2,
          "routines": {
            "name": "Push",
            "routine_exercises": [
              { "target_sets": 4, "exercises": { "name": "Bench", "primary_muscle": "Chest" } }
            ]
          }
        }
      ]
    });

    let (program, warnings) = normalize_program(&program).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(program.name.as_deref(), Some("Block A"));
    assert_eq!(program.routines.len(), 1);

    let routine = &program.routines[0];
    assert_eq!(routine.name.as_deref(), Some("Push"));
    assert_eq!(routine.week_number, Some(1));
    assert_eq!(routine.day_number, Some(2));
    assert_eq!(routine.exercises[0].sets, 4);
    assert_eq!(routine.exercises[0].exercise.name, "Bench");
  }

  #[test]
  fn test_sets_fall_back_to_default_then_one() {
    let program = json!({
      "routines": [{
        "exercises": [
          { "exercise": { "name": "A", "default_sets": 5 } },
          { "exercise": { "name": "B" } },
          { "sets": "3", "exercise": { "name": "C" } }
        ]
      }]
    });
    let (program, _) = normalize_program(&program).unwrap();
    let sets: Vec<u32> = program.routines[0].exercises.iter().map(|e| e.sets).collect();
    assert_eq!(sets, vec![5, 1, 3]);
  }

  #[test]
  fn test_malformed_routines_are_skipped() {
    let program = json!({
      "routines": [
        { "name": "No exercises" },
        { "name": "Bad exercises", "exercises": "squat" },
        "not a routine",
        { "name": "Good", "exercises": [42, { "name": "Squat", "primary_muscle": "Quadriceps" }] }
      ]
    });

    let (program, warnings) = normalize_program(&program).unwrap();
    assert_eq!(program.routines.len(), 1);
    assert_eq!(program.routines[0].exercises.len(), 1);
    assert_eq!(warnings.len(), 4);
  }

  #[test]
  fn test_routines_not_array_is_error() {
    let err = normalize_program(&json!({ "routines": { "name": "x" } })).unwrap_err();
    assert!(matches!(err, NormalizeError::RoutinesNotArray { .. }));
    assert!(err.to_string().contains("routines"));
  }

  #[test]
  fn test_missing_routines_is_empty_with_warning() {
    let (program, warnings) = normalize_program(&json!({ "name": "Empty" })).unwrap();
    assert!(program.routines.is_empty());
    assert_eq!(warnings, vec!["Program has no routines".to_string()]);
  }

  #[test]
  fn test_week_day_nesting() {
    let program = json!({
      "weeks": [
        { "week_number": 1, "days": [
          { "day": 1, "routines": [{ "name": "A", "exercises": [{ "name": "Squat" }] }] },
          { "name": "B", "exercises": [{ "name": "Row" }] }
        ]}
      ]
    });

    let (program, warnings) = normalize_program(&program).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(program.routines.len(), 2);
    assert_eq!(program.routines[0].week_number, Some(1));
    assert_eq!(program.routines[0].day_number, Some(1));
    assert_eq!(program.routines[1].name.as_deref(), Some("B"));
    assert_eq!(program.routines[1].day_number, Some(2));
  }
}
