//! Static muscle taxonomy
//!
//! Read-only lookup tables used by the engagement scorer and the routine
//! generator. Every lookup is a case-insensitive substring match, so
//! "Rear Deltoids" and "deltoids (lateral)" both hit the "deltoid" entry.

use serde::{Deserialize, Serialize};

use crate::models::Exercise;

/// ---------------------------------------------------------------------------
/// Classification Tables
/// ---------------------------------------------------------------------------

pub const BIG_MUSCLES: &[&str] = &[
  "chest",
  "pectoral",
  "back",
  "lats",
  "latissimus",
  "rhomboid",
  "trapezius",
  "traps",
  "quadriceps",
  "quads",
  "hamstring",
  "glute",
  "shoulder",
  "deltoid",
];

pub const LITTLE_MUSCLES: &[&str] = &[
  "biceps",
  "triceps",
  "forearm",
  "calves",
  "calf",
  "abs",
  "abdominal",
  "oblique",
  "core",
  "hip flexor",
  "adductor",
  "abductor",
  "neck",
];

pub const WARMUP_TYPES: &[&str] = &[
  "warmup",
  "warm-up",
  "warm up",
  "cardio",
  "mobility",
  "activation",
];

pub const COOLDOWN_TYPES: &[&str] = &[
  "cooldown",
  "cool-down",
  "cool down",
  "stretch",
  "flexibility",
  "recovery",
];

pub const PUSH_MUSCLES: &[&str] = &[
  "chest",
  "pectoral",
  "front delt",
  "anterior delt",
  "triceps",
];

pub const PULL_MUSCLES: &[&str] = &[
  "lats",
  "latissimus",
  "rhomboid",
  "rear delt",
  "posterior delt",
  "biceps",
];

/// Simplified display names, checked in order (first hit wins)
const SIMPLIFICATIONS: &[(&[&str], &str)] = &[
  (&["deltoid", "shoulder"], "Shoulders"),
  (
    &["quad", "hamstring", "glute", "calf", "calves", "adductor", "abductor", "hip flexor"],
    "Legs",
  ),
  (&["lats", "latissimus", "rhomboid", "trap", "back"], "Back"),
  (&["chest", "pectoral"], "Chest"),
  (&["bicep"], "Biceps"),
  (&["tricep"], "Triceps"),
  (&["forearm"], "Forearms"),
  (&["abs", "abdominal", "oblique", "core"], "Core"),
];

/// Known-good names for sets of simplified muscles
const COMBINATIONS: &[(&[&str], &str)] = &[
  (&["Back", "Biceps"], "Back & Biceps"),
  (&["Chest", "Triceps"], "Chest & Triceps"),
  (&["Legs", "Shoulders"], "Legs & Shoulders"),
  (&["Chest", "Back"], "Chest & Back"),
  (&["Biceps", "Triceps"], "Arms"),
  (&["Chest", "Shoulders", "Triceps"], "Push"),
  (&["Back", "Biceps", "Forearms"], "Pull"),
  (&["Legs", "Core"], "Legs & Core"),
  (&["Chest", "Back", "Shoulders"], "Upper Body"),
  (&["Chest", "Back", "Biceps", "Triceps"], "Upper Body"),
  (&["Chest", "Back", "Shoulders", "Biceps", "Triceps"], "Upper Body"),
];

/// ---------------------------------------------------------------------------
/// Classifiers
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleSize {
  Big,
  Little,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
  Warmup,
  Cooldown,
  BigMuscle,
  LittleMuscle,
}

pub fn matches_any(value: &str, needles: &[&str]) -> bool {
  let value = value.to_lowercase();
  needles.iter().any(|n| value.contains(n))
}

pub fn classify_muscle(name: &str) -> MuscleSize {
  if matches_any(name, BIG_MUSCLES) {
    MuscleSize::Big
  } else {
    MuscleSize::Little
  }
}

pub fn is_warmup_type(exercise_type: &str) -> bool {
  matches_any(exercise_type, WARMUP_TYPES)
}

pub fn is_cooldown_type(exercise_type: &str) -> bool {
  matches_any(exercise_type, COOLDOWN_TYPES)
}

pub fn is_push_muscle(name: &str) -> bool {
  matches_any(name, PUSH_MUSCLES)
}

pub fn is_pull_muscle(name: &str) -> bool {
  matches_any(name, PULL_MUSCLES)
}

/// Bucket an exercise. Type tags decide warmup/cooldown before muscle size
/// is looked at; anything without a big primary muscle is little.
pub fn categorize_exercise(exercise: &Exercise) -> ExerciseCategory {
  let category = exercise.category.as_deref().unwrap_or("");

  if is_warmup_type(&exercise.exercise_type) || is_warmup_type(category) {
    return ExerciseCategory::Warmup;
  }
  if is_cooldown_type(&exercise.exercise_type) || is_cooldown_type(category) {
    return ExerciseCategory::Cooldown;
  }

  let has_big = exercise
    .primary_muscles
    .iter()
    .any(|m| classify_muscle(m) == MuscleSize::Big);

  if has_big {
    ExerciseCategory::BigMuscle
  } else {
    ExerciseCategory::LittleMuscle
  }
}

/// ---------------------------------------------------------------------------
/// Naming Helpers
/// ---------------------------------------------------------------------------

pub fn simplify_muscle(name: &str) -> String {
  let lowered = name.to_lowercase();
  SIMPLIFICATIONS
    .iter()
    .find(|(needles, _)| needles.iter().any(|n| lowered.contains(n)))
    .map(|(_, label)| label.to_string())
    .unwrap_or_else(|| name.trim().to_string())
}

/// Look up a known name for a set of simplified muscles (order-insensitive)
pub fn combination_name(muscles: &[String]) -> Option<&'static str> {
  COMBINATIONS
    .iter()
    .find(|(combo, _)| {
      combo.len() == muscles.len() && combo.iter().all(|c| muscles.iter().any(|m| m == c))
    })
    .map(|(_, name)| *name)
}
