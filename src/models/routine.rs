use serde::{Deserialize, Serialize};

use super::Exercise;

/// Which template slot an entry was placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
  Warmup,
  Working,
  Cooldown,
}

impl std::fmt::Display for SlotRole {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Warmup => write!(f, "warmup"),
      Self::Working => write!(f, "working"),
      Self::Cooldown => write!(f, "cooldown"),
    }
  }
}

impl std::str::FromStr for SlotRole {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "warmup" => Ok(Self::Warmup),
      "working" => Ok(Self::Working),
      "cooldown" => Ok(Self::Cooldown),
      _ => Err(format!("Unknown slot role: {}", s)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineExercise {
  pub exercise: Exercise,
  pub role: SlotRole,
  pub sets: u32,
  pub reps: Option<String>,
  /// Target effort as a percentage (40-100 for working sets)
  pub intensity: u8,
}

/// A generated training day. Order of `exercises` is the performed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
  pub name: String,
  pub day_number: u8,
  /// Template label the day was built from
  pub focus: String,
  pub is_volume_variant: bool,
  /// Day number of the base routine a volume variant was derived from
  pub source_day: Option<u8>,
  pub exercises: Vec<RoutineExercise>,
}

impl Routine {
  pub fn working_exercises(&self) -> impl Iterator<Item = &RoutineExercise> {
    self.exercises.iter().filter(|e| e.role == SlotRole::Working)
  }
}
