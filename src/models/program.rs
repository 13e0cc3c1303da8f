use serde::{Deserialize, Serialize};

use super::{Exercise, Routine};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
  pub name: Option<String>,
  pub routines: Vec<ProgramRoutine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramRoutine {
  pub name: Option<String>,
  pub week_number: Option<u32>,
  pub day_number: Option<u32>,
  pub exercises: Vec<ProgramExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramExercise {
  pub exercise: Exercise,
  pub sets: u32,
}

impl Program {
  /// Build an analyzable program out of generated routines
  pub fn from_routines(name: Option<String>, routines: &[Routine]) -> Self {
    Self {
      name,
      routines: routines
        .iter()
        .map(|r| ProgramRoutine {
          name: Some(r.name.clone()),
          week_number: None,
          day_number: Some(u32::from(r.day_number)),
          exercises: r
            .exercises
            .iter()
            .map(|e| ProgramExercise {
              exercise: e.exercise.clone(),
              sets: e.sets,
            })
            .collect(),
        })
        .collect(),
    }
  }

  pub fn exercise_count(&self) -> usize {
    self.routines.iter().map(|r| r.exercises.len()).sum()
  }
}
