pub mod exercise;
pub mod program;
pub mod routine;

pub use exercise::{Exercise, ExerciseRow};
pub use program::{Program, ProgramExercise, ProgramRoutine};
pub use routine::{Routine, RoutineExercise, SlotRole};
