//! Routine Generator
//!
//! Turns a flat exercise pool and a weekly frequency (2-7) into training days:
//! - exercises are bucketed into warmup, cooldown, big-muscle and little-muscle
//! - compound lifts are ordered ahead of isolation work
//! - each day follows a fixed slot sequence from a per-frequency template
//!   (warmup → big → little → big 2 → little 2 → cooldown)
//! - days beyond the template count are "(Volume)" variants of the base days
//!
//! Display names come from the muscles a day actually touches, not from the
//! template label.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::{Exercise, Routine, RoutineExercise, SlotRole};
use crate::taxonomy::{
    categorize_exercise, combination_name, matches_any, simplify_muscle, ExerciseCategory,
};

pub const MIN_FREQUENCY: u8 = 2;
pub const MAX_FREQUENCY: u8 = 7;

const WARMUP_INTENSITY: u8 = 50;
const COOLDOWN_INTENSITY: u8 = 30;
const DEFAULT_DAY_INTENSITY: u8 = 80;
const VOLUME_INTENSITY_DROP: u8 = 10;
const MIN_VOLUME_INTENSITY: u8 = 40;
/// Working exercises added when a day's slots all came up empty
const TOP_UP_COUNT: usize = 2;

// ---------------------------------------------------------------------------
/// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    #[error("Frequency must be between 2 and 7 days per week, got {0}")]
    InvalidFrequency(u8),
}

impl Serialize for GeneratorError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ---------------------------------------------------------------------------
/// Day Templates
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MuscleSlot {
    /// Substrings matched against an exercise's primary muscles
    targets: &'static [&'static str],
    count: usize,
}

#[derive(Debug)]
struct DayTemplate {
    label: &'static str,
    intensity: u8,
    reps: Option<&'static str>,
    big_1: MuscleSlot,
    little_1: MuscleSlot,
    big_2: Option<MuscleSlot>,
    little_2: Option<MuscleSlot>,
}

static TWO_DAY_SPLIT: [DayTemplate; 2] = [
    DayTemplate {
        label: "Upper Body",
        intensity: DEFAULT_DAY_INTENSITY,
        reps: None,
        big_1: MuscleSlot {
            targets: &["back", "lats", "latissimus", "chest", "pectoral"],
            count: 2,
        },
        little_1: MuscleSlot {
            targets: &["biceps", "triceps"],
            count: 2,
        },
        big_2: Some(MuscleSlot {
            targets: &["shoulder", "deltoid"],
            count: 1,
        }),
        little_2: Some(MuscleSlot {
            targets: &["forearm"],
            count: 1,
        }),
    },
    DayTemplate {
        label: "Lower Body",
        intensity: DEFAULT_DAY_INTENSITY,
        reps: None,
        big_1: MuscleSlot {
            targets: &["quad", "hamstring", "glute"],
            count: 2,
        },
        little_1: MuscleSlot {
            targets: &["calf", "calves"],
            count: 1,
        },
        big_2: None,
        little_2: Some(MuscleSlot {
            targets: &["abs", "abdominal", "oblique", "core"],
            count: 1,
        }),
    },
];

static THREE_DAY_SPLIT: [DayTemplate; 3] = [
    DayTemplate {
        label: "Back & Biceps",
        intensity: DEFAULT_DAY_INTENSITY,
        reps: None,
        big_1: MuscleSlot {
            targets: &["back", "lats", "latissimus", "rhomboid", "trap"],
            count: 2,
        },
        little_1: MuscleSlot {
            targets: &["biceps"],
            count: 2,
        },
        big_2: None,
        little_2: Some(MuscleSlot {
            targets: &["forearm"],
            count: 1,
        }),
    },
    DayTemplate {
        label: "Chest & Triceps",
        intensity: DEFAULT_DAY_INTENSITY,
        reps: None,
        big_1: MuscleSlot {
            targets: &["chest", "pectoral"],
            count: 2,
        },
        little_1: MuscleSlot {
            targets: &["triceps"],
            count: 2,
        },
        big_2: None,
        little_2: None,
    },
    DayTemplate {
        label: "Legs & Shoulders",
        intensity: DEFAULT_DAY_INTENSITY,
        reps: None,
        big_1: MuscleSlot {
            targets: &["quad", "hamstring", "glute"],
            count: 2,
        },
        little_1: MuscleSlot {
            targets: &["calf", "calves"],
            count: 1,
        },
        big_2: Some(MuscleSlot {
            targets: &["shoulder", "deltoid"],
            count: 2,
        }),
        little_2: Some(MuscleSlot {
            targets: &["abs", "abdominal", "oblique", "core"],
            count: 1,
        }),
    },
];

static UPPER_POWER_DAY: DayTemplate = DayTemplate {
    label: "Upper Power",
    intensity: 85,
    reps: Some("4-6"),
    big_1: MuscleSlot {
        targets: &["chest", "pectoral", "back", "lats", "latissimus"],
        count: 2,
    },
    little_1: MuscleSlot {
        targets: &["triceps", "biceps"],
        count: 1,
    },
    big_2: Some(MuscleSlot {
        targets: &["shoulder", "deltoid"],
        count: 1,
    }),
    little_2: None,
};

fn templates_for(frequency: u8) -> Vec<&'static DayTemplate> {
    match frequency {
        2 => TWO_DAY_SPLIT.iter().collect(),
        3 => THREE_DAY_SPLIT.iter().collect(),
        _ => THREE_DAY_SPLIT
            .iter()
            .chain(std::iter::once(&UPPER_POWER_DAY))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
/// Exercise Pool
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CategorizedPool<'a> {
    warmup: Vec<&'a Exercise>,
    cooldown: Vec<&'a Exercise>,
    big: Vec<&'a Exercise>,
    little: Vec<&'a Exercise>,
}

impl<'a> CategorizedPool<'a> {
    fn from_pool(pool: &'a [Exercise]) -> Self {
        let mut categorized = Self::default();
        for exercise in pool {
            match categorize_exercise(exercise) {
                ExerciseCategory::Warmup => categorized.warmup.push(exercise),
                ExerciseCategory::Cooldown => categorized.cooldown.push(exercise),
                ExerciseCategory::BigMuscle => categorized.big.push(exercise),
                ExerciseCategory::LittleMuscle => categorized.little.push(exercise),
            }
        }

        // Compound before isolation; sort_by_key is stable so pool order breaks ties
        categorized.big.sort_by_key(|e| !e.is_compound_movement());
        categorized.little.sort_by_key(|e| !e.is_compound_movement());

        debug!(
            warmup = categorized.warmup.len(),
            cooldown = categorized.cooldown.len(),
            big = categorized.big.len(),
            little = categorized.little.len(),
            "Categorized exercise pool"
        );

        categorized
    }
}

/// Day under construction; tracks names already placed so nothing repeats
struct DayBuilder<'a> {
    entries: Vec<RoutineExercise>,
    used: Vec<&'a str>,
}

impl<'a> DayBuilder<'a> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            used: Vec::new(),
        }
    }

    fn is_used(&self, exercise: &Exercise) -> bool {
        self.used.contains(&exercise.name.as_str())
    }

    fn push(&mut self, exercise: &'a Exercise, role: SlotRole, intensity: u8, reps: Option<&str>) {
        let sets = match role {
            SlotRole::Working => exercise
                .default_sets
                .unwrap_or(if exercise.is_compound_movement() { 4 } else { 3 }),
            SlotRole::Warmup | SlotRole::Cooldown => exercise.default_sets.unwrap_or(1),
        };
        let reps = match role {
            SlotRole::Working => reps
                .map(str::to_string)
                .or_else(|| exercise.default_reps.clone())
                .or_else(|| {
                    Some(if exercise.is_compound_movement() { "8-10" } else { "10-12" }.to_string())
                }),
            SlotRole::Warmup | SlotRole::Cooldown => exercise.default_reps.clone(),
        };

        self.used.push(exercise.name.as_str());
        self.entries.push(RoutineExercise {
            exercise: exercise.clone(),
            role,
            sets,
            reps,
            intensity,
        });
    }

    fn fill_slot(&mut self, bucket: &[&'a Exercise], slot: &MuscleSlot, template: &DayTemplate) {
        let picks: Vec<&'a Exercise> = bucket
            .iter()
            .copied()
            .filter(|e| !self.is_used(e))
            .filter(|e| e.primary_muscles.iter().any(|m| matches_any(m, slot.targets)))
            .take(slot.count)
            .collect();

        for exercise in picks {
            self.push(exercise, SlotRole::Working, template.intensity, template.reps);
        }
    }

    fn has_working(&self) -> bool {
        self.entries.iter().any(|e| e.role == SlotRole::Working)
    }
}

fn build_day(template: &DayTemplate, pool: &CategorizedPool<'_>, day_number: u8) -> Routine {
    let mut day = DayBuilder::new();

    if let Some(warmup) = pool.warmup.first() {
        day.push(warmup, SlotRole::Warmup, WARMUP_INTENSITY, None);
    }

    day.fill_slot(&pool.big, &template.big_1, template);
    day.fill_slot(&pool.little, &template.little_1, template);
    if let Some(slot) = &template.big_2 {
        day.fill_slot(&pool.big, slot, template);
    }
    if let Some(slot) = &template.little_2 {
        day.fill_slot(&pool.little, slot, template);
    }

    // Never leave a day without working sets while the pool still has some
    if !day.has_working() {
        let fallback: Vec<&Exercise> = pool
            .big
            .iter()
            .chain(pool.little.iter())
            .copied()
            .filter(|e| !day.is_used(e))
            .take(TOP_UP_COUNT)
            .collect();

        if fallback.is_empty() {
            warn!(
                day = day_number,
                template = template.label,
                "No working exercises available for day"
            );
        } else {
            info!(
                day = day_number,
                template = template.label,
                added = fallback.len(),
                "Template slots empty, topping up day from remaining pool"
            );
        }

        for exercise in fallback {
            day.push(exercise, SlotRole::Working, template.intensity, template.reps);
        }
    }

    if let Some(cooldown) = pool.cooldown.first() {
        day.push(cooldown, SlotRole::Cooldown, COOLDOWN_INTENSITY, None);
    }

    let exercises = day.entries;
    let name = suggest_routine_name(exercises.iter().map(|e| &e.exercise));

    Routine {
        name,
        day_number,
        focus: template.label.to_string(),
        is_volume_variant: false,
        source_day: None,
        exercises,
    }
}

/// Reversed copy of a base day with every non-warmup intensity lowered
fn volume_variant(base: &Routine, day_number: u8) -> Routine {
    let exercises = base
        .exercises
        .iter()
        .rev()
        .map(|entry| {
            let mut entry = entry.clone();
            if entry.role != SlotRole::Warmup {
                entry.intensity = volume_intensity(entry.intensity);
            }
            entry
        })
        .collect();

    Routine {
        name: format!("{} (Volume)", base.name),
        day_number,
        focus: base.focus.clone(),
        is_volume_variant: true,
        source_day: Some(base.day_number),
        exercises,
    }
}

pub fn volume_intensity(original: u8) -> u8 {
    original
        .saturating_sub(VOLUME_INTENSITY_DROP)
        .max(MIN_VOLUME_INTENSITY)
}

// ---------------------------------------------------------------------------
/// Public API
// ---------------------------------------------------------------------------

/// Generate `frequency` routines from an exercise pool.
///
/// An empty pool yields no routines; an out-of-range frequency is an error.
pub fn generate_routines(pool: &[Exercise], frequency: u8) -> Result<Vec<Routine>, GeneratorError> {
    if !(MIN_FREQUENCY..=MAX_FREQUENCY).contains(&frequency) {
        return Err(GeneratorError::InvalidFrequency(frequency));
    }
    if pool.is_empty() {
        debug!("Empty exercise pool, nothing to generate");
        return Ok(vec![]);
    }

    let categorized = CategorizedPool::from_pool(pool);

    let base: Vec<Routine> = templates_for(frequency)
        .into_iter()
        .enumerate()
        .map(|(idx, template)| build_day(template, &categorized, idx as u8 + 1))
        .collect();

    let mut routines = base.clone();
    let mut cycle = 0;
    while routines.len() < frequency as usize {
        let source = &base[cycle % base.len()];
        let day_number = routines.len() as u8 + 1;
        routines.push(volume_variant(source, day_number));
        cycle += 1;
    }

    info!(
        frequency,
        pool_size = pool.len(),
        base_days = base.len(),
        "Generated routines"
    );

    Ok(routines)
}

/// Name a set of exercises after the muscles they train.
///
/// Warmup and cooldown exercises are ignored. Known muscle combinations get
/// their fixed name; anything else joins the first two simplified muscles.
pub fn suggest_routine_name<'a, I>(exercises: I) -> String
where
    I: IntoIterator<Item = &'a Exercise>,
{
    let mut muscles: Vec<String> = Vec::new();
    for exercise in exercises {
        if matches!(
            categorize_exercise(exercise),
            ExerciseCategory::Warmup | ExerciseCategory::Cooldown
        ) {
            continue;
        }
        for muscle in &exercise.primary_muscles {
            let simplified = simplify_muscle(muscle);
            if !muscles.contains(&simplified) {
                muscles.push(simplified);
            }
        }
    }

    if let Some(name) = combination_name(&muscles) {
        return name.to_string();
    }

    match muscles.as_slice() {
        [] => "Full Body".to_string(),
        [only] => only.clone(),
        [first, second, ..] => format!("{} & {}", first, second),
    }
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_exercise_pool;

    fn minimal_pool() -> Vec<Exercise> {
        vec![
            Exercise::new("Barbell Row", "strength").with_primary("Back").compound(),
            Exercise::new("Hammer Curl", "strength").with_primary("Biceps"),
            Exercise::new("Back Squat", "strength").with_primary("Quadriceps").compound(),
            Exercise::new("Overhead Press", "strength").with_primary("Shoulders").compound(),
        ]
    }

    #[test]
    fn test_frequency_bounds() {
        let pool = sample_exercise_pool();
        assert_eq!(
            generate_routines(&pool, 1),
            Err(GeneratorError::InvalidFrequency(1))
        );
        assert_eq!(
            generate_routines(&pool, 8),
            Err(GeneratorError::InvalidFrequency(8))
        );
        // Frequency is validated before the pool is looked at
        assert!(generate_routines(&[], 0).is_err());
    }

    #[test]
    fn test_returns_exactly_frequency_routines() {
        let pool = sample_exercise_pool();
        for frequency in MIN_FREQUENCY..=MAX_FREQUENCY {
            let routines = generate_routines(&pool, frequency).unwrap();
            assert_eq!(routines.len(), frequency as usize, "frequency {}", frequency);
            for (idx, routine) in routines.iter().enumerate() {
                assert_eq!(routine.day_number as usize, idx + 1);
                assert!(!routine.exercises.is_empty());
            }
        }
    }

    #[test]
    fn test_empty_pool_returns_no_routines() {
        assert_eq!(generate_routines(&[], 3), Ok(vec![]));
    }

    #[test]
    fn test_two_day_split_names() {
        let routines = generate_routines(&minimal_pool(), 2).unwrap();

        assert_eq!(routines.len(), 2);
        assert_eq!(routines[0].name, "Back & Biceps");
        assert_eq!(routines[0].focus, "Upper Body");
        assert_eq!(routines[1].name, "Legs");
        assert_eq!(routines[1].focus, "Lower Body");
    }

    #[test]
    fn test_three_day_split_follows_templates() {
        let routines = generate_routines(&sample_exercise_pool(), 3).unwrap();

        let focuses: Vec<&str> = routines.iter().map(|r| r.focus.as_str()).collect();
        assert_eq!(focuses, vec!["Back & Biceps", "Chest & Triceps", "Legs & Shoulders"]);
        assert_eq!(routines[0].name, "Back & Biceps");
        assert_eq!(routines[1].name, "Chest & Triceps");
        assert_eq!(routines[2].name, "Legs & Shoulders");
    }

    #[test]
    fn test_slot_order_and_intensities() {
        let routines = generate_routines(&sample_exercise_pool(), 4).unwrap();
        let day = &routines[0];

        let first = day.exercises.first().unwrap();
        let last = day.exercises.last().unwrap();
        assert_eq!(first.role, SlotRole::Warmup);
        assert_eq!(first.intensity, WARMUP_INTENSITY);
        assert_eq!(last.role, SlotRole::Cooldown);
        assert_eq!(last.intensity, COOLDOWN_INTENSITY);
        assert!(day.working_exercises().all(|e| e.intensity == DEFAULT_DAY_INTENSITY));

        let power = &routines[3];
        assert_eq!(power.focus, "Upper Power");
        assert!(power.working_exercises().all(|e| e.intensity == 85));
        assert!(power
            .working_exercises()
            .all(|e| e.reps.as_deref() == Some("4-6")));
    }

    #[test]
    fn test_compound_exercises_come_first() {
        let pool = vec![
            Exercise::new("Cable Pullover", "strength").with_primary("Lats"),
            Exercise::new("Deadlift", "compound strength").with_primary("Back"),
            Exercise::new("Curl", "strength").with_primary("Biceps"),
        ];

        let routines = generate_routines(&pool, 3).unwrap();
        let names: Vec<&str> = routines[0]
            .working_exercises()
            .map(|e| e.exercise.name.as_str())
            .collect();

        assert_eq!(names, vec!["Deadlift", "Cable Pullover", "Curl"]);
    }

    #[test]
    fn test_no_exercise_repeats_within_a_day() {
        let routines = generate_routines(&sample_exercise_pool(), 7).unwrap();
        for routine in &routines {
            let mut names: Vec<&str> = routine
                .exercises
                .iter()
                .map(|e| e.exercise.name.as_str())
                .collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "{} repeats an exercise", routine.name);
        }
    }

    #[test]
    fn test_volume_variants_reverse_and_deload() {
        let routines = generate_routines(&sample_exercise_pool(), 7).unwrap();

        // 4 base days, then volume copies of days 1, 2 and 3
        for (variant_idx, source_idx) in [(4, 0), (5, 1), (6, 2)] {
            let variant = &routines[variant_idx];
            let source = &routines[source_idx];

            assert!(variant.is_volume_variant);
            assert_eq!(variant.source_day, Some(source.day_number));
            assert_eq!(variant.name, format!("{} (Volume)", source.name));
            assert_eq!(variant.exercises.len(), source.exercises.len());

            for (v, o) in variant.exercises.iter().zip(source.exercises.iter().rev()) {
                assert_eq!(v.exercise, o.exercise);
                assert_eq!(v.role, o.role);
                if o.role == SlotRole::Warmup {
                    assert_eq!(v.intensity, o.intensity);
                } else {
                    assert_eq!(v.intensity, (o.intensity.saturating_sub(10)).max(40));
                }
            }
        }
    }

    #[test]
    fn test_volume_intensity_floor() {
        assert_eq!(volume_intensity(80), 70);
        assert_eq!(volume_intensity(45), 40);
        assert_eq!(volume_intensity(30), 40);
    }

    #[test]
    fn test_day_topped_up_when_slots_miss() {
        // Nothing matches the Chest & Triceps slots, so day 2 borrows from the pool
        let pool = vec![
            Exercise::new("Row", "strength").with_primary("Back"),
            Exercise::new("Curl", "strength").with_primary("Biceps"),
        ];

        let routines = generate_routines(&pool, 3).unwrap();

        assert!(routines[1].working_exercises().count() > 0);
    }

    #[test]
    fn test_warmup_only_pool_keeps_days() {
        let pool = vec![Exercise::new("Jumping Jacks", "cardio").with_primary("Full Body")];

        let routines = generate_routines(&pool, 2).unwrap();

        assert_eq!(routines.len(), 2);
        for routine in &routines {
            assert_eq!(routine.exercises.len(), 1);
            assert_eq!(routine.exercises[0].role, SlotRole::Warmup);
            assert_eq!(routine.name, "Full Body");
        }
    }

    #[test]
    fn test_suggest_routine_name() {
        let chest = Exercise::new("Bench", "strength").with_primary("Pectorals");
        let triceps = Exercise::new("Pushdown", "strength").with_primary("Triceps");
        let calves = Exercise::new("Calf Raise", "strength").with_primary("Calves");
        let biceps = Exercise::new("Curl", "strength").with_primary("Biceps");
        let warmup = Exercise::new("Rower", "warmup").with_primary("Back");

        assert_eq!(suggest_routine_name(&[chest.clone(), triceps.clone()]), "Chest & Triceps");
        assert_eq!(suggest_routine_name(&[triceps.clone(), biceps]), "Arms");
        assert_eq!(suggest_routine_name(&[calves.clone(), chest.clone()]), "Legs & Chest");
        assert_eq!(suggest_routine_name(&[warmup.clone(), calves]), "Legs");
        assert_eq!(suggest_routine_name(&[warmup]), "Full Body");
        assert_eq!(suggest_routine_name(std::iter::empty::<&Exercise>()), "Full Body");
    }

    #[test]
    fn test_error_serializes_as_message() {
        let json = serde_json::to_string(&GeneratorError::InvalidFrequency(9)).unwrap();
        assert_eq!(json, "\"Frequency must be between 2 and 7 days per week, got 9\"");
    }
}
