//! Program engagement scoring
//!
//! Walks a program's routine → exercise graph and turns every muscle hit into
//! weighted points. The result is a ranked score table plus a balance read of
//! the whole program. The scorer never fails: bad input degrades to warnings
//! or to an empty result carrying an `error` string.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::Program;
use crate::normalize::normalize_program;
use crate::taxonomy::{is_pull_muscle, is_push_muscle};

/// ---------------------------------------------------------------------------
/// Options
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementOptions {
  pub primary_weight: f64,
  pub secondary_weight: f64,
  pub tertiary_weight: f64,
  /// Scale each hit by `sets × volume_multiplier`
  pub include_volume: bool,
  pub volume_multiplier: f64,
}

impl Default for EngagementOptions {
  fn default() -> Self {
    Self {
      primary_weight: 3.0,
      secondary_weight: 2.0,
      tertiary_weight: 1.0,
      include_volume: true,
      volume_multiplier: 1.0,
    }
  }
}

impl EngagementOptions {
  /// Clamp negative or non-finite values to zero so no score can go negative
  fn sanitized(&self, warnings: &mut Vec<String>) -> Self {
    let mut clamp = |name: &str, value: f64| {
      if value.is_finite() && value >= 0.0 {
        value
      } else {
        warn!(option = name, value, "Clamping invalid engagement option to 0");
        warnings.push(format!("Option {} = {} is invalid, using 0", name, value));
        0.0
      }
    };

    Self {
      primary_weight: clamp("primary_weight", self.primary_weight),
      secondary_weight: clamp("secondary_weight", self.secondary_weight),
      tertiary_weight: clamp("tertiary_weight", self.tertiary_weight),
      include_volume: self.include_volume,
      volume_multiplier: clamp("volume_multiplier", self.volume_multiplier),
    }
  }

  fn weight(&self, tier: EngagementTier) -> f64 {
    match tier {
      EngagementTier::Primary => self.primary_weight,
      EngagementTier::Secondary => self.secondary_weight,
      EngagementTier::Tertiary => self.tertiary_weight,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementTier {
  Primary,
  Secondary,
  Tertiary,
}

/// ---------------------------------------------------------------------------
/// Result Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MuscleDetail {
  pub score: f64,
  pub primary_hits: u32,
  pub secondary_hits: u32,
  pub tertiary_hits: u32,
  /// Exercises touching this muscle, unique by name, in first-seen order
  pub exercises: Vec<String>,
}

impl MuscleDetail {
  pub fn total_hits(&self) -> u32 {
    self.primary_hits + self.secondary_hits + self.tertiary_hits
  }

  fn record_hit(&mut self, tier: EngagementTier, points: f64, exercise_name: &str) {
    self.score += points;
    match tier {
      EngagementTier::Primary => self.primary_hits += 1,
      EngagementTier::Secondary => self.secondary_hits += 1,
      EngagementTier::Tertiary => self.tertiary_hits += 1,
    }
    if !self.exercises.iter().any(|e| e == exercise_name) {
      self.exercises.push(exercise_name.to_string());
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMuscle {
  pub muscle: String,
  pub score: f64,
  /// 1-based, highest score first
  pub rank: usize,
  /// Share of all program points (0-100)
  pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramStats {
  pub total_exercises: usize,
  pub total_sets: u32,
  pub total_points: f64,
  pub unique_muscles: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleStatus {
  Overworked,
  Balanced,
  Underworked,
  Neglected,
}

impl MuscleStatus {
  /// Classify a score against the program mean
  pub fn from_score(score: f64, mean: f64) -> Self {
    match score {
      s if s > mean * 1.5 => MuscleStatus::Overworked,
      s if s > mean * 0.7 => MuscleStatus::Balanced,
      s if s > mean * 0.3 => MuscleStatus::Underworked,
      _ => MuscleStatus::Neglected,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallBalance {
  Imbalanced,
  ModeratelyImbalanced,
  Balanced,
}

impl OverallBalance {
  pub fn from_ratio(min_max_ratio: f64) -> Self {
    if min_max_ratio < 0.3 {
      OverallBalance::Imbalanced
    } else if min_max_ratio < 0.6 {
      OverallBalance::ModeratelyImbalanced
    } else {
      OverallBalance::Balanced
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      OverallBalance::Imbalanced => "imbalanced",
      OverallBalance::ModeratelyImbalanced => "moderately_imbalanced",
      OverallBalance::Balanced => "balanced",
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushPullAnalysis {
  pub push_hits: u32,
  pub pull_hits: u32,
  /// push / pull; None when there are no pull hits
  pub ratio: Option<f64>,
  pub imbalanced: bool,
}

impl PushPullAnalysis {
  pub fn compute(push_hits: u32, pull_hits: u32) -> Self {
    let ratio = (pull_hits > 0).then(|| push_hits as f64 / pull_hits as f64);
    let imbalanced = match ratio {
      Some(r) => !(0.67..=1.5).contains(&r),
      None => push_hits > 0,
    };

    Self {
      push_hits,
      pull_hits,
      ratio,
      imbalanced,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceAnalysis {
  pub mean_score: f64,
  pub overworked: Vec<String>,
  pub balanced: Vec<String>,
  pub underworked: Vec<String>,
  pub neglected: Vec<String>,
  /// Lowest score / highest score
  pub min_max_ratio: Option<f64>,
  pub overall: Option<OverallBalance>,
  pub push_pull: PushPullAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementResult {
  pub muscle_scores: BTreeMap<String, f64>,
  pub muscle_details: BTreeMap<String, MuscleDetail>,
  pub sorted_muscles: Vec<RankedMuscle>,
  pub program_stats: ProgramStats,
  pub balance: BalanceAnalysis,
  pub warnings: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub error: Option<String>,
  pub calculated_at: DateTime<Utc>,
}

impl EngagementResult {
  /// Well-shaped result with every collection empty
  pub fn empty(error: Option<String>, warnings: Vec<String>) -> Self {
    Self {
      muscle_scores: BTreeMap::new(),
      muscle_details: BTreeMap::new(),
      sorted_muscles: vec![],
      program_stats: ProgramStats::default(),
      balance: BalanceAnalysis::default(),
      warnings,
      error,
      calculated_at: Utc::now(),
    }
  }

  pub fn has_scores(&self) -> bool {
    !self.sorted_muscles.is_empty()
  }

  pub fn max_score(&self) -> f64 {
    self
      .sorted_muscles
      .iter()
      .map(|m| m.score)
      .fold(0.0, f64::max)
  }

  pub fn status_of(&self, muscle: &str) -> Option<MuscleStatus> {
    let score = self.muscle_scores.get(muscle)?;
    Some(MuscleStatus::from_score(*score, self.balance.mean_score))
  }
}

/// ---------------------------------------------------------------------------
/// Scoring
/// ---------------------------------------------------------------------------

/// Score a program given in any accepted upstream shape
pub fn calculate_program_engagement(program: &Value, options: &EngagementOptions) -> EngagementResult {
  match normalize_program(program) {
    Ok((program, warnings)) => {
      let mut result = score_program(&program, options);
      let mut all_warnings = warnings;
      all_warnings.append(&mut result.warnings);
      result.warnings = all_warnings;
      result
    }
    Err(e) => {
      warn!(error = %e, "Program engagement analysis failed");
      EngagementResult::empty(Some(e.to_string()), vec![])
    }
  }
}

/// Score an already-normalized program
pub fn score_program(program: &Program, options: &EngagementOptions) -> EngagementResult {
  let mut warnings = Vec::new();
  let options = options.sanitized(&mut warnings);

  let mut details: BTreeMap<String, MuscleDetail> = BTreeMap::new();
  // Muscle names match case-insensitively; the first spelling seen is kept
  let mut spellings: HashMap<String, String> = HashMap::new();
  let mut stats = ProgramStats::default();

  for routine in &program.routines {
    for entry in &routine.exercises {
      stats.total_exercises += 1;
      stats.total_sets = stats.total_sets.saturating_add(entry.sets);

      let volume_factor = if options.include_volume {
        entry.sets as f64 * options.volume_multiplier
      } else {
        1.0
      };

      let exercise = &entry.exercise;
      let tiers = [
        (EngagementTier::Primary, exercise.primary()),
        (EngagementTier::Secondary, exercise.secondary()),
        (EngagementTier::Tertiary, exercise.tertiary()),
      ];

      // One point source per tier, and a muscle only once per exercise
      let mut claimed: Vec<String> = Vec::with_capacity(3);
      for (tier, muscle) in tiers {
        let Some(muscle) = muscle else { continue };
        let key = muscle.to_lowercase();
        if claimed.contains(&key) {
          debug!(exercise = %exercise.name, muscle, "Muscle already counted for exercise");
          continue;
        }
        let canonical = spellings
          .entry(key.clone())
          .or_insert_with(|| muscle.to_string())
          .clone();
        claimed.push(key);

        let points = options.weight(tier) * volume_factor;
        details
          .entry(canonical)
          .or_default()
          .record_hit(tier, points, &exercise.name);
      }
    }
  }

  let muscle_scores: BTreeMap<String, f64> =
    details.iter().map(|(name, d)| (name.clone(), d.score)).collect();

  stats.total_points = muscle_scores.values().sum();
  stats.unique_muscles = muscle_scores.len();

  let sorted_muscles = rank_muscles(&muscle_scores, stats.total_points);
  let balance = analyze_balance(&sorted_muscles, &details, stats.total_points);

  EngagementResult {
    muscle_scores,
    muscle_details: details,
    sorted_muscles,
    program_stats: stats,
    balance,
    warnings,
    error: None,
    calculated_at: Utc::now(),
  }
}

fn rank_muscles(scores: &BTreeMap<String, f64>, total_points: f64) -> Vec<RankedMuscle> {
  let mut entries: Vec<(&String, f64)> = scores.iter().map(|(k, v)| (k, *v)).collect();
  // BTreeMap order breaks ties by name; the sort is stable
  entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

  entries
    .into_iter()
    .enumerate()
    .map(|(idx, (muscle, score))| RankedMuscle {
      muscle: muscle.clone(),
      score,
      rank: idx + 1,
      percentage: if total_points > 0.0 {
        score / total_points * 100.0
      } else {
        0.0
      },
    })
    .collect()
}

fn analyze_balance(
  sorted: &[RankedMuscle],
  details: &BTreeMap<String, MuscleDetail>,
  total_points: f64,
) -> BalanceAnalysis {
  if sorted.is_empty() {
    return BalanceAnalysis::default();
  }

  let mean_score = total_points / sorted.len() as f64;
  let mut balance = BalanceAnalysis {
    mean_score,
    ..Default::default()
  };

  for muscle in sorted {
    let bucket = match MuscleStatus::from_score(muscle.score, mean_score) {
      MuscleStatus::Overworked => &mut balance.overworked,
      MuscleStatus::Balanced => &mut balance.balanced,
      MuscleStatus::Underworked => &mut balance.underworked,
      MuscleStatus::Neglected => &mut balance.neglected,
    };
    bucket.push(muscle.muscle.clone());
  }

  let highest = sorted.first().map(|m| m.score).unwrap_or(0.0);
  let lowest = sorted.last().map(|m| m.score).unwrap_or(0.0);
  if highest > 0.0 {
    let ratio = lowest / highest;
    balance.min_max_ratio = Some(ratio);
    balance.overall = Some(OverallBalance::from_ratio(ratio));
  }

  let (push_hits, pull_hits) = details.iter().fold((0, 0), |(push, pull), (name, d)| {
    (
      push + if is_push_muscle(name) { d.total_hits() } else { 0 },
      pull + if is_pull_muscle(name) { d.total_hits() } else { 0 },
    )
  });
  balance.push_pull = PushPullAnalysis::compute(push_hits, pull_hits);

  balance
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
