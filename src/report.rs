//! Heatmap and export formatting for engagement results

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::engagement::EngagementResult;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
  #[error("Unknown export format: {0}")]
  UnknownFormat(String),

  #[error("CSV export failed: {0}")]
  Csv(#[from] csv::Error),

  #[error("JSON export failed: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Export produced invalid UTF-8")]
  Encoding,
}

impl Serialize for ReportError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Heatmap
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityLevel {
  High,
  Medium,
  Low,
}

impl IntensityLevel {
  pub fn from_intensity(intensity: f64) -> Self {
    match intensity {
      i if i >= 0.7 => IntensityLevel::High,
      i if i >= 0.4 => IntensityLevel::Medium,
      _ => IntensityLevel::Low,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapEntry {
  pub muscle_name: String,
  /// score / max score, in [0, 1]
  pub intensity: f64,
  pub intensity_level: IntensityLevel,
  pub score: f64,
  pub percentage: f64,
  pub rank: usize,
}

/// Normalize every muscle against the top score. Empty when nothing scored.
pub fn generate_heatmap_data(result: &EngagementResult) -> Vec<HeatmapEntry> {
  let max_score = result.max_score();
  if max_score <= 0.0 {
    return vec![];
  }

  result
    .sorted_muscles
    .iter()
    .map(|m| {
      let intensity = (m.score / max_score).clamp(0.0, 1.0);
      HeatmapEntry {
        muscle_name: m.muscle.clone(),
        intensity,
        intensity_level: IntensityLevel::from_intensity(intensity),
        score: m.score,
        percentage: m.percentage,
        rank: m.rank,
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Export
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
  Json,
  Csv,
  Summary,
}

impl std::fmt::Display for ExportFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Json => write!(f, "json"),
      Self::Csv => write!(f, "csv"),
      Self::Summary => write!(f, "summary"),
    }
  }
}

impl std::str::FromStr for ExportFormat {
  type Err = ReportError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "json" => Ok(Self::Json),
      "csv" => Ok(Self::Csv),
      "summary" | "text" => Ok(Self::Summary),
      _ => Err(ReportError::UnknownFormat(s.to_string())),
    }
  }
}

pub fn export_program_analytics(
  result: &EngagementResult,
  format: ExportFormat,
) -> Result<String, ReportError> {
  match format {
    ExportFormat::Json => Ok(serde_json::to_string_pretty(result)?),
    ExportFormat::Csv => export_csv(result),
    ExportFormat::Summary => Ok(export_summary(result)),
  }
}

fn export_csv(result: &EngagementResult) -> Result<String, ReportError> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record([
    "Rank",
    "Muscle",
    "Score",
    "Percentage",
    "Primary Hits",
    "Secondary Hits",
    "Tertiary Hits",
    "Status",
    "Exercises",
  ])?;

  for muscle in &result.sorted_muscles {
    let detail = result.muscle_details.get(&muscle.muscle);
    let hits = |f: fn(&crate::engagement::MuscleDetail) -> u32| {
      detail.map(f).unwrap_or(0).to_string()
    };
    let status = result
      .status_of(&muscle.muscle)
      .and_then(|s| serde_json::to_value(s).ok())
      .and_then(|v| v.as_str().map(str::to_string))
      .unwrap_or_default();

    writer.write_record([
      muscle.rank.to_string(),
      muscle.muscle.clone(),
      format!("{:.1}", muscle.score),
      format!("{:.1}", muscle.percentage),
      hits(|d| d.primary_hits),
      hits(|d| d.secondary_hits),
      hits(|d| d.tertiary_hits),
      status,
      detail.map(|d| d.exercises.join("; ")).unwrap_or_default(),
    ])?;
  }

  let bytes = writer
    .into_inner()
    .map_err(|e| ReportError::Csv(e.into_error().into()))?;
  String::from_utf8(bytes).map_err(|_| ReportError::Encoding)
}

fn export_summary(result: &EngagementResult) -> String {
  if let Some(error) = &result.error {
    return format!("Program analysis unavailable: {}\n", error);
  }
  if !result.has_scores() {
    return "No exercise data available for analysis.\n".to_string();
  }

  let stats = &result.program_stats;
  let balance = &result.balance;
  let mut out = String::new();

  let _ = writeln!(out, "Program Analytics Summary");
  let _ = writeln!(out, "=========================");
  let _ = writeln!(
    out,
    "Exercises: {} | Sets: {} | Total points: {:.1} | Muscles engaged: {}",
    stats.total_exercises, stats.total_sets, stats.total_points, stats.unique_muscles
  );

  if let (Some(overall), Some(ratio)) = (balance.overall, balance.min_max_ratio) {
    let _ = writeln!(out, "Overall balance: {} (min/max ratio {:.2})", overall.as_str(), ratio);
  }

  let _ = writeln!(out);
  let _ = writeln!(out, "Top muscles:");
  for muscle in result.sorted_muscles.iter().take(5) {
    let _ = writeln!(
      out,
      "  {}. {} - {:.1} pts ({:.1}%)",
      muscle.rank, muscle.muscle, muscle.score, muscle.percentage
    );
  }

  let groups = [
    ("Overworked", &balance.overworked),
    ("Underworked", &balance.underworked),
    ("Neglected", &balance.neglected),
  ];
  for (label, muscles) in groups {
    if !muscles.is_empty() {
      let _ = writeln!(out, "{}: {}", label, muscles.join(", "));
    }
  }

  let push_pull = &balance.push_pull;
  match push_pull.ratio {
    Some(ratio) => {
      let _ = writeln!(
        out,
        "Push/pull ratio: {:.2} ({})",
        ratio,
        if push_pull.imbalanced { "imbalanced" } else { "balanced" }
      );
    }
    None if push_pull.push_hits > 0 => {
      let _ = writeln!(out, "Push/pull ratio: no pull work ({} push hits)", push_pull.push_hits);
    }
    None => {}
  }

  if !result.warnings.is_empty() {
    let _ = writeln!(out, "Warnings: {}", result.warnings.len());
  }

  out
}
