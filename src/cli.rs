//! `workout-builder` command line
//!
//! Usage:
//! ```bash
//! # Pull the exercise catalog from the backend into the local store
//! workout-builder sync-catalog
//!
//! # Or seed it from a CSV export
//! workout-builder import-csv exercises.csv
//!
//! # Generate a 4-day plan and keep it
//! workout-builder generate --frequency 4 --save
//! workout-builder routines
//!
//! # Score the saved plan, a backend program, or a JSON file
//! workout-builder analyze --saved --format summary
//! workout-builder analyze --program-id 42 --format csv
//! workout-builder heatmap --file program.json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::commands::{catalog, engagement, routines};
use crate::config::AppConfig;
use crate::db::{initialize_db, AppState};
use crate::engagement::{EngagementOptions, EngagementResult};
use crate::logging::init_logging;

#[derive(Parser)]
#[command(
  name = "workout-builder",
  version,
  about = "Program engagement analytics and routine generation"
)]
pub struct Cli {
  /// Database URL override
  #[arg(long, global = true)]
  database_url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Fetch the exercise catalog from the backend into the local store
  SyncCatalog,

  /// Import exercises from a seed CSV
  ImportCsv {
    path: PathBuf,
  },

  /// Generate a weekly plan from the local exercise pool
  Generate {
    /// Training days per week (2-7)
    #[arg(long, short = 'f')]
    frequency: u8,

    /// Replace the saved plan with the generated one
    #[arg(long)]
    save: bool,
  },

  /// Print the saved plan
  Routines,

  /// Score a program's muscle engagement
  Analyze {
    #[command(flatten)]
    source: ProgramSource,

    #[command(flatten)]
    scoring: ScoringArgs,

    /// json, csv or summary
    #[arg(long, default_value = "summary")]
    format: String,

    /// Keep the result in the engagement history
    #[arg(long)]
    save: bool,
  },

  /// Print heatmap intensities for a program as JSON
  Heatmap {
    #[command(flatten)]
    source: ProgramSource,

    #[command(flatten)]
    scoring: ScoringArgs,
  },

  /// Show the most recent saved engagement result
  Latest,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ProgramSource {
  /// Program ID on the backend
  #[arg(long)]
  program_id: Option<String>,

  /// Program JSON file
  #[arg(long)]
  file: Option<PathBuf>,

  /// The locally saved plan
  #[arg(long)]
  saved: bool,
}

#[derive(Args)]
struct ScoringArgs {
  #[arg(long, default_value_t = 3.0)]
  primary_weight: f64,

  #[arg(long, default_value_t = 2.0)]
  secondary_weight: f64,

  #[arg(long, default_value_t = 1.0)]
  tertiary_weight: f64,

  /// Count each hit once instead of once per set
  #[arg(long)]
  ignore_volume: bool,

  #[arg(long, default_value_t = 1.0)]
  volume_multiplier: f64,
}

impl ScoringArgs {
  fn options(&self) -> EngagementOptions {
    EngagementOptions {
      primary_weight: self.primary_weight,
      secondary_weight: self.secondary_weight,
      tertiary_weight: self.tertiary_weight,
      include_volume: !self.ignore_volume,
      volume_multiplier: self.volume_multiplier,
    }
  }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
  serde_json::to_string_pretty(value).map_err(|e| format!("Failed to encode output: {}", e))
}

async fn analyze_source(
  state: &AppState,
  source: &ProgramSource,
  options: &EngagementOptions,
  save: bool,
) -> Result<EngagementResult, String> {
  if let Some(program_id) = &source.program_id {
    return engagement::analyze_remote_program(state, program_id, options, save).await;
  }
  if let Some(path) = &source.file {
    let raw = tokio::fs::read_to_string(path)
      .await
      .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let program: serde_json::Value = serde_json::from_str(&raw)
      .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    return engagement::analyze_program_json(state, &program, options, save).await;
  }
  engagement::analyze_saved_routines(state, options, save).await
}

async fn execute(cli: Cli, config: AppConfig) -> Result<String, String> {
  let database_url = cli
    .database_url
    .clone()
    .unwrap_or_else(|| config.database_url.clone());
  let db = initialize_db(&database_url)
    .await
    .map_err(|e| format!("Failed to initialize database: {}", e))?;
  let state = AppState::new(db, config);

  match cli.command {
    Command::SyncCatalog => to_json(&catalog::sync_catalog(&state).await?),
    Command::ImportCsv { path } => to_json(&catalog::import_catalog_csv(&state, &path).await?),
    Command::Generate { frequency, save } => {
      to_json(&routines::generate_weekly_plan(&state, frequency, save).await?)
    }
    Command::Routines => to_json(&routines::get_saved_routines(&state).await?),
    Command::Analyze {
      source,
      scoring,
      format,
      save,
    } => {
      let result = analyze_source(&state, &source, &scoring.options(), save).await?;
      engagement::export_analytics(&result, &format)
    }
    Command::Heatmap { source, scoring } => {
      let result = analyze_source(&state, &source, &scoring.options(), false).await?;
      to_json(&engagement::get_heatmap(&result))
    }
    Command::Latest => match engagement::get_latest_engagement(&state).await? {
      Some(snapshot) => to_json(&snapshot),
      None => Ok("No saved engagement results.".to_string()),
    },
  }
}

/// Entry point for the binary. Returns the process exit code.
pub async fn run() -> i32 {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let cli = Cli::parse();
  let config = match AppConfig::from_env() {
    Ok(config) => config,
    Err(e) => {
      eprintln!("Configuration error: {}", e);
      return 2;
    }
  };
  init_logging(&config.log_level);
  info!(version = env!("CARGO_PKG_VERSION"), "workout-builder starting");

  match execute(cli, config).await {
    Ok(output) => {
      println!("{}", output.trim_end());
      0
    }
    Err(e) => {
      eprintln!("Error: {}", e);
      1
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::CommandFactory;

  #[test]
  fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_analyze_requires_exactly_one_source() {
    assert!(Cli::try_parse_from(["workout-builder", "analyze"]).is_err());
    assert!(Cli::try_parse_from([
      "workout-builder",
      "analyze",
      "--saved",
      "--program-id",
      "1"
    ])
    .is_err());

    let cli = Cli::try_parse_from(["workout-builder", "analyze", "--saved", "--format", "csv"]).unwrap();
    match cli.command {
      Command::Analyze { source, format, .. } => {
        assert!(source.saved);
        assert_eq!(format, "csv");
      }
      _ => panic!("expected analyze"),
    }
  }

  #[test]
  fn test_scoring_args_map_to_options() {
    let cli = Cli::try_parse_from([
      "workout-builder",
      "heatmap",
      "--file",
      "program.json",
      "--ignore-volume",
      "--primary-weight",
      "4",
    ])
    .unwrap();

    match cli.command {
      Command::Heatmap { scoring, .. } => {
        let options = scoring.options();
        assert_eq!(options.primary_weight, 4.0);
        assert_eq!(options.secondary_weight, 2.0);
        assert!(!options.include_volume);
      }
      _ => panic!("expected heatmap"),
    }
  }

  #[tokio::test]
  async fn test_execute_generate_against_file_db() {
    let path = std::env::temp_dir().join(format!("workout-builder-cli-{}.db", std::process::id()));
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let config = AppConfig {
      database_url: url,
      backend_url: None,
      backend_anon_key: None,
      cache_ttl: std::time::Duration::from_secs(300),
      log_level: "info".to_string(),
    };

    let cli = Cli::try_parse_from(["workout-builder", "generate", "--frequency", "3"]).unwrap();
    let err = execute(cli, config).await.unwrap_err();
    assert!(err.contains("No exercises available"));

    let _ = std::fs::remove_file(&path);
  }

  #[tokio::test]
  async fn test_execute_routines_lists_saved_plan() {
    let path = std::env::temp_dir().join(format!("workout-builder-routines-{}.db", std::process::id()));
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let config = AppConfig {
      database_url: url,
      backend_url: None,
      backend_anon_key: None,
      cache_ttl: std::time::Duration::from_secs(300),
      log_level: "info".to_string(),
    };

    let cli = Cli::try_parse_from(["workout-builder", "routines"]).unwrap();
    let output = execute(cli, config).await.unwrap();
    assert_eq!(output, "[]");

    let _ = std::fs::remove_file(&path);
  }
}
