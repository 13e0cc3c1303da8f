//! Exercise catalog client for the hosted backend
//!
//! Read-only: exercises come from the `exercises_with_muscles` view and
//! programs from the `programs` table with their routines embedded. Responses
//! are normalized at this boundary, so callers only ever see `Exercise`.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{AppConfig, ConfigError};
use crate::models::Exercise;
use crate::normalize::normalize_exercises;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const REST_PREFIX: &str = "rest/v1/";
const EXERCISES_VIEW: &str = "exercises_with_muscles";
const PROGRAMS_TABLE: &str = "programs";
const PROGRAM_SELECT: &str = "id,name,program_routines(week_number,day_number,routine:routines(id,name,routine_exercises(sets,reps,exercise:exercises_with_muscles(*))))";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("Invalid backend URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("HTTP request failed: {0}")]
  Request(String),

  #[error("Backend rejected the API key")]
  Unauthorized,

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("API error ({status}): {body}")]
  Api { status: u16, body: String },

  #[error("Failed to parse response: {0}")]
  Parse(String),
}

impl From<reqwest::Error> for CatalogError {
  fn from(e: reqwest::Error) -> Self {
    CatalogError::Request(e.to_string())
  }
}

impl Serialize for CatalogError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Client
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CatalogConfig {
  pub base_url: Url,
  pub anon_key: String,
}

impl CatalogConfig {
  pub fn new(base_url: &str, anon_key: &str) -> Result<Self, CatalogError> {
    let mut base_url = Url::parse(base_url)?;
    // Url::join drops the last segment unless the path ends in '/'
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }

    Ok(Self {
      base_url,
      anon_key: anon_key.to_string(),
    })
  }
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
  http: Client,
  config: CatalogConfig,
}

impl CatalogClient {
  pub fn new(config: CatalogConfig) -> Self {
    Self {
      http: Client::new(),
      config,
    }
  }

  pub fn from_app_config(config: &AppConfig) -> Result<Self, CatalogError> {
    let base_url = config.require_backend_url()?;
    let anon_key = config.require_anon_key()?;

    Ok(Self::new(CatalogConfig::new(base_url, anon_key)?))
  }

  fn endpoint(&self, resource: &str) -> Result<Url, CatalogError> {
    Ok(self.config.base_url.join(REST_PREFIX)?.join(resource)?)
  }

  async fn get_json(&self, url: Url) -> Result<Value, CatalogError> {
    debug!(url = %url, "Catalog request");

    let response = self
      .http
      .get(url)
      .header("apikey", &self.config.anon_key)
      .header("Authorization", format!("Bearer {}", self.config.anon_key))
      .header("Accept", "application/json")
      .send()
      .await?;

    match response.status() {
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(CatalogError::Unauthorized),
      StatusCode::NOT_FOUND => {
        return Err(CatalogError::NotFound(response.url().path().to_string()))
      }
      status if !status.is_success() => {
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::Api {
          status: status.as_u16(),
          body,
        });
      }
      _ => {}
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
      warn!(error = %e, "Unparseable catalog response");
      CatalogError::Parse(e.to_string())
    })
  }

  /// Fetch and normalize the full exercise catalog.
  /// Rows that are not objects are dropped and reported as warnings.
  pub async fn fetch_exercises(&self) -> Result<(Vec<Exercise>, Vec<String>), CatalogError> {
    let mut url = self.endpoint(EXERCISES_VIEW)?;
    url.query_pairs_mut().append_pair("select", "*");

    let body = self.get_json(url).await?;
    let rows = body
      .as_array()
      .ok_or_else(|| CatalogError::Parse("expected an array of exercises".to_string()))?;

    let (exercises, warnings) = normalize_exercises(rows);
    info!(
      fetched = rows.len(),
      kept = exercises.len(),
      "Fetched exercise catalog"
    );

    Ok((exercises, warnings))
  }

  /// Fetch one program with its routines embedded, in the backend's raw shape
  pub async fn fetch_program(&self, program_id: &str) -> Result<Value, CatalogError> {
    let mut url = self.endpoint(PROGRAMS_TABLE)?;
    url
      .query_pairs_mut()
      .append_pair("id", &format!("eq.{}", program_id))
      .append_pair("select", PROGRAM_SELECT);

    let body = self.get_json(url).await?;
    match body {
      Value::Array(mut rows) if !rows.is_empty() => Ok(rows.swap_remove(0)),
      Value::Array(_) => Err(CatalogError::NotFound(format!("program {}", program_id))),
      other @ Value::Object(_) => Ok(other),
      _ => Err(CatalogError::Parse("expected a program object".to_string())),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Exercise Cache
/// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CachedExercises {
  exercises: Vec<Exercise>,
  fetched_at: Instant,
}

/// TTL cache for the exercise catalog.
///
/// Concurrent misses may each fetch; the last writer wins.
#[derive(Debug)]
pub struct ExerciseCache {
  ttl: Duration,
  entry: RwLock<Option<CachedExercises>>,
}

impl ExerciseCache {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      entry: RwLock::new(None),
    }
  }

  /// Cached catalog, if present and younger than the TTL
  pub async fn get(&self) -> Option<Vec<Exercise>> {
    let guard = self.entry.read().await;
    guard
      .as_ref()
      .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
      .map(|cached| cached.exercises.clone())
  }

  pub async fn put(&self, exercises: Vec<Exercise>) {
    let mut guard = self.entry.write().await;
    *guard = Some(CachedExercises {
      exercises,
      fetched_at: Instant::now(),
    });
  }

  pub async fn invalidate(&self) {
    self.entry.write().await.take();
  }

  pub async fn get_or_fetch(&self, client: &CatalogClient) -> Result<Vec<Exercise>, CatalogError> {
    if let Some(exercises) = self.get().await {
      debug!(count = exercises.len(), "Exercise cache hit");
      return Ok(exercises);
    }

    debug!("Exercise cache miss");
    let (exercises, warnings) = client.fetch_exercises().await?;
    for warning in &warnings {
      warn!(warning = %warning, "Skipped catalog row");
    }

    self.put(exercises.clone()).await;
    Ok(exercises)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
