//! Tracing subscriber setup for the CLI

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber. `RUST_LOG` wins over the configured level.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging(level: &str) {
  let filter = std::env::var("RUST_LOG")
    .map_or_else(|_| EnvFilter::new(level), EnvFilter::new)
    .add_directive(
      "sqlx::query=warn"
        .parse()
        .unwrap_or_else(|_| tracing::Level::WARN.into()),
    )
    .add_directive(
      "reqwest=warn"
        .parse()
        .unwrap_or_else(|_| tracing::Level::WARN.into()),
    );

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}
