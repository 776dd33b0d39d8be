//! tripplan server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `TRIPPLAN_*` environment variables, opens the SQLite store, optionally
//! seeds reference data, and serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tripplan_core::planner::Planner;
use tripplan_server::{AppState, ServerConfig, auth::AuthConfig, seed::ReferenceData};
use tripplan_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Trip planner API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load destinations, food, accommodations and transports from a JSON file
  /// before serving.
  #[arg(long)]
  seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("TRIPPLAN")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("allowed_origins"),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  let auth = AuthConfig::new(&server_cfg.jwt_secret, server_cfg.token_ttl_minutes)
    .context("invalid auth configuration")?;

  // Open SQLite store.
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_call_timeout(Duration::from_millis(server_cfg.store_timeout_ms));

  if let Some(seed_path) = &cli.seed {
    let text = tokio::fs::read_to_string(seed_path)
      .await
      .with_context(|| format!("failed to read seed file {seed_path:?}"))?;
    let data = ReferenceData::from_json(&text)
      .with_context(|| format!("failed to parse seed file {seed_path:?}"))?;
    data.load_into(&store).await.context("failed to seed reference data")?;
  }

  // Build application state.
  let state = AppState {
    planner: Arc::new(Planner::new(Arc::new(store))),
    auth:    Arc::new(auth),
  };

  let app = tripplan_server::router(state, &server_cfg.allowed_origins);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
