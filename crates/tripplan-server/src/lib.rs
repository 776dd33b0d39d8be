//! HTTP server for the trip planner.
//!
//! Composes the planning API from [`tripplan_api`] with accounts, a health
//! check, request tracing and CORS into a single axum [`Router`].

pub mod auth;
pub mod error;
pub mod seed;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  http::{HeaderValue, Method, header},
  routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};
use tracing::warn;
use tripplan_core::{planner::Planner, store::TripStore};

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TRIPPLAN_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  /// HMAC secret for session tokens.
  pub jwt_secret:        String,
  #[serde(default = "default_token_ttl_minutes")]
  pub token_ttl_minutes: i64,
  /// Upper bound on a single store call.
  #[serde(default = "default_store_timeout_ms")]
  pub store_timeout_ms:  u64,
  #[serde(default = "default_allowed_origins")]
  pub allowed_origins:   Vec<String>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/tripplan/tripplan.db") }
fn default_token_ttl_minutes() -> i64 { 30 }
fn default_store_timeout_ms() -> u64 { 5000 }
fn default_allowed_origins() -> Vec<String> { vec!["http://localhost:5173".to_owned()] }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the account handlers.
pub struct AppState<S> {
  pub planner: Arc<Planner<S>>,
  pub auth:    Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { planner: Arc::clone(&self.planner), auth: Arc::clone(&self.auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application [`Router`].
pub fn router<S>(state: AppState<S>, allowed_origins: &[String]) -> Router
where
  S: TripStore + 'static,
{
  let planner = Arc::clone(&state.planner);

  Router::new()
    .route("/", get(health))
    .route("/auth/signup", post(auth::signup::<S>))
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/me", get(auth::me::<S>))
    .with_state(state)
    .merge(tripplan_api::api_router(planner))
    .layer(TraceLayer::new_for_http())
    .layer(cors_layer(allowed_origins))
}

/// `GET /`
async fn health() -> Json<Value> {
  Json(json!({
    "message": "Trip planner API is running",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
  let origins: Vec<HeaderValue> = allowed_origins
    .iter()
    .filter_map(|o| match o.parse() {
      Ok(v) => Some(v),
      Err(_) => {
        warn!(origin = %o, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_methods([Method::GET, Method::POST])
    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

// ─── Integration tests ────────────────────────────────────────────────────────
