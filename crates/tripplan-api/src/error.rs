//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("Payment failed")]
  PaymentFailed,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<tripplan_core::Error> for ApiError {
  fn from(e: tripplan_core::Error) -> Self {
    use tripplan_core::Error as E;
    match e {
      E::NotFound { .. } | E::NoDestinations | E::Unavailable(_) => {
        ApiError::NotFound(e.to_string())
      }
      E::InvalidInput(_) | E::DuplicateUser(_) | E::BudgetExceeded { .. } => {
        ApiError::BadRequest(e.to_string())
      }
      E::AlreadyFinalized { .. } | E::Immutable(_) => ApiError::Conflict(e.to_string()),
      E::IntegrityViolation { .. } => ApiError::Unprocessable(e.to_string()),
      E::Store(inner) => ApiError::Store(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::PaymentFailed => (StatusCode::BAD_REQUEST, self.to_string()),
      ApiError::Store(e) => {
        error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
