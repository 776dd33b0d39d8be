//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tripplan_api::ApiError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Invalid email or password")]
  InvalidCredentials,

  #[error("unauthorized")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid configuration: {0}")]
  Config(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("token error: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),

  #[error(transparent)]
  Api(#[from] ApiError),
}

impl From<tripplan_core::Error> for Error {
  fn from(e: tripplan_core::Error) -> Self { Error::Api(e.into()) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Api(e) => e.into_response(),
      Error::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response();
        res.headers_mut().insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        res
      }
      other => {
        let status = match &other {
          Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
          Error::BadRequest(_) => StatusCode::BAD_REQUEST,
          _ => {
            tracing::error!(error = %other, "auth failure");
            StatusCode::INTERNAL_SERVER_ERROR
          }
        };
        (status, Json(json!({ "error": other.to_string() }))).into_response()
      }
    }
  }
}
