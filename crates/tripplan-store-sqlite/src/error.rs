//! Error type for `tripplan-store-sqlite`.
//!
//! These are backend failures only. Domain outcomes (missing rows, dangling
//! references, duplicates) are reported as [`tripplan_core::Error`] directly.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("store call exceeded {0:?}")]
  Timeout(Duration),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {kind} code: {code}")]
  UnknownCode { kind: &'static str, code: i64 },
}

impl From<Error> for tripplan_core::Error {
  fn from(e: Error) -> Self { tripplan_core::Error::Store(Box::new(e)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
