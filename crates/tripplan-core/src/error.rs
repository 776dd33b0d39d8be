//! Error types for `tripplan-core`.
//!
//! An empty suggestion or filter pool is not an error; see
//! [`crate::planner::Suggestions`] and [`crate::planner::FilterOutcome`].

use thiserror::Error;

use crate::Entity;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{entity} {id} not found")]
  NotFound { entity: Entity, id: i64 },

  /// A write referenced a row that does not exist. Nothing was written.
  #[error("{entity} references missing {references} {id}")]
  IntegrityViolation {
    entity:     Entity,
    references: Entity,
    id:         i64,
  },

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("user already exists: {0}")]
  DuplicateUser(String),

  #[error(
    "filtered suggestion {filtered_suggestion_id} is already booked as final \
     trip {final_trip_id}"
  )]
  AlreadyFinalized {
    filtered_suggestion_id: i64,
    final_trip_id:          i64,
  },

  #[error("total budget {total_budget} exceeds the trip maximum {max_budget}")]
  BudgetExceeded { total_budget: f64, max_budget: f64 },

  #[error("no destinations exist in the store")]
  NoDestinations,

  /// Reference data needed to assemble a booking is missing entirely.
  #[error("no {0} options are available")]
  Unavailable(Entity),

  #[error("{0} rows are append-only")]
  Immutable(Entity),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(entity: Entity, id: i64) -> Self {
    Self::NotFound { entity, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
