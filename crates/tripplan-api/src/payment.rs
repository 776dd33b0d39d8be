//! Handler for `POST /payment/checkout/:final_trip_id`.
//!
//! No gateway is contacted. A missing final trip is reported as a failed
//! payment (400) rather than a 404.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use tripplan_core::{
  Error,
  planner::{Confirmation, Planner},
  store::TripStore,
};

use crate::error::ApiError;

/// `POST /payment/checkout/:final_trip_id`
pub async fn checkout<S: TripStore>(
  State(planner): State<Arc<Planner<S>>>,
  Path(final_trip_id): Path<i64>,
) -> Result<Json<Confirmation>, ApiError> {
  match planner.checkout(final_trip_id).await {
    Ok(confirmation) => Ok(Json(confirmation)),
    Err(Error::NotFound { .. }) => Err(ApiError::PaymentFailed),
    Err(e) => Err(e.into()),
  }
}
