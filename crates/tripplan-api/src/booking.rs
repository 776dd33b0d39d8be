//! Handler for `POST /booking/finalize/:user_id/:filtered_suggestion_id`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use tripplan_core::{planner::Planner, store::TripStore};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct Finalized {
  pub message:      &'static str,
  /// The new final trip's id.
  pub trip_id:      i64,
  pub total_budget: f64,
}

/// `POST /booking/finalize/:user_id/:filtered_suggestion_id`
///
/// 404 when the user or filtered suggestion is missing, 409 when the
/// suggestion was already booked.
pub async fn finalize<S: TripStore>(
  State(planner): State<Arc<Planner<S>>>,
  Path((user_id, filtered_suggestion_id)): Path<(i64, i64)>,
) -> Result<Json<Finalized>, ApiError> {
  let booked = planner.finalize(user_id, filtered_suggestion_id).await?;
  Ok(Json(Finalized {
    message:      "Trip finalized successfully",
    trip_id:      booked.final_trip_id,
    total_budget: booked.total_budget,
  }))
}
