//! Handler for `GET /trips/:user_id`: a traveller's confirmed bookings.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use serde::Serialize;
use tripplan_core::{
  planner::{BookedTrip, Planner},
  store::TripStore,
};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct TripHistory {
  pub trips: Vec<TripSummary>,
}

/// One row of the "My Trips" listing.
#[derive(Debug, Serialize)]
pub struct TripSummary {
  pub trip_id:     i64,
  /// `"City, Country"`.
  pub destination: String,
  pub totalbudget: f64,
  #[serde(rename = "startDate")]
  pub start_date:  NaiveDate,
  #[serde(rename = "endDate")]
  pub end_date:    NaiveDate,
}

impl From<BookedTrip> for TripSummary {
  fn from(b: BookedTrip) -> Self {
    TripSummary {
      destination: b.destination_label(),
      trip_id:     b.trip.final_trip_id,
      totalbudget: b.trip.total_budget,
      start_date:  b.trip.start_date,
      end_date:    b.trip.end_date,
    }
  }
}

/// `GET /trips/:user_id`: unknown users have an empty history.
pub async fn history<S: TripStore>(
  State(planner): State<Arc<Planner<S>>>,
  Path(user_id): Path<i64>,
) -> Result<Json<TripHistory>, ApiError> {
  let booked = planner.trip_history(user_id).await?;
  Ok(Json(TripHistory { trips: booked.into_iter().map(TripSummary::from).collect() }))
}
