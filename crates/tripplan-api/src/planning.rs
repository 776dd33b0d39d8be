//! Handlers for `/planning` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/planning/create-trip` | Body: [`TripRequest`]; returns 201 |
//! | `GET`  | `/planning/suggestions/:user_id` | Up to five random candidates |
//! | `POST` | `/planning/filter` | Body: [`FilterBody`]; empty results are 200 |
//! | `POST` | `/planning/shortlist` | Body: [`ShortlistRequest`]; returns 201 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tripplan_core::{
  candidate::Candidate,
  planner::{AppliedFilters, FilterCriteria, Planner, ShortlistRequest, TripRequest},
  store::TripStore,
};

use crate::error::ApiError;

// ─── Create trip ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreatedTrip {
  pub message:     &'static str,
  pub trip_id:     i64,
  pub destination: Place,
}

#[derive(Debug, Serialize)]
pub struct Place {
  pub city:    String,
  pub country: String,
}

/// `POST /planning/create-trip`
pub async fn create_trip<S: TripStore>(
  State(planner): State<Arc<Planner<S>>>,
  Json(body): Json<TripRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let planned = planner.create_trip(body).await?;
  let created = CreatedTrip {
    message:     "Trip created successfully",
    trip_id:     planned.trip.trip_id,
    destination: Place {
      city:    planned.destination.city,
      country: planned.destination.country,
    },
  };
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Suggestions ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SuggestionList {
  pub suggestions: Vec<Candidate>,
  pub message:     String,
}

/// `GET /planning/suggestions/:user_id`
pub async fn suggestions<S: TripStore>(
  State(planner): State<Arc<Planner<S>>>,
  Path(user_id): Path<i64>,
) -> Result<Json<SuggestionList>, ApiError> {
  let found = planner.suggest(user_id).await?;
  let message = found.message();
  Ok(Json(SuggestionList { suggestions: found.into_candidates(), message }))
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /planning/filter`.
#[derive(Debug, Deserialize)]
pub struct FilterBody {
  pub user_id:  i64,
  #[serde(flatten)]
  pub criteria: FilterCriteria,
}

#[derive(Debug, Serialize)]
pub struct FilterResults {
  pub message:         String,
  pub filters_applied: AppliedFilters,
  pub destinations:    Vec<Candidate>,
}

/// `POST /planning/filter`: an empty `destinations` list is still a 200.
pub async fn filter<S: TripStore>(
  State(planner): State<Arc<Planner<S>>>,
  Json(body): Json<FilterBody>,
) -> Result<Json<FilterResults>, ApiError> {
  let outcome = planner.filter(body.user_id, &body.criteria).await?;
  Ok(Json(FilterResults {
    message:         outcome.message(),
    filters_applied: outcome.applied,
    destinations:    outcome.matches,
  }))
}

// ─── Shortlist ───────────────────────────────────────────────────────────────

/// `POST /planning/shortlist`: returns 201 + the stored
/// [`FilteredSuggestion`](tripplan_core::trip::FilteredSuggestion).
pub async fn shortlist<S: TripStore>(
  State(planner): State<Arc<Planner<S>>>,
  Json(body): Json<ShortlistRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let shortlisted = planner.shortlist(body).await?;
  Ok((StatusCode::CREATED, Json(shortlisted)))
}
