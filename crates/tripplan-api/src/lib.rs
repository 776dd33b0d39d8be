//! JSON REST API for the trip planner.
//!
//! Exposes an axum [`Router`] driving a [`Planner`] over any
//! [`tripplan_core::store::TripStore`]. Accounts, CORS and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(tripplan_api::api_router(planner.clone()))
//! ```

pub mod booking;
pub mod error;
pub mod payment;
pub mod planning;
pub mod trips;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tripplan_core::{planner::Planner, store::TripStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `planner`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(planner: Arc<Planner<S>>) -> Router<()>
where
  S: TripStore + 'static,
{
  Router::new()
    // Planning
    .route("/planning/create-trip", post(planning::create_trip::<S>))
    .route("/planning/suggestions/{user_id}", get(planning::suggestions::<S>))
    .route("/planning/filter", post(planning::filter::<S>))
    .route("/planning/shortlist", post(planning::shortlist::<S>))
    // History
    .route("/trips/{user_id}", get(trips::history::<S>))
    // Booking and payment
    .route(
      "/booking/finalize/{user_id}/{filtered_suggestion_id}",
      post(booking::finalize::<S>),
    )
    .route("/payment/checkout/{final_trip_id}", post(payment::checkout::<S>))
    .with_state(planner)
}

#[cfg(test)]
mod tests;
