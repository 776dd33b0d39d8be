//! The booking pipeline's persisted stages.
//!
//! `Trip` → `Suggestion` / `FilteredSuggestion` → `FinalTrip`. Each stage
//! references the previous one; a `FinalTrip` is an append-only ledger entry
//! and is never updated once written.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Trip ────────────────────────────────────────────────────────────────────

/// A planning request: who is travelling, roughly where, when, and for how
/// much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
  pub trip_id:        i64,
  pub user_id:        i64,
  pub destination_id: i64,
  pub max_budget:     f64,
  pub start_date:     NaiveDate,
  /// Never before `start_date`.
  pub end_date:       NaiveDate,
}

impl Trip {
  /// Length of the trip in days, counting both the start and end date.
  pub fn duration_days(&self) -> i64 {
    (self.end_date - self.start_date).num_days() + 1
  }
}

#[derive(Debug, Clone)]
pub struct NewTrip {
  pub user_id:        i64,
  pub destination_id: i64,
  pub max_budget:     f64,
  pub start_date:     NaiveDate,
  pub end_date:       NaiveDate,
}

// ─── Suggestion ──────────────────────────────────────────────────────────────

/// An unranked candidate package for a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
  pub suggestion_id:    i64,
  pub trip_id:          i64,
  pub daily_budget:     f64,
  pub food_id:          i64,
  pub transport_id:     i64,
  pub destination_id:   i64,
  pub accommodation_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewSuggestion {
  pub trip_id:          i64,
  pub daily_budget:     f64,
  pub food_id:          i64,
  pub transport_id:     i64,
  pub destination_id:   i64,
  pub accommodation_id: i64,
}

// ─── FilteredSuggestion ──────────────────────────────────────────────────────

/// A candidate that survived filtering and may be booked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredSuggestion {
  pub filtered_suggestion_id: i64,
  pub trip_id:                i64,
  pub total_budget:           f64,
  pub daily_budget:           f64,
  pub food_id:                i64,
  pub transport_id:           i64,
  pub destination_id:         i64,
  pub accommodation_id:       i64,
}

#[derive(Debug, Clone)]
pub struct NewFilteredSuggestion {
  pub trip_id:          i64,
  pub total_budget:     f64,
  pub daily_budget:     f64,
  pub food_id:          i64,
  pub transport_id:     i64,
  pub destination_id:   i64,
  pub accommodation_id: i64,
}

// ─── FinalTrip ───────────────────────────────────────────────────────────────

/// A confirmed booking. Every field is copied at creation time and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalTrip {
  pub final_trip_id:          i64,
  /// The filtered suggestion this booking was promoted from.
  pub filtered_suggestion_id: i64,
  pub user_id:                i64,
  pub destination_id:         i64,
  pub transport_id:           i64,
  pub accommodation_id:       i64,
  pub food_id:                i64,
  pub total_budget:           f64,
  pub start_date:             NaiveDate,
  pub end_date:               NaiveDate,
}

/// Input to [`crate::store::TripStore::add_final_trip`].
#[derive(Debug, Clone)]
pub struct NewFinalTrip {
  pub filtered_suggestion_id: i64,
  pub user_id:                i64,
  pub destination_id:         i64,
  pub transport_id:           i64,
  pub accommodation_id:       i64,
  pub food_id:                i64,
  pub total_budget:           f64,
  pub start_date:             NaiveDate,
  pub end_date:               NaiveDate,
}

impl NewFinalTrip {
  /// Copy the bookable attributes forward: references and total budget from
  /// the filtered suggestion, dates from its owning trip.
  pub fn promote(user_id: i64, source: &FilteredSuggestion, trip: &Trip) -> Self {
    Self {
      filtered_suggestion_id: source.filtered_suggestion_id,
      user_id,
      destination_id: source.destination_id,
      transport_id: source.transport_id,
      accommodation_id: source.accommodation_id,
      food_id: source.food_id,
      total_budget: source.total_budget,
      start_date: trip.start_date,
      end_date: trip.end_date,
    }
  }
}
