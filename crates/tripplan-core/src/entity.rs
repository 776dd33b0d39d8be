//! The table-level identity of every persisted entity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Names one of the persisted entity kinds. Used in error reporting and for
/// the generic cascade delete in [`crate::store::TripStore::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
  User,
  Admin,
  Destination,
  Food,
  Accommodation,
  Transport,
  Trip,
  Suggestion,
  FilteredSuggestion,
  FinalTrip,
}

impl Entity {
  /// Table name in the relational schema.
  pub fn table(self) -> &'static str {
    match self {
      Self::User => "users",
      Self::Admin => "admins",
      Self::Destination => "destinations",
      Self::Food => "food",
      Self::Accommodation => "accommodations",
      Self::Transport => "transports",
      Self::Trip => "trips",
      Self::Suggestion => "suggestions",
      Self::FilteredSuggestion => "filtered_suggestions",
      Self::FinalTrip => "final_trips",
    }
  }

  /// Primary-key column of [`Self::table`].
  pub fn id_column(self) -> &'static str {
    match self {
      Self::User => "user_id",
      Self::Admin => "admin_id",
      Self::Destination => "destination_id",
      Self::Food => "food_id",
      Self::Accommodation => "accommodation_id",
      Self::Transport => "transport_id",
      Self::Trip => "trip_id",
      Self::Suggestion => "suggestion_id",
      Self::FilteredSuggestion => "filtered_suggestion_id",
      Self::FinalTrip => "final_trip_id",
    }
  }
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::User => "user",
      Self::Admin => "admin",
      Self::Destination => "destination",
      Self::Food => "food",
      Self::Accommodation => "accommodation",
      Self::Transport => "transport",
      Self::Trip => "trip",
      Self::Suggestion => "suggestion",
      Self::FilteredSuggestion => "filtered suggestion",
      Self::FinalTrip => "final trip",
    };
    f.write_str(name)
  }
}
