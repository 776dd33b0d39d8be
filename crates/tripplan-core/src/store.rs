//! The `TripStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `tripplan-store-sqlite`).
//! The pipeline in [`crate::planner`] and the HTTP layers depend on this
//! abstraction, not on any concrete backend.
//!
//! Every method is one transactional unit: a write that fails partway leaves
//! no row behind. Point lookups return `None` for a missing row; the caller
//! decides whether that is a [`crate::Error::NotFound`].

use std::future::Future;

use crate::{
  Entity, Result,
  reference::{
    Accommodation, Destination, Food, NewAccommodation, NewDestination, NewFood,
    NewTransport, Transport,
  },
  trip::{
    FilteredSuggestion, FinalTrip, NewFilteredSuggestion, NewFinalTrip, NewSuggestion,
    NewTrip, Suggestion, Trip,
  },
  user::{Admin, NewAdmin, NewUser, User},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`TripStore::list_destinations`]. Every text field is a
/// substring match; all supplied fields must hold. Results are in id order.
#[derive(Debug, Clone, Default)]
pub struct DestinationQuery {
  /// Matches when either the city or the country contains it.
  pub text:    Option<String>,
  pub city:    Option<String>,
  pub country: Option<String>,
  pub limit:   Option<usize>,
}

impl DestinationQuery {
  pub fn text(text: impl Into<String>) -> Self {
    Self { text: Some(text.into()), ..Self::default() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational entity store.
///
/// Inserts that carry foreign keys fail with
/// [`crate::Error::IntegrityViolation`] when a referenced row is missing.
/// Deletes cascade to every dependent row. Final trips are append-only.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TripStore: Send + Sync {
  // ── Accounts ──────────────────────────────────────────────────────────

  /// Fails with [`crate::Error::DuplicateUser`] if the email or user name is
  /// already registered.
  fn add_user(&self, input: NewUser) -> impl Future<Output = Result<User>> + Send + '_;

  fn get_user(&self, id: i64) -> impl Future<Output = Result<Option<User>>> + Send + '_;

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>>> + Send + 'a;

  fn add_admin(&self, input: NewAdmin) -> impl Future<Output = Result<Admin>> + Send + '_;

  fn get_admin(&self, id: i64) -> impl Future<Output = Result<Option<Admin>>> + Send + '_;

  // ── Reference data ────────────────────────────────────────────────────

  fn add_destination(
    &self,
    input: NewDestination,
  ) -> impl Future<Output = Result<Destination>> + Send + '_;

  fn get_destination(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Destination>>> + Send + '_;

  fn list_destinations<'a>(
    &'a self,
    query: &'a DestinationQuery,
  ) -> impl Future<Output = Result<Vec<Destination>>> + Send + 'a;

  fn add_food(&self, input: NewFood) -> impl Future<Output = Result<Food>> + Send + '_;

  fn get_food(&self, id: i64) -> impl Future<Output = Result<Option<Food>>> + Send + '_;

  /// All food options, or only those at `destination_id`.
  fn list_food(
    &self,
    destination_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Food>>> + Send + '_;

  fn add_accommodation(
    &self,
    input: NewAccommodation,
  ) -> impl Future<Output = Result<Accommodation>> + Send + '_;

  fn get_accommodation(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Accommodation>>> + Send + '_;

  fn list_accommodations(
    &self,
    destination_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Accommodation>>> + Send + '_;

  fn add_transport(
    &self,
    input: NewTransport,
  ) -> impl Future<Output = Result<Transport>> + Send + '_;

  fn get_transport(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Transport>>> + Send + '_;

  /// All transports, or only those arriving in `dest_city` (exact,
  /// case-insensitive).
  fn list_transports<'a>(
    &'a self,
    dest_city: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Transport>>> + Send + 'a;

  // ── Pipeline stages ───────────────────────────────────────────────────

  fn add_trip(&self, input: NewTrip) -> impl Future<Output = Result<Trip>> + Send + '_;

  fn get_trip(&self, id: i64) -> impl Future<Output = Result<Option<Trip>>> + Send + '_;

  fn add_suggestion(
    &self,
    input: NewSuggestion,
  ) -> impl Future<Output = Result<Suggestion>> + Send + '_;

  fn list_suggestions(
    &self,
    trip_id: i64,
  ) -> impl Future<Output = Result<Vec<Suggestion>>> + Send + '_;

  fn add_filtered_suggestion(
    &self,
    input: NewFilteredSuggestion,
  ) -> impl Future<Output = Result<FilteredSuggestion>> + Send + '_;

  fn get_filtered_suggestion(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<FilteredSuggestion>>> + Send + '_;

  /// Append a booking to the ledger. At most one final trip exists per
  /// filtered suggestion; a second attempt fails with
  /// [`crate::Error::AlreadyFinalized`].
  fn add_final_trip(
    &self,
    input: NewFinalTrip,
  ) -> impl Future<Output = Result<FinalTrip>> + Send + '_;

  fn get_final_trip(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<FinalTrip>>> + Send + '_;

  /// A user's bookings in creation order.
  fn list_final_trips(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Vec<FinalTrip>>> + Send + '_;

  // ── Removal ───────────────────────────────────────────────────────────

  /// Delete a row and, transitively, every row that references it. Returns
  /// `false` if no such row existed.
  ///
  /// Deleting an [`Entity::FinalTrip`] directly fails with
  /// [`crate::Error::Immutable`].
  fn delete(&self, entity: Entity, id: i64) -> impl Future<Output = Result<bool>> + Send + '_;
}
