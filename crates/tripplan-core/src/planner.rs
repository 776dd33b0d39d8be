//! The booking pipeline: plan a trip, browse candidates, shortlist one, book
//! it, pay for it.
//!
//! [`Planner`] is stateless between calls apart from the store handle and the
//! entropy source. Each operation borrows the store for its own duration.

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  Entity, Error, Result,
  candidate::{Candidate, Entropy, SystemEntropy},
  reference::Destination,
  store::{DestinationQuery, TripStore},
  trip::{FilteredSuggestion, FinalTrip, NewFilteredSuggestion, NewFinalTrip, NewTrip, Trip},
};

/// Upper bound on candidates returned by [`Planner::suggest`].
pub const SUGGESTION_COUNT: usize = 5;

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`Planner::create_trip`].
#[derive(Debug, Clone, Deserialize)]
pub struct TripRequest {
  pub user_id:             i64,
  pub max_budget:          f64,
  pub start_date:          NaiveDate,
  pub end_date:            NaiveDate,
  /// Substring of the preferred city, if any.
  pub destination_city:    Option<String>,
  /// Substring of the preferred country, if any.
  pub destination_country: Option<String>,
}

/// Input to [`Planner::filter`]. Absent or blank fields are not applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterCriteria {
  /// Maximum candidate cost.
  pub budget:      Option<f64>,
  /// Substring of the destination city or country.
  pub destination: Option<String>,
  /// Category name, compared case-insensitively.
  pub category:    Option<String>,
}

impl FilterCriteria {
  fn normalized(&self) -> AppliedFilters {
    AppliedFilters {
      budget:      self.budget,
      destination: non_blank(self.destination.as_deref()),
      category:    non_blank(self.category.as_deref()),
    }
  }
}

/// Input to [`Planner::shortlist`].
#[derive(Debug, Clone, Deserialize)]
pub struct ShortlistRequest {
  pub trip_id:        i64,
  pub destination_id: i64,
  pub total_budget:   f64,
  /// Defaults to the total spread evenly over the trip's days.
  pub daily_budget:   Option<f64>,
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// A freshly created trip with its resolved destination.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedTrip {
  pub trip:        Trip,
  pub destination: Destination,
}

/// Result of [`Planner::suggest`].
#[derive(Debug, Clone)]
pub enum Suggestions {
  Found(Vec<Candidate>),
  /// The store holds no destinations at all. Not an error.
  NoDestinations,
}

impl Suggestions {
  pub fn candidates(&self) -> &[Candidate] {
    match self {
      Self::Found(c) => c,
      Self::NoDestinations => &[],
    }
  }

  pub fn into_candidates(self) -> Vec<Candidate> {
    match self {
      Self::Found(c) => c,
      Self::NoDestinations => Vec::new(),
    }
  }

  pub fn message(&self) -> String {
    match self {
      Self::Found(c) => format!("Showing {} random suggestions.", c.len()),
      Self::NoDestinations => "No destinations exist in the database.".to_owned(),
    }
  }
}

/// The filters that were actually applied by [`Planner::filter`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppliedFilters {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub budget:      Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub destination: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category:    Option<String>,
}

impl AppliedFilters {
  fn admits(&self, candidate: &Candidate) -> bool {
    if let Some(budget) = self.budget
      && candidate.cost > budget
    {
      return false;
    }
    if let Some(category) = &self.category
      && !candidate.category.matches(category)
    {
      return false;
    }
    true
  }
}

/// Result of [`Planner::filter`]. An empty `matches` list is a normal outcome;
/// callers should offer to retry with different filters.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
  pub applied: AppliedFilters,
  /// In destination id order.
  pub matches: Vec<Candidate>,
}

impl FilterOutcome {
  pub fn is_empty(&self) -> bool { self.matches.is_empty() }

  pub fn message(&self) -> String {
    if self.matches.is_empty() {
      "No destinations match the applied filters.".to_owned()
    } else {
      format!("Found {} destinations matching your criteria.", self.matches.len())
    }
  }
}

/// Acknowledgement returned by [`Planner::checkout`]. Nothing is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
  pub final_trip_id: i64,
  pub traveller:     String,
  pub city:          String,
  pub country:       String,
  pub amount:        f64,
  pub message:       String,
}

/// A booking with its destination resolved, for trip history.
#[derive(Debug, Clone, Serialize)]
pub struct BookedTrip {
  pub trip:        FinalTrip,
  pub destination: Destination,
}

impl BookedTrip {
  /// `"City, Country"`.
  pub fn destination_label(&self) -> String {
    format!("{}, {}", self.destination.city, self.destination.country)
  }
}

// ─── Planner ─────────────────────────────────────────────────────────────────

/// Drives the booking pipeline over any [`TripStore`].
pub struct Planner<S> {
  store:   Arc<S>,
  entropy: Arc<dyn Entropy>,
}

impl<S> Clone for Planner<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), entropy: Arc::clone(&self.entropy) }
  }
}

impl<S: TripStore> Planner<S> {
  /// A planner drawing candidate economics from OS-seeded generators.
  pub fn new(store: Arc<S>) -> Self {
    Self { store, entropy: Arc::new(SystemEntropy) }
  }

  /// Replace the entropy source, e.g. with a
  /// [`FixedSeed`](crate::candidate::FixedSeed) in tests.
  pub fn with_entropy(mut self, entropy: impl Entropy + 'static) -> Self {
    self.entropy = Arc::new(entropy);
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Planning ──────────────────────────────────────────────────────────────

  /// Validate and persist a new trip. The destination is the first one
  /// matching the preferred city and country; without a match, the first
  /// destination in the store.
  pub async fn create_trip(&self, request: TripRequest) -> Result<PlannedTrip> {
    if !(request.max_budget.is_finite() && request.max_budget > 0.0) {
      return Err(Error::InvalidInput("max budget must be a positive number".into()));
    }
    if request.end_date < request.start_date {
      return Err(Error::InvalidInput("end date precedes start date".into()));
    }

    let preferred = DestinationQuery {
      city: non_blank(request.destination_city.as_deref()),
      country: non_blank(request.destination_country.as_deref()),
      limit: Some(1),
      ..DestinationQuery::default()
    };

    let mut found = if preferred.city.is_some() || preferred.country.is_some() {
      self.store.list_destinations(&preferred).await?
    } else {
      Vec::new()
    };
    if found.is_empty() {
      let any = DestinationQuery { limit: Some(1), ..DestinationQuery::default() };
      found = self.store.list_destinations(&any).await?;
    }
    let destination = found.into_iter().next().ok_or(Error::NoDestinations)?;

    let trip = self
      .store
      .add_trip(NewTrip {
        user_id:        request.user_id,
        destination_id: destination.destination_id,
        max_budget:     request.max_budget,
        start_date:     request.start_date,
        end_date:       request.end_date,
      })
      .await?;

    info!(
      trip_id = trip.trip_id,
      user_id = trip.user_id,
      destination = %destination.city,
      "trip created"
    );
    Ok(PlannedTrip { trip, destination })
  }

  /// Up to [`SUGGESTION_COUNT`] distinct destinations chosen uniformly at
  /// random, each with freshly simulated economics.
  pub async fn suggest(&self, user_id: i64) -> Result<Suggestions> {
    let pool = self.store.list_destinations(&DestinationQuery::default()).await?;
    if pool.is_empty() {
      debug!(user_id, "no destinations to suggest");
      return Ok(Suggestions::NoDestinations);
    }

    let mut rng = self.entropy.rng();
    let picked: Vec<&Destination> = rand::seq::index::sample(
      &mut rng,
      pool.len(),
      SUGGESTION_COUNT.min(pool.len()),
    )
    .into_iter()
    .map(|i| &pool[i])
    .collect();

    let candidates: Vec<Candidate> =
      picked.into_iter().map(|d| Candidate::simulate(d, &mut rng)).collect();

    debug!(user_id, count = candidates.len(), "suggestions drawn");
    Ok(Suggestions::Found(candidates))
  }

  /// Two-stage filter: a store scan on the destination text, then budget and
  /// category checks against freshly simulated economics.
  pub async fn filter(&self, user_id: i64, criteria: &FilterCriteria) -> Result<FilterOutcome> {
    let applied = criteria.normalized();
    if let Some(budget) = applied.budget
      && budget.is_nan()
    {
      return Err(Error::InvalidInput("budget must be a number".into()));
    }

    let query = match &applied.destination {
      Some(text) => DestinationQuery::text(text.clone()),
      None => DestinationQuery::default(),
    };
    let pool = self.store.list_destinations(&query).await?;

    let mut rng = self.entropy.rng();
    let matches: Vec<Candidate> = pool
      .iter()
      .map(|d| Candidate::simulate(d, &mut rng))
      .filter(|c| applied.admits(c))
      .collect();

    debug!(
      user_id,
      scanned = pool.len(),
      matched = matches.len(),
      "filter applied"
    );
    Ok(FilterOutcome { applied, matches })
  }

  /// Persist a candidate as a bookable filtered suggestion, assembling the
  /// best-rated food and lodging at the destination and the cheapest
  /// transport into its city.
  pub async fn shortlist(&self, request: ShortlistRequest) -> Result<FilteredSuggestion> {
    if !(request.total_budget.is_finite() && request.total_budget > 0.0) {
      return Err(Error::InvalidInput("total budget must be a positive number".into()));
    }
    if let Some(daily) = request.daily_budget
      && !(daily.is_finite() && daily > 0.0)
    {
      return Err(Error::InvalidInput("daily budget must be a positive number".into()));
    }

    let trip = self
      .store
      .get_trip(request.trip_id)
      .await?
      .ok_or_else(|| Error::not_found(Entity::Trip, request.trip_id))?;
    let destination = self
      .store
      .get_destination(request.destination_id)
      .await?
      .ok_or_else(|| Error::not_found(Entity::Destination, request.destination_id))?;

    if request.total_budget > trip.max_budget {
      warn!(trip_id = trip.trip_id, total = request.total_budget, "shortlist over budget");
      return Err(Error::BudgetExceeded {
        total_budget: request.total_budget,
        max_budget:   trip.max_budget,
      });
    }

    let dest_id = destination.destination_id;

    let mut food = self.store.list_food(Some(dest_id)).await?;
    if food.is_empty() {
      food = self.store.list_food(None).await?;
    }
    let food = food
      .into_iter()
      .max_by(|a, b| a.rating.total_cmp(&b.rating).then(b.food_id.cmp(&a.food_id)))
      .ok_or(Error::Unavailable(Entity::Food))?;

    let mut lodging = self.store.list_accommodations(Some(dest_id)).await?;
    if lodging.is_empty() {
      lodging = self.store.list_accommodations(None).await?;
    }
    let accommodation = lodging
      .into_iter()
      .max_by(|a, b| {
        a.rating
          .total_cmp(&b.rating)
          .then(b.accommodation_id.cmp(&a.accommodation_id))
      })
      .ok_or(Error::Unavailable(Entity::Accommodation))?;

    let mut transports = self.store.list_transports(Some(&destination.city)).await?;
    if transports.is_empty() {
      transports = self.store.list_transports(None).await?;
    }
    let transport = transports
      .into_iter()
      .min_by(|a, b| a.cost.total_cmp(&b.cost).then(a.transport_id.cmp(&b.transport_id)))
      .ok_or(Error::Unavailable(Entity::Transport))?;

    let daily_budget = request
      .daily_budget
      .unwrap_or(request.total_budget / trip.duration_days() as f64);

    let shortlisted = self
      .store
      .add_filtered_suggestion(NewFilteredSuggestion {
        trip_id: trip.trip_id,
        total_budget: request.total_budget,
        daily_budget,
        food_id: food.food_id,
        transport_id: transport.transport_id,
        destination_id: dest_id,
        accommodation_id: accommodation.accommodation_id,
      })
      .await?;

    info!(
      filtered_suggestion_id = shortlisted.filtered_suggestion_id,
      trip_id = trip.trip_id,
      total = shortlisted.total_budget,
      "candidate shortlisted"
    );
    Ok(shortlisted)
  }

  // ── Booking ───────────────────────────────────────────────────────────────

  /// Promote a filtered suggestion into an immutable final trip owned by
  /// `user_id`. Nothing is written unless both the user and the filtered
  /// suggestion exist and the suggestion has not been booked before.
  pub async fn finalize(&self, user_id: i64, filtered_suggestion_id: i64) -> Result<FinalTrip> {
    let user = self.store.get_user(user_id).await?.ok_or_else(|| {
      warn!(user_id, "finalize: user not found");
      Error::not_found(Entity::User, user_id)
    })?;

    let source = self
      .store
      .get_filtered_suggestion(filtered_suggestion_id)
      .await?
      .ok_or_else(|| {
        warn!(filtered_suggestion_id, "finalize: filtered suggestion not found");
        Error::not_found(Entity::FilteredSuggestion, filtered_suggestion_id)
      })?;

    let trip = self
      .store
      .get_trip(source.trip_id)
      .await?
      .ok_or_else(|| Error::not_found(Entity::Trip, source.trip_id))?;

    let final_trip = self
      .store
      .add_final_trip(NewFinalTrip::promote(user.user_id, &source, &trip))
      .await
      .inspect_err(|e| {
        if let Error::AlreadyFinalized { final_trip_id, .. } = e {
          warn!(filtered_suggestion_id, final_trip_id, "finalize: already booked");
        }
      })?;

    info!(
      final_trip_id = final_trip.final_trip_id,
      user_id,
      total = final_trip.total_budget,
      "trip finalized"
    );
    Ok(final_trip)
  }

  /// Acknowledge payment for a final trip. No gateway is contacted and no
  /// state changes.
  pub async fn checkout(&self, final_trip_id: i64) -> Result<Confirmation> {
    let trip = self.store.get_final_trip(final_trip_id).await?.ok_or_else(|| {
      warn!(final_trip_id, "checkout: final trip not found");
      Error::not_found(Entity::FinalTrip, final_trip_id)
    })?;
    let user = self
      .store
      .get_user(trip.user_id)
      .await?
      .ok_or_else(|| Error::not_found(Entity::User, trip.user_id))?;
    let destination = self
      .store
      .get_destination(trip.destination_id)
      .await?
      .ok_or_else(|| Error::not_found(Entity::Destination, trip.destination_id))?;

    info!(
      final_trip_id,
      traveller = %user.user_name,
      amount = trip.total_budget,
      "payment acknowledged"
    );
    Ok(Confirmation {
      final_trip_id,
      traveller: user.user_name,
      city: destination.city,
      country: destination.country,
      amount: trip.total_budget,
      message: "Payment processed successfully".to_owned(),
    })
  }

  // ── History ───────────────────────────────────────────────────────────────

  /// The user's confirmed bookings with destinations resolved. Unknown users
  /// simply have none.
  pub async fn trip_history(&self, user_id: i64) -> Result<Vec<BookedTrip>> {
    let trips = self.store.list_final_trips(user_id).await?;

    let mut destinations: HashMap<i64, Destination> = HashMap::new();
    let mut booked = Vec::with_capacity(trips.len());
    for trip in trips {
      if !destinations.contains_key(&trip.destination_id) {
        let d = self
          .store
          .get_destination(trip.destination_id)
          .await?
          .ok_or_else(|| Error::not_found(Entity::Destination, trip.destination_id))?;
        destinations.insert(d.destination_id, d);
      }
      let destination = destinations[&trip.destination_id].clone();
      booked.push(BookedTrip { trip, destination });
    }
    Ok(booked)
  }
}

fn non_blank(s: Option<&str>) -> Option<String> {
  s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}
