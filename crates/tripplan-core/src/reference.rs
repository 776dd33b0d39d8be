//! Reference data: destinations and the food, lodging and transport options
//! attached to them.
//!
//! Seeded externally and read-only to the booking pipeline.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ─── Destination ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
  pub destination_id: i64,
  pub city:           String,
  pub country:        String,
  pub description:    String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDestination {
  pub city:        String,
  pub country:     String,
  #[serde(default)]
  pub description: String,
}

// ─── Food ────────────────────────────────────────────────────────────────────

/// A restaurant or food option at a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
  pub food_id:        i64,
  pub destination_id: i64,
  pub name:           String,
  pub location:       String,
  pub rating:         f64,
}

#[derive(Debug, Clone)]
pub struct NewFood {
  pub destination_id: i64,
  pub name:           String,
  pub location:       String,
  pub rating:         f64,
}

// ─── Accommodation ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccommodationKind {
  Hotel,
  Hostel,
  Apartment,
  Resort,
  BedAndBreakfast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accommodation {
  pub accommodation_id: i64,
  pub destination_id:   i64,
  pub name:             String,
  pub kind:             AccommodationKind,
  pub rating:           f64,
}

#[derive(Debug, Clone)]
pub struct NewAccommodation {
  pub destination_id: i64,
  pub name:           String,
  pub kind:           AccommodationKind,
  pub rating:         f64,
}

// ─── Transport ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
  Flight,
  Train,
  Bus,
  Car,
  Ferry,
}

/// A scheduled connection between two cities. Not tied to a destination row;
/// matched against destinations by city name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
  pub transport_id:   i64,
  pub origin_city:    String,
  pub origin_country: String,
  pub dest_city:      String,
  pub dest_country:   String,
  pub kind:           TransportKind,
  pub cost:           f64,
  pub departs_at:     NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransport {
  pub origin_city:    String,
  pub origin_country: String,
  pub dest_city:      String,
  pub dest_country:   String,
  pub kind:           TransportKind,
  pub cost:           f64,
  pub departs_at:     NaiveTime,
}
