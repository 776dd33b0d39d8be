//! Reference-data seeding from a JSON file.
//!
//! ```json
//! {
//!   "destinations": [
//!     {
//!       "city": "Paris", "country": "France", "description": "...",
//!       "food": [{ "name": "Le Comptoir", "location": "Odéon", "rating": 4.5 }],
//!       "accommodations": [{ "name": "Hotel du Nord", "kind": "hotel", "rating": 4.0 }]
//!     }
//!   ],
//!   "transports": [
//!     {
//!       "origin_city": "Lyon", "origin_country": "France",
//!       "dest_city": "Paris", "dest_country": "France",
//!       "kind": "train", "cost": 65.0, "departs_at": "07:45:00"
//!     }
//!   ]
//! }
//! ```

use serde::Deserialize;
use tracing::info;
use tripplan_core::{
  reference::{AccommodationKind, NewAccommodation, NewDestination, NewFood, NewTransport},
  store::TripStore,
};

#[derive(Debug, Default, Deserialize)]
pub struct ReferenceData {
  #[serde(default)]
  pub destinations: Vec<SeedDestination>,
  #[serde(default)]
  pub transports:   Vec<NewTransport>,
}

#[derive(Debug, Deserialize)]
pub struct SeedDestination {
  #[serde(flatten)]
  pub destination:    NewDestination,
  #[serde(default)]
  pub food:           Vec<SeedFood>,
  #[serde(default)]
  pub accommodations: Vec<SeedAccommodation>,
}

#[derive(Debug, Deserialize)]
pub struct SeedFood {
  pub name:     String,
  pub location: String,
  pub rating:   f64,
}

#[derive(Debug, Deserialize)]
pub struct SeedAccommodation {
  pub name:   String,
  pub kind:   AccommodationKind,
  pub rating: f64,
}

/// Row counts written by [`ReferenceData::load_into`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
  pub destinations:   usize,
  pub food:           usize,
  pub accommodations: usize,
  pub transports:     usize,
}

impl ReferenceData {
  pub fn from_json(text: &str) -> serde_json::Result<Self> { serde_json::from_str(text) }

  /// Insert everything into `store`. Stops at the first failed insert; rows
  /// written before it remain.
  pub async fn load_into<S: TripStore>(self, store: &S) -> tripplan_core::Result<SeedReport> {
    let mut report = SeedReport::default();

    for seed in self.destinations {
      let destination = store.add_destination(seed.destination).await?;
      report.destinations += 1;

      for f in seed.food {
        store
          .add_food(NewFood {
            destination_id: destination.destination_id,
            name:           f.name,
            location:       f.location,
            rating:         f.rating,
          })
          .await?;
        report.food += 1;
      }
      for a in seed.accommodations {
        store
          .add_accommodation(NewAccommodation {
            destination_id: destination.destination_id,
            name:           a.name,
            kind:           a.kind,
            rating:         a.rating,
          })
          .await?;
        report.accommodations += 1;
      }
    }

    for t in self.transports {
      store.add_transport(t).await?;
      report.transports += 1;
    }

    info!(
      destinations = report.destinations,
      food = report.food,
      accommodations = report.accommodations,
      transports = report.transports,
      "reference data seeded"
    );
    Ok(report)
  }
}
