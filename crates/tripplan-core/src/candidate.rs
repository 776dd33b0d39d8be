//! Candidates: destinations decorated with simulated economics.
//!
//! Cost, rating and category are not persisted. They are drawn fresh every
//! time a candidate is built, so the same destination can price differently
//! on two reads. Only the destination identity is stable.

use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::reference::Destination;

/// Inclusive bounds for the simulated cost.
pub const COST_RANGE: (f64, f64) = (50.0, 200.0);
/// Inclusive bounds for the simulated rating.
pub const RATING_RANGE: (f64, f64) = (3.5, 5.0);

const IMAGE_PLACEHOLDER: &str = "placeholder_url";

// ─── Category ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
  Beach,
  Mountain,
  City,
  Adventure,
}

impl Category {
  pub const ALL: [Category; 4] =
    [Self::Beach, Self::Mountain, Self::City, Self::Adventure];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Beach => "Beach",
      Self::Mountain => "Mountain",
      Self::City => "City",
      Self::Adventure => "Adventure",
    }
  }

  /// Case-insensitive comparison against a user-supplied category name.
  pub fn matches(self, requested: &str) -> bool {
    self.as_str().eq_ignore_ascii_case(requested.trim())
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Candidate ───────────────────────────────────────────────────────────────

/// A destination as offered to a traveller by the suggestion and filter
/// operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
  /// The destination id.
  pub id:          i64,
  /// Display name; the destination's city.
  pub name:        String,
  pub country:     String,
  pub city:        String,
  pub description: String,
  pub cost:        f64,
  /// One decimal of precision.
  pub rating:      f64,
  pub category:    Category,
  pub image:       String,
}

impl Candidate {
  /// Decorate `destination` with freshly drawn economics.
  pub fn simulate<R: Rng>(destination: &Destination, rng: &mut R) -> Self {
    let cost = rng.gen_range(COST_RANGE.0..=COST_RANGE.1);
    let rating = round_tenths(rng.gen_range(RATING_RANGE.0..=RATING_RANGE.1));
    let category = Category::ALL[rng.gen_range(0..Category::ALL.len())];

    Self {
      id: destination.destination_id,
      name: destination.city.clone(),
      country: destination.country.clone(),
      city: destination.city.clone(),
      description: destination.description.clone(),
      cost,
      rating,
      category,
      image: IMAGE_PLACEHOLDER.to_owned(),
    }
  }
}

fn round_tenths(value: f64) -> f64 { (value * 10.0).round() / 10.0 }

// ─── Entropy ─────────────────────────────────────────────────────────────────

/// Source of the random generator used for one pipeline call.
///
/// Each call gets its own generator, so concurrent calls share no mutable
/// state.
pub trait Entropy: Send + Sync {
  fn rng(&self) -> StdRng;
}

/// Seeds every generator from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEntropy;

impl Entropy for SystemEntropy {
  fn rng(&self) -> StdRng { StdRng::from_entropy() }
}

/// Seeds every generator with the same value; each call replays the same
/// sequence.
#[derive(Debug, Clone, Copy)]
pub struct FixedSeed(pub u64);

impl Entropy for FixedSeed {
  fn rng(&self) -> StdRng { StdRng::seed_from_u64(self.0) }
}
