//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`, times as `HH:MM:SS`, enumerations as
//! small integer codes. Ids, money and ratings map to SQLite integers and
//! reals directly.

use chrono::{NaiveDate, NaiveTime};
use tripplan_core::{
  reference::{AccommodationKind, Transport, TransportKind},
  trip::{FinalTrip, Trip},
};

use crate::{Error, Result};

// ─── NaiveDate / NaiveTime ───────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_time(t: NaiveTime) -> String { t.format(TIME_FORMAT).to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── AccommodationKind ───────────────────────────────────────────────────────

pub fn encode_accommodation_kind(k: AccommodationKind) -> i64 {
  match k {
    AccommodationKind::Hotel => 1,
    AccommodationKind::Hostel => 2,
    AccommodationKind::Apartment => 3,
    AccommodationKind::Resort => 4,
    AccommodationKind::BedAndBreakfast => 5,
  }
}

pub fn decode_accommodation_kind(code: i64) -> Result<AccommodationKind> {
  match code {
    1 => Ok(AccommodationKind::Hotel),
    2 => Ok(AccommodationKind::Hostel),
    3 => Ok(AccommodationKind::Apartment),
    4 => Ok(AccommodationKind::Resort),
    5 => Ok(AccommodationKind::BedAndBreakfast),
    code => Err(Error::UnknownCode { kind: "accommodation kind", code }),
  }
}

// ─── TransportKind ───────────────────────────────────────────────────────────

pub fn encode_transport_kind(k: TransportKind) -> i64 {
  match k {
    TransportKind::Flight => 1,
    TransportKind::Train => 2,
    TransportKind::Bus => 3,
    TransportKind::Car => 4,
    TransportKind::Ferry => 5,
  }
}

pub fn decode_transport_kind(code: i64) -> Result<TransportKind> {
  match code {
    1 => Ok(TransportKind::Flight),
    2 => Ok(TransportKind::Train),
    3 => Ok(TransportKind::Bus),
    4 => Ok(TransportKind::Car),
    5 => Ok(TransportKind::Ferry),
    code => Err(Error::UnknownCode { kind: "transport kind", code }),
  }
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// `%text%` with LIKE wildcards in `text` escaped by `\`. Pair with
/// `ESCAPE '\'` in the SQL.
pub fn contains_pattern(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 2);
  out.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `trips` row with its dates still encoded.
pub struct RawTrip {
  pub trip_id:        i64,
  pub user_id:        i64,
  pub destination_id: i64,
  pub max_budget:     f64,
  pub start_date:     String,
  pub end_date:       String,
}

impl RawTrip {
  pub const COLUMNS: &'static str =
    "trip_id, user_id, destination_id, max_budget, start_date, end_date";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      trip_id:        row.get(0)?,
      user_id:        row.get(1)?,
      destination_id: row.get(2)?,
      max_budget:     row.get(3)?,
      start_date:     row.get(4)?,
      end_date:       row.get(5)?,
    })
  }

  pub fn into_trip(self) -> Result<Trip> {
    Ok(Trip {
      trip_id:        self.trip_id,
      user_id:        self.user_id,
      destination_id: self.destination_id,
      max_budget:     self.max_budget,
      start_date:     decode_date(&self.start_date)?,
      end_date:       decode_date(&self.end_date)?,
    })
  }
}

/// A `final_trips` row with its dates still encoded.
pub struct RawFinalTrip {
  pub final_trip_id:          i64,
  pub filtered_suggestion_id: i64,
  pub user_id:                i64,
  pub destination_id:         i64,
  pub transport_id:           i64,
  pub accommodation_id:       i64,
  pub food_id:                i64,
  pub total_budget:           f64,
  pub start_date:             String,
  pub end_date:               String,
}

impl RawFinalTrip {
  pub const COLUMNS: &'static str = "final_trip_id, filtered_suggestion_id, user_id, \
     destination_id, transport_id, accommodation_id, food_id, total_budget, start_date, \
     end_date";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      final_trip_id:          row.get(0)?,
      filtered_suggestion_id: row.get(1)?,
      user_id:                row.get(2)?,
      destination_id:         row.get(3)?,
      transport_id:           row.get(4)?,
      accommodation_id:       row.get(5)?,
      food_id:                row.get(6)?,
      total_budget:           row.get(7)?,
      start_date:             row.get(8)?,
      end_date:               row.get(9)?,
    })
  }

  pub fn into_final_trip(self) -> Result<FinalTrip> {
    Ok(FinalTrip {
      final_trip_id:          self.final_trip_id,
      filtered_suggestion_id: self.filtered_suggestion_id,
      user_id:                self.user_id,
      destination_id:         self.destination_id,
      transport_id:           self.transport_id,
      accommodation_id:       self.accommodation_id,
      food_id:                self.food_id,
      total_budget:           self.total_budget,
      start_date:             decode_date(&self.start_date)?,
      end_date:               decode_date(&self.end_date)?,
    })
  }
}

/// A `transports` row with its kind and departure time still encoded.
pub struct RawTransport {
  pub transport_id:   i64,
  pub origin_city:    String,
  pub origin_country: String,
  pub dest_city:      String,
  pub dest_country:   String,
  pub kind:           i64,
  pub cost:           f64,
  pub departs_at:     String,
}

impl RawTransport {
  pub const COLUMNS: &'static str = "transport_id, origin_city, origin_country, dest_city, \
     dest_country, kind, cost, departs_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      transport_id:   row.get(0)?,
      origin_city:    row.get(1)?,
      origin_country: row.get(2)?,
      dest_city:      row.get(3)?,
      dest_country:   row.get(4)?,
      kind:           row.get(5)?,
      cost:           row.get(6)?,
      departs_at:     row.get(7)?,
    })
  }

  pub fn into_transport(self) -> Result<Transport> {
    Ok(Transport {
      transport_id:   self.transport_id,
      origin_city:    self.origin_city,
      origin_country: self.origin_country,
      dest_city:      self.dest_city,
      dest_country:   self.dest_country,
      kind:           decode_transport_kind(self.kind)?,
      cost:           self.cost,
      departs_at:     decode_time(&self.departs_at)?,
    })
  }
}
