//! [`SqliteStore`]: the SQLite implementation of [`TripStore`].

use std::{
  path::Path,
  time::{Duration, Instant},
};

use rusqlite::{OptionalExtension as _, params, params_from_iter, types::Value};
use tracing::debug;

use tripplan_core::{
  Entity, Error as CoreError, Result as CoreResult,
  reference::{
    Accommodation, Destination, Food, NewAccommodation, NewDestination, NewFood,
    NewTransport, Transport,
  },
  store::{DestinationQuery, TripStore},
  trip::{
    FilteredSuggestion, FinalTrip, NewFilteredSuggestion, NewFinalTrip, NewSuggestion,
    NewTrip, Suggestion, Trip,
  },
  user::{Admin, NewAdmin, NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawFinalTrip, RawTransport, RawTrip, contains_pattern, decode_accommodation_kind,
    encode_accommodation_kind, encode_date, encode_time, encode_transport_kind,
  },
  schema::SCHEMA,
};

/// Upper bound on a single store call, including time spent queued behind
/// other calls on the connection.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// VM instructions between deadline checks while a statement runs.
const PROGRESS_OPS: std::ffi::c_int = 1000;

type RowMapper<T> = fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A trip planner entity store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:         tokio_rusqlite::Connection,
  call_timeout: Duration,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, call_timeout: DEFAULT_CALL_TIMEOUT };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, call_timeout: DEFAULT_CALL_TIMEOUT };
    store.init_schema().await?;
    Ok(store)
  }

  /// Bound every store call by `timeout` instead of [`DEFAULT_CALL_TIMEOUT`].
  pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
    self.call_timeout = timeout;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    let busy = self.call_timeout;
    self
      .call(move |conn| {
        conn.busy_timeout(busy)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
  }

  /// Run `f` against the connection on the database thread. The connection
  /// is borrowed for the closure only.
  ///
  /// The deadline is enforced on the database thread: a call still queued
  /// when it expires never runs, and a running statement is interrupted so
  /// its transaction rolls back. [`Error::Timeout`] therefore means nothing
  /// was written.
  pub(crate) async fn call<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let limit = self.call_timeout;
    let deadline = Instant::now() + limit;
    self
      .conn
      .call(move |conn| {
        if Instant::now() >= deadline {
          return Ok(Err(Error::Timeout(limit)));
        }
        conn.progress_handler(PROGRESS_OPS, Some(move || Instant::now() >= deadline));
        let result = f(conn);
        conn.progress_handler(PROGRESS_OPS, None::<fn() -> bool>);
        match result {
          Ok(value) => Ok(Ok(value)),
          Err(e) if interrupted(&e) => Ok(Err(Error::Timeout(limit))),
          Err(e) => Err(e),
        }
      })
      .await?
  }

  async fn query_opt<T: Send + 'static>(
    &self,
    sql: String,
    args: Vec<Value>,
    map: RowMapper<T>,
  ) -> Result<Option<T>> {
    self
      .call(move |conn| Ok(conn.query_row(&sql, params_from_iter(args), map).optional()?))
      .await
  }

  async fn query_all<T: Send + 'static>(
    &self,
    sql: String,
    args: Vec<Value>,
    map: RowMapper<T>,
  ) -> Result<Vec<T>> {
    self
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(args), map)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  /// Insert one row after checking, in the same transaction, that every row
  /// in `refs` exists. Returns the new row id.
  async fn insert_checked(
    &self,
    entity: Entity,
    refs: Vec<(Entity, i64)>,
    sql: &'static str,
    args: Vec<Value>,
  ) -> CoreResult<i64> {
    let id = self
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(violation) = first_dangling(&tx, entity, &refs)? {
          return Ok(Err(violation));
        }
        tx.execute(sql, params_from_iter(args))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await??;
    Ok(id)
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn row_exists(conn: &rusqlite::Connection, entity: Entity, id: i64) -> rusqlite::Result<bool> {
  let sql = format!("SELECT 1 FROM {} WHERE {} = ?1", entity.table(), entity.id_column());
  Ok(conn.query_row(&sql, [id], |_| Ok(())).optional()?.is_some())
}

/// The first reference in `refs` that does not resolve, as an integrity
/// violation on `entity`.
fn first_dangling(
  conn: &rusqlite::Connection,
  entity: Entity,
  refs: &[(Entity, i64)],
) -> rusqlite::Result<Option<CoreError>> {
  for &(references, id) in refs {
    if !row_exists(conn, references, id)? {
      return Ok(Some(CoreError::IntegrityViolation { entity, references, id }));
    }
  }
  Ok(None)
}

const USER_COLUMNS: &str = "user_id, user_name, password_hash, email, city, country";

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    user_id:       row.get(0)?,
    user_name:     row.get(1)?,
    password_hash: row.get(2)?,
    email:         row.get(3)?,
    city:          row.get(4)?,
    country:       row.get(5)?,
  })
}

fn admin_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Admin> {
  Ok(Admin {
    admin_id:      row.get(0)?,
    username:      row.get(1)?,
    password_hash: row.get(2)?,
    access_level:  row.get(3)?,
  })
}

const DESTINATION_COLUMNS: &str = "destination_id, city, country, description";

fn destination_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Destination> {
  Ok(Destination {
    destination_id: row.get(0)?,
    city:           row.get(1)?,
    country:        row.get(2)?,
    description:    row.get(3)?,
  })
}

const FOOD_COLUMNS: &str = "food_id, destination_id, name, location, rating";

fn food_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Food> {
  Ok(Food {
    food_id:        row.get(0)?,
    destination_id: row.get(1)?,
    name:           row.get(2)?,
    location:       row.get(3)?,
    rating:         row.get(4)?,
  })
}

const ACCOMMODATION_COLUMNS: &str = "accommodation_id, destination_id, name, kind, rating";

/// An `accommodations` row with its kind still encoded.
type RawAccommodation = (i64, i64, String, i64, f64);

fn raw_accommodation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAccommodation> {
  Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode_accommodation(raw: RawAccommodation) -> Result<Accommodation> {
  let (accommodation_id, destination_id, name, kind, rating) = raw;
  Ok(Accommodation {
    accommodation_id,
    destination_id,
    name,
    kind: decode_accommodation_kind(kind)?,
    rating,
  })
}

const SUGGESTION_COLUMNS: &str =
  "suggestion_id, trip_id, daily_budget, food_id, transport_id, destination_id, accommodation_id";

fn suggestion_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Suggestion> {
  Ok(Suggestion {
    suggestion_id:    row.get(0)?,
    trip_id:          row.get(1)?,
    daily_budget:     row.get(2)?,
    food_id:          row.get(3)?,
    transport_id:     row.get(4)?,
    destination_id:   row.get(5)?,
    accommodation_id: row.get(6)?,
  })
}

const FILTERED_COLUMNS: &str = "filtered_suggestion_id, trip_id, total_budget, daily_budget, \
   food_id, transport_id, destination_id, accommodation_id";

fn filtered_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FilteredSuggestion> {
  Ok(FilteredSuggestion {
    filtered_suggestion_id: row.get(0)?,
    trip_id:                row.get(1)?,
    total_budget:           row.get(2)?,
    daily_budget:           row.get(3)?,
    food_id:                row.get(4)?,
    transport_id:           row.get(5)?,
    destination_id:         row.get(6)?,
    accommodation_id:       row.get(7)?,
  })
}

fn interrupted(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, _))
      if code.code == rusqlite::ErrorCode::OperationInterrupted
  )
}

fn positive(value: f64, what: &str) -> CoreResult<()> {
  if value.is_finite() && value > 0.0 {
    Ok(())
  } else {
    Err(CoreError::InvalidInput(format!("{what} must be a positive number")))
  }
}

// ─── TripStore impl ──────────────────────────────────────────────────────────

impl TripStore for SqliteStore {
  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> CoreResult<User> {
    let row = input.clone();
    let user_id = self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let clash: Option<bool> = tx
          .query_row(
            "SELECT email = ?1 FROM users WHERE email = ?1 OR user_name = ?2
             ORDER BY email = ?1 DESC LIMIT 1",
            params![row.email, row.user_name],
            |r| r.get(0),
          )
          .optional()?;
        if let Some(email_taken) = clash {
          return Ok(Err(if email_taken { row.email } else { row.user_name }));
        }
        tx.execute(
          "INSERT INTO users (user_name, password_hash, email, city, country)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![row.user_name, row.password_hash, row.email, row.city, row.country],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await?
      .map_err(CoreError::DuplicateUser)?;

    Ok(User {
      user_id,
      user_name: input.user_name,
      password_hash: input.password_hash,
      email: input.email,
      city: input.city,
      country: input.country,
    })
  }

  async fn get_user(&self, id: i64) -> CoreResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1");
    Ok(self.query_opt(sql, vec![id.into()], user_from_row).await?)
  }

  async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
    Ok(self.query_opt(sql, vec![email.to_owned().into()], user_from_row).await?)
  }

  async fn add_admin(&self, input: NewAdmin) -> CoreResult<Admin> {
    if !(1..=3).contains(&input.access_level) {
      return Err(CoreError::InvalidInput("access level must be between 1 and 3".into()));
    }
    let row = input.clone();
    let admin_id = self
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row("SELECT 1 FROM admins WHERE username = ?1", [&row.username], |_| Ok(()))
          .optional()?
          .is_some();
        if taken {
          return Ok(None);
        }
        tx.execute(
          "INSERT INTO admins (username, password_hash, access_level) VALUES (?1, ?2, ?3)",
          params![row.username, row.password_hash, row.access_level],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(id))
      })
      .await?
      .ok_or_else(|| CoreError::DuplicateUser(input.username.clone()))?;

    Ok(Admin {
      admin_id,
      username: input.username,
      password_hash: input.password_hash,
      access_level: input.access_level,
    })
  }

  async fn get_admin(&self, id: i64) -> CoreResult<Option<Admin>> {
    let sql = "SELECT admin_id, username, password_hash, access_level FROM admins
               WHERE admin_id = ?1"
      .to_owned();
    Ok(self.query_opt(sql, vec![id.into()], admin_from_row).await?)
  }

  // ── Reference data ────────────────────────────────────────────────────────

  async fn add_destination(&self, input: NewDestination) -> CoreResult<Destination> {
    let destination_id = self
      .insert_checked(
        Entity::Destination,
        vec![],
        "INSERT INTO destinations (city, country, description) VALUES (?1, ?2, ?3)",
        vec![
          input.city.clone().into(),
          input.country.clone().into(),
          input.description.clone().into(),
        ],
      )
      .await?;
    Ok(Destination {
      destination_id,
      city: input.city,
      country: input.country,
      description: input.description,
    })
  }

  async fn get_destination(&self, id: i64) -> CoreResult<Option<Destination>> {
    let sql = format!("SELECT {DESTINATION_COLUMNS} FROM destinations WHERE destination_id = ?1");
    Ok(self.query_opt(sql, vec![id.into()], destination_from_row).await?)
  }

  async fn list_destinations(&self, query: &DestinationQuery) -> CoreResult<Vec<Destination>> {
    // Build WHERE clause dynamically; LIKE is case-insensitive for ASCII.
    let mut conds: Vec<String> = vec![];
    let mut args: Vec<Value> = vec![];

    if let Some(text) = &query.text {
      args.push(contains_pattern(text).into());
      let n = args.len();
      conds.push(format!(
        "(city LIKE ?{n} ESCAPE '\\' OR country LIKE ?{n} ESCAPE '\\')"
      ));
    }
    if let Some(city) = &query.city {
      args.push(contains_pattern(city).into());
      conds.push(format!("city LIKE ?{} ESCAPE '\\'", args.len()));
    }
    if let Some(country) = &query.country {
      args.push(contains_pattern(country).into());
      conds.push(format!("country LIKE ?{} ESCAPE '\\'", args.len()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    let limit = query.limit.map_or(-1, |l| l as i64);
    args.push(limit.into());
    let sql = format!(
      "SELECT {DESTINATION_COLUMNS} FROM destinations {where_clause}
       ORDER BY destination_id LIMIT ?{}",
      args.len()
    );

    Ok(self.query_all(sql, args, destination_from_row).await?)
  }

  async fn add_food(&self, input: NewFood) -> CoreResult<Food> {
    let food_id = self
      .insert_checked(
        Entity::Food,
        vec![(Entity::Destination, input.destination_id)],
        "INSERT INTO food (destination_id, name, location, rating) VALUES (?1, ?2, ?3, ?4)",
        vec![
          input.destination_id.into(),
          input.name.clone().into(),
          input.location.clone().into(),
          input.rating.into(),
        ],
      )
      .await?;
    Ok(Food {
      food_id,
      destination_id: input.destination_id,
      name: input.name,
      location: input.location,
      rating: input.rating,
    })
  }

  async fn get_food(&self, id: i64) -> CoreResult<Option<Food>> {
    let sql = format!("SELECT {FOOD_COLUMNS} FROM food WHERE food_id = ?1");
    Ok(self.query_opt(sql, vec![id.into()], food_from_row).await?)
  }

  async fn list_food(&self, destination_id: Option<i64>) -> CoreResult<Vec<Food>> {
    let (sql, args) = match destination_id {
      Some(d) => (
        format!("SELECT {FOOD_COLUMNS} FROM food WHERE destination_id = ?1 ORDER BY food_id"),
        vec![d.into()],
      ),
      None => (format!("SELECT {FOOD_COLUMNS} FROM food ORDER BY food_id"), vec![]),
    };
    Ok(self.query_all(sql, args, food_from_row).await?)
  }

  async fn add_accommodation(&self, input: NewAccommodation) -> CoreResult<Accommodation> {
    let accommodation_id = self
      .insert_checked(
        Entity::Accommodation,
        vec![(Entity::Destination, input.destination_id)],
        "INSERT INTO accommodations (destination_id, name, kind, rating)
         VALUES (?1, ?2, ?3, ?4)",
        vec![
          input.destination_id.into(),
          input.name.clone().into(),
          encode_accommodation_kind(input.kind).into(),
          input.rating.into(),
        ],
      )
      .await?;
    Ok(Accommodation {
      accommodation_id,
      destination_id: input.destination_id,
      name: input.name,
      kind: input.kind,
      rating: input.rating,
    })
  }

  async fn get_accommodation(&self, id: i64) -> CoreResult<Option<Accommodation>> {
    let sql = format!(
      "SELECT {ACCOMMODATION_COLUMNS} FROM accommodations WHERE accommodation_id = ?1"
    );
    let raw = self.query_opt(sql, vec![id.into()], raw_accommodation_from_row).await?;
    Ok(raw.map(decode_accommodation).transpose()?)
  }

  async fn list_accommodations(&self, destination_id: Option<i64>) -> CoreResult<Vec<Accommodation>> {
    let (sql, args) = match destination_id {
      Some(d) => (
        format!(
          "SELECT {ACCOMMODATION_COLUMNS} FROM accommodations WHERE destination_id = ?1
           ORDER BY accommodation_id"
        ),
        vec![d.into()],
      ),
      None => (
        format!("SELECT {ACCOMMODATION_COLUMNS} FROM accommodations ORDER BY accommodation_id"),
        vec![],
      ),
    };
    let raws = self.query_all(sql, args, raw_accommodation_from_row).await?;
    Ok(raws.into_iter().map(decode_accommodation).collect::<Result<_>>()?)
  }

  async fn add_transport(&self, input: NewTransport) -> CoreResult<Transport> {
    positive(input.cost, "transport cost")?;
    let transport_id = self
      .insert_checked(
        Entity::Transport,
        vec![],
        "INSERT INTO transports (
           origin_city, origin_country, dest_city, dest_country, kind, cost, departs_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        vec![
          input.origin_city.clone().into(),
          input.origin_country.clone().into(),
          input.dest_city.clone().into(),
          input.dest_country.clone().into(),
          encode_transport_kind(input.kind).into(),
          input.cost.into(),
          encode_time(input.departs_at).into(),
        ],
      )
      .await?;
    Ok(Transport {
      transport_id,
      origin_city: input.origin_city,
      origin_country: input.origin_country,
      dest_city: input.dest_city,
      dest_country: input.dest_country,
      kind: input.kind,
      cost: input.cost,
      departs_at: input.departs_at,
    })
  }

  async fn get_transport(&self, id: i64) -> CoreResult<Option<Transport>> {
    let sql = format!(
      "SELECT {} FROM transports WHERE transport_id = ?1",
      RawTransport::COLUMNS
    );
    let raw = self.query_opt(sql, vec![id.into()], RawTransport::from_row).await?;
    Ok(raw.map(RawTransport::into_transport).transpose()?)
  }

  async fn list_transports(&self, dest_city: Option<&str>) -> CoreResult<Vec<Transport>> {
    let (sql, args) = match dest_city {
      Some(city) => (
        format!(
          "SELECT {} FROM transports WHERE dest_city = ?1 COLLATE NOCASE
           ORDER BY transport_id",
          RawTransport::COLUMNS
        ),
        vec![city.to_owned().into()],
      ),
      None => (
        format!("SELECT {} FROM transports ORDER BY transport_id", RawTransport::COLUMNS),
        vec![],
      ),
    };
    let raws = self.query_all(sql, args, RawTransport::from_row).await?;
    Ok(raws.into_iter().map(RawTransport::into_transport).collect::<Result<_>>()?)
  }

  // ── Pipeline stages ───────────────────────────────────────────────────────

  async fn add_trip(&self, input: NewTrip) -> CoreResult<Trip> {
    positive(input.max_budget, "max budget")?;
    if input.end_date < input.start_date {
      return Err(CoreError::InvalidInput("end date precedes start date".into()));
    }

    let trip_id = self
      .insert_checked(
        Entity::Trip,
        vec![(Entity::User, input.user_id), (Entity::Destination, input.destination_id)],
        "INSERT INTO trips (user_id, destination_id, max_budget, start_date, end_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        vec![
          input.user_id.into(),
          input.destination_id.into(),
          input.max_budget.into(),
          encode_date(input.start_date).into(),
          encode_date(input.end_date).into(),
        ],
      )
      .await?;
    Ok(Trip {
      trip_id,
      user_id: input.user_id,
      destination_id: input.destination_id,
      max_budget: input.max_budget,
      start_date: input.start_date,
      end_date: input.end_date,
    })
  }

  async fn get_trip(&self, id: i64) -> CoreResult<Option<Trip>> {
    let sql = format!("SELECT {} FROM trips WHERE trip_id = ?1", RawTrip::COLUMNS);
    let raw = self.query_opt(sql, vec![id.into()], RawTrip::from_row).await?;
    Ok(raw.map(RawTrip::into_trip).transpose()?)
  }

  async fn add_suggestion(&self, input: NewSuggestion) -> CoreResult<Suggestion> {
    let suggestion_id = self
      .insert_checked(
        Entity::Suggestion,
        vec![
          (Entity::Trip, input.trip_id),
          (Entity::Food, input.food_id),
          (Entity::Transport, input.transport_id),
          (Entity::Destination, input.destination_id),
          (Entity::Accommodation, input.accommodation_id),
        ],
        "INSERT INTO suggestions (
           trip_id, daily_budget, food_id, transport_id, destination_id, accommodation_id
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        vec![
          input.trip_id.into(),
          input.daily_budget.into(),
          input.food_id.into(),
          input.transport_id.into(),
          input.destination_id.into(),
          input.accommodation_id.into(),
        ],
      )
      .await?;
    Ok(Suggestion {
      suggestion_id,
      trip_id: input.trip_id,
      daily_budget: input.daily_budget,
      food_id: input.food_id,
      transport_id: input.transport_id,
      destination_id: input.destination_id,
      accommodation_id: input.accommodation_id,
    })
  }

  async fn list_suggestions(&self, trip_id: i64) -> CoreResult<Vec<Suggestion>> {
    let sql = format!(
      "SELECT {SUGGESTION_COLUMNS} FROM suggestions WHERE trip_id = ?1 ORDER BY suggestion_id"
    );
    Ok(self.query_all(sql, vec![trip_id.into()], suggestion_from_row).await?)
  }

  async fn add_filtered_suggestion(
    &self,
    input: NewFilteredSuggestion,
  ) -> CoreResult<FilteredSuggestion> {
    positive(input.total_budget, "total budget")?;
    positive(input.daily_budget, "daily budget")?;

    let filtered_suggestion_id = self
      .insert_checked(
        Entity::FilteredSuggestion,
        vec![
          (Entity::Trip, input.trip_id),
          (Entity::Food, input.food_id),
          (Entity::Transport, input.transport_id),
          (Entity::Destination, input.destination_id),
          (Entity::Accommodation, input.accommodation_id),
        ],
        "INSERT INTO filtered_suggestions (
           trip_id, total_budget, daily_budget, food_id, transport_id, destination_id,
           accommodation_id
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        vec![
          input.trip_id.into(),
          input.total_budget.into(),
          input.daily_budget.into(),
          input.food_id.into(),
          input.transport_id.into(),
          input.destination_id.into(),
          input.accommodation_id.into(),
        ],
      )
      .await?;
    Ok(FilteredSuggestion {
      filtered_suggestion_id,
      trip_id: input.trip_id,
      total_budget: input.total_budget,
      daily_budget: input.daily_budget,
      food_id: input.food_id,
      transport_id: input.transport_id,
      destination_id: input.destination_id,
      accommodation_id: input.accommodation_id,
    })
  }

  async fn get_filtered_suggestion(&self, id: i64) -> CoreResult<Option<FilteredSuggestion>> {
    let sql = format!(
      "SELECT {FILTERED_COLUMNS} FROM filtered_suggestions WHERE filtered_suggestion_id = ?1"
    );
    Ok(self.query_opt(sql, vec![id.into()], filtered_from_row).await?)
  }

  async fn add_final_trip(&self, input: NewFinalTrip) -> CoreResult<FinalTrip> {
    let refs = vec![
      (Entity::FilteredSuggestion, input.filtered_suggestion_id),
      (Entity::User, input.user_id),
      (Entity::Destination, input.destination_id),
      (Entity::Transport, input.transport_id),
      (Entity::Accommodation, input.accommodation_id),
      (Entity::Food, input.food_id),
    ];
    let row = input.clone();

    let final_trip_id = self
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(violation) = first_dangling(&tx, Entity::FinalTrip, &refs)? {
          return Ok(Err(violation));
        }

        let existing: Option<i64> = tx
          .query_row(
            "SELECT final_trip_id FROM final_trips WHERE filtered_suggestion_id = ?1",
            [row.filtered_suggestion_id],
            |r| r.get(0),
          )
          .optional()?;
        if let Some(final_trip_id) = existing {
          return Ok(Err(CoreError::AlreadyFinalized {
            filtered_suggestion_id: row.filtered_suggestion_id,
            final_trip_id,
          }));
        }

        tx.execute(
          "INSERT INTO final_trips (
             filtered_suggestion_id, user_id, destination_id, transport_id,
             accommodation_id, food_id, total_budget, start_date, end_date
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          params![
            row.filtered_suggestion_id,
            row.user_id,
            row.destination_id,
            row.transport_id,
            row.accommodation_id,
            row.food_id,
            row.total_budget,
            encode_date(row.start_date),
            encode_date(row.end_date),
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await??;

    Ok(FinalTrip {
      final_trip_id,
      filtered_suggestion_id: input.filtered_suggestion_id,
      user_id: input.user_id,
      destination_id: input.destination_id,
      transport_id: input.transport_id,
      accommodation_id: input.accommodation_id,
      food_id: input.food_id,
      total_budget: input.total_budget,
      start_date: input.start_date,
      end_date: input.end_date,
    })
  }

  async fn get_final_trip(&self, id: i64) -> CoreResult<Option<FinalTrip>> {
    let sql = format!(
      "SELECT {} FROM final_trips WHERE final_trip_id = ?1",
      RawFinalTrip::COLUMNS
    );
    let raw = self.query_opt(sql, vec![id.into()], RawFinalTrip::from_row).await?;
    Ok(raw.map(RawFinalTrip::into_final_trip).transpose()?)
  }

  async fn list_final_trips(&self, user_id: i64) -> CoreResult<Vec<FinalTrip>> {
    let sql = format!(
      "SELECT {} FROM final_trips WHERE user_id = ?1 ORDER BY final_trip_id",
      RawFinalTrip::COLUMNS
    );
    let raws = self.query_all(sql, vec![user_id.into()], RawFinalTrip::from_row).await?;
    Ok(raws.into_iter().map(RawFinalTrip::into_final_trip).collect::<Result<_>>()?)
  }

  // ── Removal ───────────────────────────────────────────────────────────────

  async fn delete(&self, entity: Entity, id: i64) -> CoreResult<bool> {
    if entity == Entity::FinalTrip {
      return Err(CoreError::Immutable(entity));
    }

    let sql = format!("DELETE FROM {} WHERE {} = ?1", entity.table(), entity.id_column());
    let removed = self.call(move |conn| Ok(conn.execute(&sql, [id])?)).await?;

    debug!(%entity, id, removed, "cascade delete");
    Ok(removed > 0)
  }
}
