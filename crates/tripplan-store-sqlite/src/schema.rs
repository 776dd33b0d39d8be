//! SQL schema for the trip planner SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// Every foreign key cascades on delete. Dates are ISO 8601 (`YYYY-MM-DD`),
/// times `HH:MM:SS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    user_name     TEXT NOT NULL UNIQUE,
    password_hash TEXT,
    email         TEXT NOT NULL UNIQUE,
    city          TEXT NOT NULL,
    country       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admins (
    admin_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    access_level  INTEGER NOT NULL CHECK (access_level BETWEEN 1 AND 3)
);

-- Reference data.
CREATE TABLE IF NOT EXISTS destinations (
    destination_id INTEGER PRIMARY KEY AUTOINCREMENT,
    city           TEXT NOT NULL,
    country        TEXT NOT NULL,
    description    TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS food (
    food_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    destination_id INTEGER NOT NULL
                   REFERENCES destinations(destination_id) ON DELETE CASCADE,
    name           TEXT NOT NULL,
    location       TEXT NOT NULL,
    rating         REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS accommodations (
    accommodation_id INTEGER PRIMARY KEY AUTOINCREMENT,
    destination_id   INTEGER NOT NULL
                     REFERENCES destinations(destination_id) ON DELETE CASCADE,
    name             TEXT NOT NULL,
    kind             INTEGER NOT NULL,   -- 1 hotel .. 5 bed & breakfast
    rating           REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS transports (
    transport_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    origin_city    TEXT NOT NULL,
    origin_country TEXT NOT NULL,
    dest_city      TEXT NOT NULL,
    dest_country   TEXT NOT NULL,
    kind           INTEGER NOT NULL,     -- 1 flight .. 5 ferry
    cost           REAL NOT NULL,
    departs_at     TEXT NOT NULL
);

-- Pipeline stages.
CREATE TABLE IF NOT EXISTS trips (
    trip_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id        INTEGER NOT NULL
                   REFERENCES users(user_id) ON DELETE CASCADE,
    destination_id INTEGER NOT NULL
                   REFERENCES destinations(destination_id) ON DELETE CASCADE,
    max_budget     REAL NOT NULL CHECK (max_budget > 0),
    start_date     TEXT NOT NULL,
    end_date       TEXT NOT NULL,
    CHECK (end_date >= start_date)
);

CREATE TABLE IF NOT EXISTS suggestions (
    suggestion_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    trip_id          INTEGER NOT NULL
                     REFERENCES trips(trip_id) ON DELETE CASCADE,
    daily_budget     REAL NOT NULL,
    food_id          INTEGER NOT NULL REFERENCES food(food_id) ON DELETE CASCADE,
    transport_id     INTEGER NOT NULL
                     REFERENCES transports(transport_id) ON DELETE CASCADE,
    destination_id   INTEGER NOT NULL
                     REFERENCES destinations(destination_id) ON DELETE CASCADE,
    accommodation_id INTEGER NOT NULL
                     REFERENCES accommodations(accommodation_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS filtered_suggestions (
    filtered_suggestion_id INTEGER PRIMARY KEY AUTOINCREMENT,
    trip_id                INTEGER NOT NULL
                           REFERENCES trips(trip_id) ON DELETE CASCADE,
    total_budget           REAL NOT NULL,
    daily_budget           REAL NOT NULL,
    food_id                INTEGER NOT NULL
                           REFERENCES food(food_id) ON DELETE CASCADE,
    transport_id           INTEGER NOT NULL
                           REFERENCES transports(transport_id) ON DELETE CASCADE,
    destination_id         INTEGER NOT NULL
                           REFERENCES destinations(destination_id) ON DELETE CASCADE,
    accommodation_id       INTEGER NOT NULL
                           REFERENCES accommodations(accommodation_id) ON DELETE CASCADE
);

-- The booking ledger. Rows are inserted once and only ever leave through a
-- cascade; one booking per filtered suggestion.
CREATE TABLE IF NOT EXISTS final_trips (
    final_trip_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    filtered_suggestion_id INTEGER NOT NULL UNIQUE
                           REFERENCES filtered_suggestions(filtered_suggestion_id)
                           ON DELETE CASCADE,
    user_id                INTEGER NOT NULL
                           REFERENCES users(user_id) ON DELETE CASCADE,
    destination_id         INTEGER NOT NULL
                           REFERENCES destinations(destination_id) ON DELETE CASCADE,
    transport_id           INTEGER NOT NULL
                           REFERENCES transports(transport_id) ON DELETE CASCADE,
    accommodation_id       INTEGER NOT NULL
                           REFERENCES accommodations(accommodation_id) ON DELETE CASCADE,
    food_id                INTEGER NOT NULL
                           REFERENCES food(food_id) ON DELETE CASCADE,
    total_budget           REAL NOT NULL,
    start_date             TEXT NOT NULL,
    end_date               TEXT NOT NULL
);

CREATE TRIGGER IF NOT EXISTS final_trips_immutable
BEFORE UPDATE ON final_trips
BEGIN
    SELECT RAISE(ABORT, 'final_trips rows are immutable');
END;

CREATE INDEX IF NOT EXISTS food_destination_idx           ON food(destination_id);
CREATE INDEX IF NOT EXISTS accommodations_destination_idx ON accommodations(destination_id);
CREATE INDEX IF NOT EXISTS transports_dest_city_idx       ON transports(dest_city);
CREATE INDEX IF NOT EXISTS trips_user_idx                 ON trips(user_id);
CREATE INDEX IF NOT EXISTS suggestions_trip_idx           ON suggestions(trip_id);
CREATE INDEX IF NOT EXISTS filtered_suggestions_trip_idx  ON filtered_suggestions(trip_id);
CREATE INDEX IF NOT EXISTS final_trips_user_idx           ON final_trips(user_id);

PRAGMA user_version = 1;
";
