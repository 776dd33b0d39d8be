//! Integration tests for `SqliteStore` against an in-memory database.

use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use tripplan_core::{
  Entity, Error as CoreError,
  reference::{
    AccommodationKind, NewAccommodation, NewDestination, NewFood, NewTransport,
    TransportKind,
  },
  store::{DestinationQuery, TripStore},
  trip::{FilteredSuggestion, NewFilteredSuggestion, NewFinalTrip, NewSuggestion, NewTrip},
  user::{NewAdmin, NewUser},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_user(name: &str) -> NewUser {
  NewUser {
    user_name:     name.into(),
    password_hash: None,
    email:         format!("{name}@example.com"),
    city:          "Lyon".into(),
    country:       "France".into(),
  }
}

fn new_destination(city: &str, country: &str) -> NewDestination {
  NewDestination { city: city.into(), country: country.into(), description: String::new() }
}

/// Ids of one fully populated destination plus a user and a trip there.
struct Fixture {
  user_id:          i64,
  destination_id:   i64,
  food_id:          i64,
  accommodation_id: i64,
  transport_id:     i64,
  trip_id:          i64,
}

async fn fixture(s: &SqliteStore) -> Fixture {
  let user = s.add_user(new_user("alice")).await.unwrap();
  let dest = s.add_destination(new_destination("Paris", "France")).await.unwrap();
  let food = s
    .add_food(NewFood {
      destination_id: dest.destination_id,
      name:           "Le Comptoir".into(),
      location:       "Saint-Germain".into(),
      rating:         4.6,
    })
    .await
    .unwrap();
  let lodging = s
    .add_accommodation(NewAccommodation {
      destination_id: dest.destination_id,
      name:           "Hotel du Nord".into(),
      kind:           AccommodationKind::Hotel,
      rating:         4.2,
    })
    .await
    .unwrap();
  let transport = s
    .add_transport(NewTransport {
      origin_city:    "Lyon".into(),
      origin_country: "France".into(),
      dest_city:      "Paris".into(),
      dest_country:   "France".into(),
      kind:           TransportKind::Train,
      cost:           80.0,
      departs_at:     NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
    })
    .await
    .unwrap();
  let trip = s
    .add_trip(NewTrip {
      user_id:        user.user_id,
      destination_id: dest.destination_id,
      max_budget:     1000.0,
      start_date:     date(2025, 6, 1),
      end_date:       date(2025, 6, 7),
    })
    .await
    .unwrap();

  Fixture {
    user_id:          user.user_id,
    destination_id:   dest.destination_id,
    food_id:          food.food_id,
    accommodation_id: lodging.accommodation_id,
    transport_id:     transport.transport_id,
    trip_id:          trip.trip_id,
  }
}

fn shortlisted(f: &Fixture) -> NewFilteredSuggestion {
  NewFilteredSuggestion {
    trip_id:          f.trip_id,
    total_budget:     700.0,
    daily_budget:     100.0,
    food_id:          f.food_id,
    transport_id:     f.transport_id,
    destination_id:   f.destination_id,
    accommodation_id: f.accommodation_id,
  }
}

fn booking(f: &Fixture, source: &FilteredSuggestion) -> NewFinalTrip {
  NewFinalTrip {
    filtered_suggestion_id: source.filtered_suggestion_id,
    user_id:                f.user_id,
    destination_id:         source.destination_id,
    transport_id:           source.transport_id,
    accommodation_id:       source.accommodation_id,
    food_id:                source.food_id,
    total_budget:           source.total_budget,
    start_date:             date(2025, 6, 1),
    end_date:               date(2025, 6, 7),
  }
}

async fn count(s: &SqliteStore, table: &'static str) -> i64 {
  s.call(move |conn| {
    Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
  })
  .await
  .unwrap()
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;
  let user = s.add_user(new_user("alice")).await.unwrap();

  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.user_name, "alice");
  assert_eq!(fetched.email, "alice@example.com");

  let by_email = s.find_user_by_email("alice@example.com").await.unwrap();
  assert_eq!(by_email.map(|u| u.user_id), Some(user.user_id));
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(42).await.unwrap().is_none());
  assert!(s.find_user_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  s.add_user(new_user("alice")).await.unwrap();

  let mut again = new_user("alice2");
  again.email = "alice@example.com".into();
  let err = s.add_user(again).await.unwrap_err();
  assert!(matches!(err, CoreError::DuplicateUser(ref e) if e == "alice@example.com"));
  assert_eq!(count(&s, "users").await, 1);
}

#[tokio::test]
async fn duplicate_user_name_is_rejected() {
  let s = store().await;
  s.add_user(new_user("alice")).await.unwrap();

  let mut again = new_user("alice");
  again.email = "other@example.com".into();
  let err = s.add_user(again).await.unwrap_err();
  assert!(matches!(err, CoreError::DuplicateUser(ref taken) if taken == "alice"));
  assert_eq!(count(&s, "users").await, 1);
}

#[tokio::test]
async fn admin_access_level_is_bounded() {
  let s = store().await;
  let admin = s
    .add_admin(NewAdmin {
      username:      "root".into(),
      password_hash: "$argon2id$stub".into(),
      access_level:  3,
    })
    .await
    .unwrap();
  assert_eq!(s.get_admin(admin.admin_id).await.unwrap().unwrap().access_level, 3);

  let err = s
    .add_admin(NewAdmin {
      username:      "ops".into(),
      password_hash: "$argon2id$stub".into(),
      access_level:  4,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::InvalidInput(_)));
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn destination_search_is_case_insensitive_substring() {
  let s = store().await;
  s.add_destination(new_destination("Paris", "France")).await.unwrap();
  s.add_destination(new_destination("Lisbon", "Portugal")).await.unwrap();
  s.add_destination(new_destination("Nice", "France")).await.unwrap();

  let hits = s.list_destinations(&DestinationQuery::text("fRaN")).await.unwrap();
  let cities: Vec<_> = hits.iter().map(|d| d.city.as_str()).collect();
  assert_eq!(cities, ["Paris", "Nice"]);

  let hits = s.list_destinations(&DestinationQuery::text("isb")).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].country, "Portugal");
}

#[tokio::test]
async fn destination_search_escapes_wildcards() {
  let s = store().await;
  s.add_destination(new_destination("Paris", "France")).await.unwrap();

  assert!(s.list_destinations(&DestinationQuery::text("%")).await.unwrap().is_empty());
  assert!(s.list_destinations(&DestinationQuery::text("P_ris")).await.unwrap().is_empty());
}

#[tokio::test]
async fn destination_query_combines_fields_and_limit() {
  let s = store().await;
  s.add_destination(new_destination("Paris", "France")).await.unwrap();
  s.add_destination(new_destination("Paris", "United States")).await.unwrap();
  s.add_destination(new_destination("Nice", "France")).await.unwrap();

  let q = DestinationQuery {
    city: Some("paris".into()),
    country: Some("states".into()),
    ..DestinationQuery::default()
  };
  let hits = s.list_destinations(&q).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].country, "United States");

  let q = DestinationQuery { limit: Some(2), ..DestinationQuery::default() };
  assert_eq!(s.list_destinations(&q).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reference_rows_round_trip_their_kinds() {
  let s = store().await;
  let f = fixture(&s).await;

  let lodging = s.get_accommodation(f.accommodation_id).await.unwrap().unwrap();
  assert_eq!(lodging.kind, AccommodationKind::Hotel);

  let transport = s.get_transport(f.transport_id).await.unwrap().unwrap();
  assert_eq!(transport.kind, TransportKind::Train);
  assert_eq!(transport.departs_at, NaiveTime::from_hms_opt(9, 30, 0).unwrap());

  assert_eq!(s.list_food(Some(f.destination_id)).await.unwrap().len(), 1);
  assert!(s.list_food(Some(f.destination_id + 1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn transports_match_destination_city_exactly() {
  let s = store().await;
  fixture(&s).await;

  assert_eq!(s.list_transports(Some("PARIS")).await.unwrap().len(), 1);
  assert!(s.list_transports(Some("Par")).await.unwrap().is_empty());
  assert_eq!(s.list_transports(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn food_requires_existing_destination() {
  let s = store().await;
  let err = s
    .add_food(NewFood {
      destination_id: 99,
      name:           "Nowhere Diner".into(),
      location:       "?".into(),
      rating:         3.0,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    CoreError::IntegrityViolation { entity: Entity::Food, references: Entity::Destination, id: 99 }
  ));
  assert_eq!(count(&s, "food").await, 0);
}

// ─── Pipeline stages ─────────────────────────────────────────────────────────

#[tokio::test]
async fn trip_round_trips_dates() {
  let s = store().await;
  let f = fixture(&s).await;

  let trip = s.get_trip(f.trip_id).await.unwrap().unwrap();
  assert_eq!(trip.start_date, date(2025, 6, 1));
  assert_eq!(trip.end_date, date(2025, 6, 7));
  assert_eq!(trip.duration_days(), 7);
}

#[tokio::test]
async fn trip_for_missing_user_writes_nothing() {
  let s = store().await;
  let dest = s.add_destination(new_destination("Paris", "France")).await.unwrap();

  let err = s
    .add_trip(NewTrip {
      user_id:        7,
      destination_id: dest.destination_id,
      max_budget:     500.0,
      start_date:     date(2025, 6, 1),
      end_date:       date(2025, 6, 2),
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    CoreError::IntegrityViolation { entity: Entity::Trip, references: Entity::User, id: 7 }
  ));
  assert_eq!(count(&s, "trips").await, 0);
}

#[tokio::test]
async fn trip_rejects_inverted_dates_and_bad_budget() {
  let s = store().await;
  let f = fixture(&s).await;

  let inverted = NewTrip {
    user_id:        f.user_id,
    destination_id: f.destination_id,
    max_budget:     500.0,
    start_date:     date(2025, 6, 5),
    end_date:       date(2025, 6, 1),
  };
  assert!(matches!(s.add_trip(inverted).await, Err(CoreError::InvalidInput(_))));

  let broke = NewTrip {
    user_id:        f.user_id,
    destination_id: f.destination_id,
    max_budget:     0.0,
    start_date:     date(2025, 6, 1),
    end_date:       date(2025, 6, 1),
  };
  assert!(matches!(s.add_trip(broke).await, Err(CoreError::InvalidInput(_))));
}

#[tokio::test]
async fn suggestions_list_by_trip() {
  let s = store().await;
  let f = fixture(&s).await;

  for daily in [80.0, 120.0] {
    s.add_suggestion(NewSuggestion {
      trip_id:          f.trip_id,
      daily_budget:     daily,
      food_id:          f.food_id,
      transport_id:     f.transport_id,
      destination_id:   f.destination_id,
      accommodation_id: f.accommodation_id,
    })
    .await
    .unwrap();
  }

  let listed = s.list_suggestions(f.trip_id).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[1].daily_budget, 120.0);
  assert!(s.list_suggestions(f.trip_id + 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn filtered_suggestion_with_missing_transport_writes_nothing() {
  let s = store().await;
  let f = fixture(&s).await;

  let mut input = shortlisted(&f);
  input.transport_id = 404;
  let err = s.add_filtered_suggestion(input).await.unwrap_err();
  assert!(matches!(
    err,
    CoreError::IntegrityViolation { references: Entity::Transport, id: 404, .. }
  ));
  assert_eq!(count(&s, "filtered_suggestions").await, 0);
}

// ─── Final trips ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn final_trip_is_booked_once() {
  let s = store().await;
  let f = fixture(&s).await;
  let source = s.add_filtered_suggestion(shortlisted(&f)).await.unwrap();

  let first = s.add_final_trip(booking(&f, &source)).await.unwrap();
  assert_eq!(first.total_budget, 700.0);
  assert_eq!(s.get_final_trip(first.final_trip_id).await.unwrap(), Some(first.clone()));

  let err = s.add_final_trip(booking(&f, &source)).await.unwrap_err();
  match err {
    CoreError::AlreadyFinalized { filtered_suggestion_id, final_trip_id } => {
      assert_eq!(filtered_suggestion_id, source.filtered_suggestion_id);
      assert_eq!(final_trip_id, first.final_trip_id);
    }
    other => panic!("expected AlreadyFinalized, got {other:?}"),
  }
  assert_eq!(count(&s, "final_trips").await, 1);
}

#[tokio::test]
async fn final_trip_for_missing_user_writes_nothing() {
  let s = store().await;
  let f = fixture(&s).await;
  let source = s.add_filtered_suggestion(shortlisted(&f)).await.unwrap();

  let mut input = booking(&f, &source);
  input.user_id = 555;
  let err = s.add_final_trip(input).await.unwrap_err();
  assert!(matches!(
    err,
    CoreError::IntegrityViolation { entity: Entity::FinalTrip, references: Entity::User, id: 555 }
  ));
  assert_eq!(count(&s, "final_trips").await, 0);
}

#[tokio::test]
async fn final_trips_reject_updates() {
  let s = store().await;
  let f = fixture(&s).await;
  let source = s.add_filtered_suggestion(shortlisted(&f)).await.unwrap();
  let booked = s.add_final_trip(booking(&f, &source)).await.unwrap();

  let result = s
    .call(|conn| Ok(conn.execute("UPDATE final_trips SET total_budget = 1.0", [])?))
    .await;
  assert!(result.is_err());

  let unchanged = s.get_final_trip(booked.final_trip_id).await.unwrap().unwrap();
  assert_eq!(unchanged.total_budget, 700.0);
}

#[tokio::test]
async fn final_trips_cannot_be_deleted_directly() {
  let s = store().await;
  let err = s.delete(Entity::FinalTrip, 1).await.unwrap_err();
  assert!(matches!(err, CoreError::Immutable(Entity::FinalTrip)));
}

#[tokio::test]
async fn list_final_trips_by_user() {
  let s = store().await;
  let f = fixture(&s).await;
  let a = s.add_filtered_suggestion(shortlisted(&f)).await.unwrap();
  let b = s.add_filtered_suggestion(shortlisted(&f)).await.unwrap();
  s.add_final_trip(booking(&f, &a)).await.unwrap();
  s.add_final_trip(booking(&f, &b)).await.unwrap();

  let mine = s.list_final_trips(f.user_id).await.unwrap();
  assert_eq!(mine.len(), 2);
  assert!(mine[0].final_trip_id < mine[1].final_trip_id);
  assert!(s.list_final_trips(f.user_id + 1).await.unwrap().is_empty());
}

// ─── Removal ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_a_user_cascades_through_the_pipeline() {
  let s = store().await;
  let f = fixture(&s).await;
  let source = s.add_filtered_suggestion(shortlisted(&f)).await.unwrap();
  s.add_final_trip(booking(&f, &source)).await.unwrap();

  assert!(s.delete(Entity::User, f.user_id).await.unwrap());

  assert!(s.get_trip(f.trip_id).await.unwrap().is_none());
  assert!(s.get_filtered_suggestion(source.filtered_suggestion_id).await.unwrap().is_none());
  assert_eq!(count(&s, "final_trips").await, 0);
  // Reference data is untouched.
  assert!(s.get_destination(f.destination_id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_destination_cascades_to_its_options() {
  let s = store().await;
  let f = fixture(&s).await;

  assert!(s.delete(Entity::Destination, f.destination_id).await.unwrap());
  assert!(s.get_food(f.food_id).await.unwrap().is_none());
  assert!(s.get_accommodation(f.accommodation_id).await.unwrap().is_none());
  assert!(s.get_trip(f.trip_id).await.unwrap().is_none());
  // Transports are matched by city, not owned.
  assert!(s.get_transport(f.transport_id).await.unwrap().is_some());
}

/// A fixture with one suggestion, one shortlisted option and its booking.
async fn booked(s: &SqliteStore) -> Fixture {
  let f = fixture(s).await;
  s.add_suggestion(NewSuggestion {
    trip_id:          f.trip_id,
    daily_budget:     100.0,
    food_id:          f.food_id,
    transport_id:     f.transport_id,
    destination_id:   f.destination_id,
    accommodation_id: f.accommodation_id,
  })
  .await
  .unwrap();
  let source = s.add_filtered_suggestion(shortlisted(&f)).await.unwrap();
  s.add_final_trip(booking(&f, &source)).await.unwrap();
  f
}

async fn assert_pipeline_cleared(s: &SqliteStore) {
  assert_eq!(count(s, "suggestions").await, 0);
  assert_eq!(count(s, "filtered_suggestions").await, 0);
  assert_eq!(count(s, "final_trips").await, 0);
}

#[tokio::test]
async fn deleting_a_trip_cascades_to_its_bookings() {
  let s = store().await;
  let f = booked(&s).await;

  assert!(s.delete(Entity::Trip, f.trip_id).await.unwrap());
  assert_pipeline_cleared(&s).await;
  assert!(s.get_user(f.user_id).await.unwrap().is_some());
  assert!(s.get_destination(f.destination_id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_destination_clears_its_bookings() {
  let s = store().await;
  let f = booked(&s).await;

  assert!(s.delete(Entity::Destination, f.destination_id).await.unwrap());
  assert_pipeline_cleared(&s).await;
  assert_eq!(count(&s, "trips").await, 0);
}

#[tokio::test]
async fn deleting_food_clears_bookings_that_use_it() {
  let s = store().await;
  let f = booked(&s).await;

  assert!(s.delete(Entity::Food, f.food_id).await.unwrap());
  assert_pipeline_cleared(&s).await;
  assert!(s.get_trip(f.trip_id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_an_accommodation_clears_bookings_that_use_it() {
  let s = store().await;
  let f = booked(&s).await;

  assert!(s.delete(Entity::Accommodation, f.accommodation_id).await.unwrap());
  assert_pipeline_cleared(&s).await;
  assert!(s.get_trip(f.trip_id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_transport_clears_bookings_that_use_it() {
  let s = store().await;
  let f = booked(&s).await;

  assert!(s.delete(Entity::Transport, f.transport_id).await.unwrap());
  assert_pipeline_cleared(&s).await;
  assert!(s.get_trip(f.trip_id).await.unwrap().is_some());
  assert!(s.get_destination(f.destination_id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_missing_row_reports_false() {
  let s = store().await;
  assert!(!s.delete(Entity::Trip, 12).await.unwrap());
}

// ─── Connection ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn long_statements_are_interrupted() {
  let s = store().await.with_call_timeout(Duration::from_millis(20));
  let result = s
    .call(|conn| {
      let n: i64 = conn.query_row(
        "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c)
         SELECT count(*) FROM (SELECT x FROM c LIMIT 1000000000)",
        [],
        |row| row.get(0),
      )?;
      Ok(n)
    })
    .await;
  assert!(matches!(result, Err(Error::Timeout(_))));
}

#[tokio::test]
async fn timed_out_insert_writes_nothing() {
  let s = store().await.with_call_timeout(Duration::from_millis(50));
  let blocker = s.clone().with_call_timeout(Duration::from_secs(5));
  let held = tokio::spawn(async move {
    blocker
      .call(|_| {
        std::thread::sleep(Duration::from_millis(200));
        Ok(())
      })
      .await
  });
  tokio::time::sleep(Duration::from_millis(10)).await;

  let err = s.add_destination(new_destination("Paris", "France")).await.unwrap_err();
  assert!(matches!(err, CoreError::Store(_)));
  assert!(err.to_string().contains("exceeded"));

  held.await.unwrap().unwrap();
  assert_eq!(count(&s, "destinations").await, 0);
}
