//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::NaiveTime;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use tripplan_core::{
  candidate::FixedSeed,
  planner::Planner,
  reference::{
    AccommodationKind, NewAccommodation, NewDestination, NewFood, NewTransport,
    TransportKind,
  },
  store::TripStore,
  user::NewUser,
};
use tripplan_store_sqlite::SqliteStore;

use crate::api_router;

struct Harness {
  planner:        Arc<Planner<SqliteStore>>,
  user_id:        i64,
  destination_id: i64,
}

impl Harness {
  async fn new() -> Self {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let planner = Arc::new(Planner::new(Arc::new(store)).with_entropy(FixedSeed(11)));
    let s = planner.store();

    let user_id = s
      .add_user(NewUser {
        user_name:     "alice".into(),
        password_hash: None,
        email:         "alice@example.com".into(),
        city:          "Lyon".into(),
        country:       "France".into(),
      })
      .await
      .unwrap()
      .user_id;
    let destination_id = s
      .add_destination(NewDestination {
        city:        "Paris".into(),
        country:     "France".into(),
        description: "City of light".into(),
      })
      .await
      .unwrap()
      .destination_id;
    s.add_food(NewFood {
      destination_id,
      name: "Le Comptoir".into(),
      location: "Odéon".into(),
      rating: 4.5,
    })
    .await
    .unwrap();
    s.add_accommodation(NewAccommodation {
      destination_id,
      name: "Hotel du Nord".into(),
      kind: AccommodationKind::Hotel,
      rating: 4.0,
    })
    .await
    .unwrap();
    s.add_transport(NewTransport {
      origin_city:    "Lyon".into(),
      origin_country: "France".into(),
      dest_city:      "Paris".into(),
      dest_country:   "France".into(),
      kind:           TransportKind::Train,
      cost:           65.0,
      departs_at:     NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
    })
    .await
    .unwrap();

    Harness { planner, user_id, destination_id }
  }

  fn router(&self) -> Router {
    api_router(Arc::clone(&self.planner))
  }

  async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = self.router().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
  }

  /// Create a trip and shortlist its destination; returns the filtered
  /// suggestion id.
  async fn shortlisted(&self, total_budget: f64) -> i64 {
    let (status, trip) = self
      .send(
        "POST",
        "/planning/create-trip",
        Some(json!({
          "user_id": self.user_id,
          "max_budget": 1000.0,
          "start_date": "2025-06-01",
          "end_date": "2025-06-07",
          "destination_city": "Paris",
        })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, fs) = self
      .send(
        "POST",
        "/planning/shortlist",
        Some(json!({
          "trip_id": trip["trip_id"],
          "destination_id": self.destination_id,
          "total_budget": total_budget,
        })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    fs["filtered_suggestion_id"].as_i64().unwrap()
  }
}

// ─── Planning ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_trip_reports_destination() {
  let h = Harness::new().await;
  let (status, body) = h
    .send(
      "POST",
      "/planning/create-trip",
      Some(json!({
        "user_id": h.user_id,
        "max_budget": 800,
        "start_date": "2025-07-01",
        "end_date": "2025-07-03",
      })),
    )
    .await;

  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["message"], "Trip created successfully");
  assert_eq!(body["destination"], json!({ "city": "Paris", "country": "France" }));
  assert!(body["trip_id"].is_i64());
}

#[tokio::test]
async fn create_trip_with_inverted_dates_is_400() {
  let h = Harness::new().await;
  let (status, body) = h
    .send(
      "POST",
      "/planning/create-trip",
      Some(json!({
        "user_id": h.user_id,
        "max_budget": 800,
        "start_date": "2025-07-03",
        "end_date": "2025-07-01",
      })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("end date"));
}

#[tokio::test]
async fn create_trip_for_unknown_user_is_422() {
  let h = Harness::new().await;
  let (status, _) = h
    .send(
      "POST",
      "/planning/create-trip",
      Some(json!({
        "user_id": 999,
        "max_budget": 800,
        "start_date": "2025-07-01",
        "end_date": "2025-07-03",
      })),
    )
    .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn suggestions_have_candidate_shape() {
  let h = Harness::new().await;
  let (status, body) = h.send("GET", &format!("/planning/suggestions/{}", h.user_id), None).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Showing 1 random suggestions.");
  let first = &body["suggestions"][0];
  for key in ["id", "name", "country", "city", "description", "cost", "rating", "category", "image"] {
    assert!(first.get(key).is_some(), "missing {key}: {first}");
  }
  assert_eq!(first["name"], "Paris");
}

#[tokio::test]
async fn filter_echoes_applied_filters() {
  let h = Harness::new().await;
  let (status, body) = h
    .send(
      "POST",
      "/planning/filter",
      Some(json!({ "user_id": h.user_id, "destination": "paris", "budget": 500 })),
    )
    .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["filters_applied"], json!({ "budget": 500.0, "destination": "paris" }));
  assert_eq!(body["destinations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn filter_with_no_matches_is_still_200() {
  let h = Harness::new().await;
  let (status, body) = h
    .send(
      "POST",
      "/planning/filter",
      Some(json!({ "user_id": h.user_id, "destination": "Atlantis" })),
    )
    .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "No destinations match the applied filters.");
  assert_eq!(body["destinations"], json!([]));
}

#[tokio::test]
async fn shortlist_over_budget_is_400() {
  let h = Harness::new().await;
  let (_, trip) = h
    .send(
      "POST",
      "/planning/create-trip",
      Some(json!({
        "user_id": h.user_id,
        "max_budget": 300,
        "start_date": "2025-07-01",
        "end_date": "2025-07-03",
      })),
    )
    .await;

  let (status, _) = h
    .send(
      "POST",
      "/planning/shortlist",
      Some(json!({
        "trip_id": trip["trip_id"],
        "destination_id": h.destination_id,
        "total_budget": 700,
      })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Booking, payment and history ────────────────────────────────────────────

#[tokio::test]
async fn finalize_checkout_and_history() {
  let h = Harness::new().await;
  let fs_id = h.shortlisted(700.0).await;

  let (status, booked) = h
    .send("POST", &format!("/booking/finalize/{}/{fs_id}", h.user_id), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(booked["total_budget"], 700.0);
  let final_trip_id = booked["trip_id"].as_i64().unwrap();

  let (status, paid) = h
    .send("POST", &format!("/payment/checkout/{final_trip_id}"), None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(paid["message"], "Payment processed successfully");

  let (status, history) = h.send("GET", &format!("/trips/{}", h.user_id), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    history["trips"],
    json!([{
      "trip_id": final_trip_id,
      "destination": "Paris, France",
      "totalbudget": 700.0,
      "startDate": "2025-06-01",
      "endDate": "2025-06-07",
    }])
  );
}

#[tokio::test]
async fn finalize_twice_is_409() {
  let h = Harness::new().await;
  let fs_id = h.shortlisted(400.0).await;
  let uri = format!("/booking/finalize/{}/{fs_id}", h.user_id);

  let (status, _) = h.send("POST", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = h.send("POST", &uri, None).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn finalize_missing_suggestion_is_404() {
  let h = Harness::new().await;
  let (status, body) = h
    .send("POST", &format!("/booking/finalize/{}/77", h.user_id), None)
    .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "filtered suggestion 77 not found");
}

#[tokio::test]
async fn checkout_missing_trip_is_payment_failure() {
  let h = Harness::new().await;
  let (status, body) = h.send("POST", "/payment/checkout/404", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Payment failed");
}

#[tokio::test]
async fn unknown_user_has_empty_history() {
  let h = Harness::new().await;
  let (status, body) = h.send("GET", "/trips/31337", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "trips": [] }));
}
