//! Accounts: travellers and administrators.
//!
//! Password credentials are opaque PHC strings here; hashing and verification
//! happen at the HTTP edge.

use serde::{Deserialize, Serialize};

/// A registered traveller. Created at signup and never deleted by the
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       i64,
  pub user_name:     String,
  #[serde(skip_serializing, default)]
  pub password_hash: Option<String>,
  /// Unique across all users.
  pub email:         String,
  pub city:          String,
  pub country:       String,
}

/// Input to [`crate::store::TripStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub user_name:     String,
  pub password_hash: Option<String>,
  pub email:         String,
  pub city:          String,
  pub country:       String,
}

/// An operator account. Orthogonal to the booking pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
  pub admin_id:      i64,
  pub username:      String,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  /// 1 (read-only) through 3 (full control).
  pub access_level:  u8,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
  pub username:      String,
  pub password_hash: String,
  pub access_level:  u8,
}
