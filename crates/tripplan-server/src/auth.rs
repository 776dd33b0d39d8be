//! Accounts: signup, login, and a Bearer-token extractor.
//!
//! Passwords are stored as argon2 PHC strings. Sessions are stateless HS256
//! JWTs carrying the user's name and id.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, StatusCode, header, request::Parts},
  response::IntoResponse,
};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tripplan_core::{
  store::TripStore,
  user::{NewUser, User},
};

use crate::{AppState, error::Error};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Token signing settings for this server instance.
pub struct AuthConfig {
  encoding:  EncodingKey,
  decoding:  DecodingKey,
  token_ttl: TimeDelta,
}

impl AuthConfig {
  /// Fails unless `token_ttl_minutes` is positive and an expiry that far
  /// from now is representable.
  pub fn new(secret: &str, token_ttl_minutes: i64) -> Result<Self, Error> {
    let token_ttl = TimeDelta::try_minutes(token_ttl_minutes)
      .filter(|ttl| *ttl > TimeDelta::zero())
      .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
      .ok_or_else(|| {
        Error::Config(format!("token_ttl_minutes out of range: {token_ttl_minutes}"))
      })?;
    Ok(Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      token_ttl,
    })
  }
}

// ─── Passwords ───────────────────────────────────────────────────────────────

pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// `false` for a wrong password or an unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
  PasswordHash::new(hash)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// The user name.
  pub sub:     String,
  pub user_id: i64,
  pub exp:     i64,
}

pub fn issue_token(config: &AuthConfig, user: &User) -> Result<String, Error> {
  let expires = Utc::now()
    .checked_add_signed(config.token_ttl)
    .ok_or_else(|| Error::Config("token expiry out of range".into()))?;
  let claims = Claims {
    sub:     user.user_name.clone(),
    user_id: user.user_id,
    exp:     expires.timestamp(),
  };
  Ok(encode(&Header::default(), &claims, &config.encoding)?)
}

pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, Error> {
  decode::<Claims>(token, &config.decoding, &Validation::default())
    .map(|data| data.claims)
    .map_err(|_| Error::Unauthorized)
}

fn bearer(headers: &HeaderMap) -> Result<&str, Error> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(Error::Unauthorized)
}

/// Present in a handler means the request carried a valid session token.
pub struct CurrentUser(pub Claims);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: TripStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer(&parts.headers)?;
    Ok(CurrentUser(verify_token(&state.auth, token)?))
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub email:    String,
  pub username: String,
  pub password: String,
  pub city:     String,
  pub country:  String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Session {
  pub message:  &'static str,
  pub user_id:  i64,
  pub username: String,
  pub token:    String,
}

/// `POST /auth/signup`: returns 201 + a session.
pub async fn signup<S: TripStore + 'static>(
  State(state): State<AppState<S>>,
  Json(body): Json<SignupBody>,
) -> Result<impl IntoResponse, Error> {
  if body.password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  let email = body.email.trim();
  let username = body.username.trim();
  if email.is_empty() || username.is_empty() {
    return Err(Error::BadRequest("email and username are required".into()));
  }

  let user = state
    .planner
    .store()
    .add_user(NewUser {
      user_name:     username.to_owned(),
      password_hash: Some(hash_password(&body.password)?),
      email:         email.to_owned(),
      city:          body.city,
      country:       body.country,
    })
    .await?;

  info!(user_id = user.user_id, "user signed up");
  let token = issue_token(&state.auth, &user)?;
  Ok((
    StatusCode::CREATED,
    Json(Session {
      message: "User created successfully",
      user_id: user.user_id,
      username: user.user_name,
      token,
    }),
  ))
}

/// `POST /auth/login`: 401 for an unknown email or a wrong password.
pub async fn login<S: TripStore + 'static>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<Session>, Error> {
  let user = state
    .planner
    .store()
    .find_user_by_email(body.email.trim())
    .await?
    .ok_or(Error::InvalidCredentials)?;

  let verified = user
    .password_hash
    .as_deref()
    .is_some_and(|hash| verify_password(&body.password, hash));
  if !verified {
    warn!(user_id = user.user_id, "login rejected");
    return Err(Error::InvalidCredentials);
  }

  let token = issue_token(&state.auth, &user)?;
  Ok(Json(Session {
    message: "Login successful",
    user_id: user.user_id,
    username: user.user_name,
    token,
  }))
}

/// `GET /auth/me`: the caller's profile.
pub async fn me<S: TripStore + 'static>(
  State(state): State<AppState<S>>,
  CurrentUser(claims): CurrentUser,
) -> Result<Json<User>, Error> {
  let user = state
    .planner
    .store()
    .get_user(claims.user_id)
    .await?
    .ok_or(Error::Unauthorized)?;
  Ok(Json(user))
}
