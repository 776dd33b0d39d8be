//! Core types, the storage trait and the booking pipeline for the trip
//! planner.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Backends implement [`store::TripStore`]; the HTTP layer drives
//! [`planner::Planner`].

pub mod candidate;
pub mod entity;
pub mod error;
pub mod planner;
pub mod reference;
pub mod store;
pub mod trip;
pub mod user;

pub use entity::Entity;
pub use error::{Error, Result};
