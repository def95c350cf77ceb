//! Data models for the screenshot service.
//!
//! Each submodule contains database row types (sqlx::FromRow) and/or
//! request/response types (serde) for one area of the API.

pub mod api_key;
pub mod billing;
pub mod capture;
pub mod dashboard;
pub mod profile;
pub mod stripe_event;
