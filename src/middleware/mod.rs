//! Middleware modules.
//!
//! Currently contains:
//! - `auth`: Session-token authentication middleware

pub mod auth;
