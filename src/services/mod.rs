//! Business logic services.
//!
//! - `key_service`: API key provisioning and rotation
//! - `capture_service`: outbound client for the screenshot capture gateway
//! - `usage_service`: usage aggregation and quota math
//! - `billing_service`: Stripe webhook reconciliation and checkout sessions

pub mod billing_service;
pub mod capture_service;
pub mod key_service;
pub mod usage_service;
