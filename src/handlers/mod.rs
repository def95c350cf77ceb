//! HTTP request handlers organized by domain.

pub mod billing;
pub mod capture;
pub mod dashboard;
pub mod health;
pub mod keys;
pub mod webhooks;
