//! Shared helpers for integration tests.

use screenshot_service::{
    AppState, app, config::Config, db, services::billing_service::StripeClient,
    services::capture_service::CaptureClient,
};

/// Build the app with a lazy database pool (no PostgreSQL required).
///
/// Suitable for exercising paths that are rejected before any query runs:
/// missing auth headers, webhook signature failures, unrecognized events.
pub fn offline_app() -> axum::Router {
    let config = Config::test_default();
    let pool = db::create_lazy_pool(&config.database_url).expect("lazy pool");
    let capture = CaptureClient::with_endpoint(&config.capture_api_url);
    let stripe = StripeClient::new(&config).expect("stripe client");

    app(AppState {
        pool,
        config,
        capture,
        stripe,
    })
}
