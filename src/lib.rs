//! Screenshot Service - backend for a screenshot-capture SaaS.
//!
//! This is the API server behind the customer dashboard: it provisions
//! per-user API keys, forwards capture requests to the external screenshot
//! gateway, aggregates usage against the plan's credit limit, and reconciles
//! subscription state from Stripe webhooks. The service performs no rendering
//! or image processing itself; the capture gateway is a collaborator reached
//! over HTTP.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: session bearer tokens, SHA-256 hashed
//! - **Billing**: Stripe checkout + signed webhooks
//! - **Format**: JSON requests/responses

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::DbPool;
use crate::services::billing_service::StripeClient;
use crate::services::capture_service::CaptureClient;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub capture: CaptureClient,
    pub stripe: StripeClient,
}

/// Build the application router.
///
/// Handlers needing a verified caller sit behind the session auth middleware;
/// the health check and the webhook endpoint are public (the webhook carries
/// its own authenticity proof in the signature header).
pub fn app(state: AppState) -> Router {
    // Create authenticated routes (API endpoints)
    let authenticated_routes = Router::new()
        .route("/api/v1/capture", post(handlers::capture::capture))
        .route("/api/v1/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/api/v1/keys/rotate", post(handlers::keys::rotate_key))
        .route(
            "/api/v1/billing/checkout",
            post(handlers::billing::create_checkout),
        )
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Combine authenticated routes with public routes
    Router::new()
        // Public routes (no session required)
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/v1/webhooks/stripe",
            post(handlers::webhooks::stripe_webhook),
        )
        // Merge authenticated routes
        .merge(authenticated_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Share state with all handlers via State extraction
        .with_state(state)
}
