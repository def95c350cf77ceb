//! Inbound Stripe webhook handler.
//!
//! Public endpoint (no session auth): authenticity comes from the signature
//! header, verified before anything else happens. After verification the
//! delivery is always acknowledged with a 200, even when the payload cannot
//! be parsed or the profile update fails — a non-200 would only make Stripe
//! redeliver an event this service cannot act on. Signature failure is the
//! single 400 path.

use crate::{AppState, error::AppError, models::stripe_event::StripeEvent, services::billing_service};
use axum::{extract::State, http::HeaderMap};
use chrono::Utc;

/// Handle one webhook delivery from Stripe.
///
/// # Endpoint
///
/// `POST /api/v1/webhooks/stripe`
///
/// # Flow
///
/// 1. Verify the `Stripe-Signature` header against the raw body (400 on failure)
/// 2. Parse the event into the recognized kinds (unrecognized → no-op)
/// 3. Reconcile profile state; errors are logged, never surfaced
/// 4. Respond `200 Webhook received`
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<&'static str, AppError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::SignatureInvalid("Missing Stripe-Signature header".into()))?;

    billing_service::verify_signature(
        &state.config.stripe_webhook_secret,
        signature,
        &body,
        Utc::now(),
    )?;

    // Past this point every outcome acknowledges the delivery
    match StripeEvent::parse(&body) {
        Some(event) => {
            if let Err(e) = billing_service::reconcile(&state.pool, event).await {
                tracing::error!(error = %e, "Webhook reconciliation failed");
            }
        }
        None => {
            tracing::warn!("Webhook payload was not a recognizable event, acknowledging anyway");
        }
    }

    Ok("Webhook received")
}
