//! Checkout handler for subscription upgrades.

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::billing::{CheckoutRequest, CheckoutResponse},
    services::billing_service,
};
use axum::{Extension, Json, extract::State};

/// Start a hosted checkout session for the pro subscription.
///
/// # Endpoint
///
/// `POST /api/v1/billing/checkout`
///
/// # Request Body
///
/// ```json
/// { "price_id": "price_1NxyzAbc" }
/// ```
///
/// # Response (200 OK)
///
/// ```json
/// { "checkout_url": "https://checkout.stripe.com/c/pay/cs_..." }
/// ```
///
/// The caller redirects the user to `checkout_url`; completion comes back
/// asynchronously through the webhook, which performs the actual plan
/// upgrade.
pub async fn create_checkout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    if request.price_id.is_empty() {
        return Err(AppError::InvalidRequest("price_id is required".to_string()));
    }

    let checkout_url = billing_service::create_checkout_session(
        &state.pool,
        &state.stripe,
        &state.config,
        auth.user_id,
        &request.price_id,
    )
    .await?;

    Ok(Json(CheckoutResponse { checkout_url }))
}
