//! Request/response types for checkout session creation.

use serde::{Deserialize, Serialize};

/// Request to start a subscription checkout.
///
/// # Example
///
/// ```json
/// { "price_id": "price_1NxyzAbc" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
}

/// Response carrying the hosted checkout URL to redirect the user to.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}
