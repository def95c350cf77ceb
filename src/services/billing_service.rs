//! Billing service - webhook reconciliation and checkout session creation.
//!
//! The reconciler consumes verified Stripe events and updates the profile's
//! plan, credit limit, and customer reference. It never touches the capture
//! path. Checkout session creation is the outbound half: it talks to the
//! Stripe REST API with form-encoded requests and hands the hosted checkout
//! URL back to the caller.
//!
//! # Acknowledgment policy
//!
//! Signature verification failure is the only outcome that produces a non-200
//! webhook response. Everything after verification — unknown customers,
//! unrecognized event kinds, even a failed profile update — is acknowledged
//! with a 200, otherwise Stripe retries events this service can never act on.

use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::profile::{PRO_CREDITS_LIMIT, PRO_PLAN, Profile};
use crate::models::stripe_event::StripeEvent;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age (seconds) of a signed webhook timestamp.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Deadline for one Stripe REST round trip.
const STRIPE_TIMEOUT_SECS: u64 = 30;

/// Verify a `Stripe-Signature` header against the raw request body.
///
/// # Scheme
///
/// The header is a comma-separated list of `k=v` pairs carrying a unix
/// timestamp `t` and one or more `v1` HMAC-SHA256 signatures over the string
/// `"{t}.{body}"`, keyed with the shared webhook secret. Verification:
///
/// 1. Parse `t` and all `v1` entries from the header
/// 2. Reject timestamps more than 5 minutes from `now` (replay window)
/// 3. Accept if any `v1` matches; comparison is constant-time via `Mac::verify_slice`
///
/// # Errors
///
/// `SignatureInvalid` with a reason; the webhook handler surfaces it as a 400
/// with the reason as plain text, and nothing is written to the store.
pub fn verify_signature(
    secret: &str,
    header: &str,
    payload: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<String> = Vec::new();

    for pair in header.split(',') {
        match pair.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signatures.push(value.to_string()),
            _ => {} // v0 and unknown schemes are ignored
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| AppError::SignatureInvalid("No timestamp in signature header".into()))?;

    if signatures.is_empty() {
        return Err(AppError::SignatureInvalid(
            "No v1 signature in signature header".into(),
        ));
    }

    if (now.timestamp() - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(AppError::SignatureInvalid(
            "Timestamp outside the tolerance zone".into(),
        ));
    }

    let signed_payload = format!("{}.{}", timestamp, payload);

    for signature in &signatures {
        let Ok(signature_bytes) = hex::decode(signature) else {
            continue;
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| AppError::SignatureInvalid("Invalid webhook secret".into()))?;
        mac.update(signed_payload.as_bytes());

        if mac.verify_slice(&signature_bytes).is_ok() {
            return Ok(());
        }
    }

    Err(AppError::SignatureInvalid(
        "Signature mismatch for payload".into(),
    ))
}

/// Apply one verified payment event to the store.
///
/// # Event handling
///
/// - `checkout.session.completed`: resolve the profile by the user id stamped
///   into the session metadata; set the pro plan, its quota, and the customer
///   reference. Missing metadata is a no-op.
/// - `invoice.payment_succeeded`: renewal events omit our metadata, so the
///   profile is resolved by the stored customer reference; re-apply the pro
///   plan and quota. An unknown customer is a no-op, not an error — most
///   provider events are irrelevant to this application's subscriptions.
/// - anything else: no-op.
pub async fn reconcile(pool: &DbPool, event: StripeEvent) -> Result<(), AppError> {
    match event {
        StripeEvent::CheckoutSessionCompleted { user_id, customer } => {
            let Some(user_id) = user_id else {
                tracing::warn!("checkout.session.completed without user_id metadata, skipping");
                return Ok(());
            };

            let updated = sqlx::query(
                r#"
                UPDATE profiles
                SET plan = $1,
                    credits_limit = $2,
                    stripe_customer_id = COALESCE($3, stripe_customer_id),
                    updated_at = NOW()
                WHERE id = $4
                "#,
            )
            .bind(PRO_PLAN)
            .bind(PRO_CREDITS_LIMIT)
            .bind(&customer)
            .bind(user_id)
            .execute(pool)
            .await?
            .rows_affected();

            if updated == 0 {
                tracing::warn!(user_id = %user_id, "Checkout completed for unknown profile");
            } else {
                tracing::info!(user_id = %user_id, "Profile upgraded to pro");
            }
        }

        StripeEvent::InvoicePaymentSucceeded { customer } => {
            let Some(customer) = customer else {
                return Ok(());
            };

            let updated = sqlx::query(
                r#"
                UPDATE profiles
                SET plan = $1,
                    credits_limit = $2,
                    updated_at = NOW()
                WHERE stripe_customer_id = $3
                "#,
            )
            .bind(PRO_PLAN)
            .bind(PRO_CREDITS_LIMIT)
            .bind(&customer)
            .execute(pool)
            .await?
            .rows_affected();

            if updated == 0 {
                // Renewals for customers we never stored are expected noise
                tracing::debug!(customer, "Renewal for unknown customer, ignoring");
            } else {
                tracing::info!(customer, "Pro plan renewed");
            }
        }

        StripeEvent::Ignored(kind) => {
            tracing::debug!(kind, "Ignoring unhandled event kind");
        }
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    url: Option<String>,
}

/// Outbound client for the Stripe REST API.
///
/// Built once at startup and shared through application state, the same shape
/// as the capture client; reqwest's client is internally pooled and cheap to
/// clone.
#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    api_url: String,
    secret_key: String,
}

impl StripeClient {
    /// Build the client from configuration.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(STRIPE_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            api_url: config.stripe_api_url.clone(),
            secret_key: config.stripe_secret_key.clone(),
        })
    }

    /// One form-encoded POST to the Stripe REST API.
    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .post(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::Stripe(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Stripe(format!("{} - {}", status.as_u16(), body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Stripe(format!("Invalid response: {}", e)))
    }
}

/// Create a hosted checkout session for a subscription upgrade.
///
/// # Process
///
/// 1. Load the caller's profile (the Stripe customer needs its email)
/// 2. Reuse the stored customer reference, or create a customer and persist it
/// 3. Create the checkout session (one line item, subscription mode) and
///    return its hosted URL for the caller to redirect to
///
/// # Errors
///
/// - `ProfileNotFound`: the identity has no profile row yet
/// - `Stripe`: the Stripe REST API returned a non-success response
pub async fn create_checkout_session(
    pool: &DbPool,
    stripe: &StripeClient,
    config: &Config,
    user_id: Uuid,
    price_id: &str,
) -> Result<String, AppError> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::ProfileNotFound)?;

    // Reuse the stored customer, or create one and remember it
    let customer_id = match profile.stripe_customer_id {
        Some(id) => id,
        None => {
            let customer: StripeCustomer = stripe
                .post(
                    "/v1/customers",
                    &[
                        ("email", profile.email.clone()),
                        ("metadata[user_id]", user_id.to_string()),
                    ],
                )
                .await?;

            sqlx::query(
                "UPDATE profiles SET stripe_customer_id = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(&customer.id)
            .bind(user_id)
            .execute(pool)
            .await?;

            customer.id
        }
    };

    let session: StripeCheckoutSession = stripe
        .post(
            "/v1/checkout/sessions",
            &[
                ("customer", customer_id),
                ("line_items[0][price]", price_id.to_string()),
                ("line_items[0][quantity]", "1".to_string()),
                ("mode", "subscription".to_string()),
                (
                    "success_url",
                    format!("{}/dashboard?success=true", config.base_url),
                ),
                (
                    "cancel_url",
                    format!("{}/pricing?canceled=true", config.base_url),
                ),
                ("metadata[user_id]", user_id.to_string()),
            ],
        )
        .await?;

    session
        .url
        .ok_or_else(|| AppError::Stripe("Checkout session has no URL".into()))
}
