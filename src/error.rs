//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.
//!
//! Capture failures are deliberately NOT represented here: the capture path
//! returns a structured [`crate::models::capture::CaptureOutcome`] body with a
//! 200 status so the presentation layer can render an inline message. Only
//! authentication and request-shape problems escape as HTTP errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Missing, invalid, or expired session tokens
/// - **Provisioning Errors**: An API key could not be created or persisted
/// - **Billing Errors**: Webhook signature failures and Stripe API errors
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No verified caller identity: session token missing, unknown, or expired.
    ///
    /// Returns HTTP 401 Unauthorized. The presentation layer treats this as a
    /// signal to redirect to the sign-in flow.
    #[error("Unauthorized")]
    Unauthenticated,

    /// No profile row exists for the authenticated user.
    ///
    /// Returns HTTP 404 Not Found. Only raised by the checkout path, which
    /// needs the profile's email; readers elsewhere fall back to defaults.
    #[error("Profile not found")]
    ProfileNotFound,

    /// A new API key could not be created or persisted.
    ///
    /// Returns HTTP 500. Callers must treat this as a hard failure and never
    /// proceed without a key.
    #[error("Could not generate API key. Please visit dashboard.")]
    ProvisioningFailed,

    /// Webhook payload failed signature verification.
    ///
    /// Returns HTTP 400 with the verification error as a plain-text body,
    /// the only non-200 outcome a webhook delivery can produce.
    #[error("Webhook Error: {0}")]
    SignatureInvalid(String),

    /// The Stripe REST API returned a non-success response.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// Most errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// `SignatureInvalid` is the exception: Stripe expects a plain-text body, so
/// it is returned as `400 Webhook Error: <reason>` without the JSON envelope.
///
/// # Status Code Mapping
///
/// - `Unauthenticated` → 401 Unauthorized
/// - `ProfileNotFound` → 404 Not Found
/// - `ProvisioningFailed` → 500 Internal Server Error
/// - `SignatureInvalid` → 400 Bad Request (plain text)
/// - `Stripe` → 502 Bad Gateway
/// - `InvalidRequest` → 400 Bad Request
/// - `Database` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Signature failures go back to the provider as plain text
        if let AppError::SignatureInvalid(_) = self {
            return (StatusCode::BAD_REQUEST, self.to_string()).into_response();
        }

        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string())
            }
            AppError::ProfileNotFound => {
                (StatusCode::NOT_FOUND, "profile_not_found", self.to_string())
            }
            AppError::ProvisioningFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "provisioning_failed",
                self.to_string(),
            ),
            AppError::Stripe(ref msg) => (StatusCode::BAD_GATEWAY, "stripe_error", msg.clone()),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
            AppError::SignatureInvalid(_) => unreachable!("handled above"),
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Return the response with status code and JSON body
        (status, body).into_response()
    }
}
