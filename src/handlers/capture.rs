//! Screenshot capture handler.
//!
//! Per-request sequencing is fixed: the auth middleware has already verified
//! the caller before this handler runs, the key lookup happens next, and the
//! external capture call goes last. Capture failures are returned as a 200
//! with a structured body (see [`crate::models::capture`]); the only HTTP
//! error this path can produce is the middleware's 401.

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::capture::{CaptureFailureKind, CaptureOutcome, CaptureRequest, CaptureResponse},
    services::key_service,
};
use axum::{Extension, Json, extract::State};

/// Capture a screenshot of a user-supplied URL.
///
/// # Endpoint
///
/// `POST /api/v1/capture`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com",
///   "display": "desktop"
/// }
/// ```
///
/// # Response
///
/// Always 200 with a structured outcome:
///
/// ```json
/// { "success": true, "image_base64": "iVBORw0..." }
/// ```
///
/// ```json
/// { "success": false, "error": "API Error: 500 - oops" }
/// ```
///
/// # Flow
///
/// 1. Resolve the caller's active API key, provisioning one on first use
/// 2. Forward the URL and viewport preset to the capture gateway
/// 3. Return the normalized outcome
///
/// A provisioning failure does not proceed unauthenticated against the
/// gateway; it comes back as a failure outcome with the dashboard hint.
pub async fn capture(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CaptureRequest>,
) -> Result<Json<CaptureResponse>, AppError> {
    if request.url.is_empty() {
        return Ok(Json(
            CaptureOutcome::failure(CaptureFailureKind::Validation, "URL is required.").into(),
        ));
    }

    // First capture attempt provisions a key lazily
    let api_key = match key_service::ensure_active_key(&state.pool, auth.user_id).await {
        Ok(key) => key,
        Err(AppError::ProvisioningFailed) => {
            return Ok(Json(CaptureOutcome::provisioning_failed().into()));
        }
        Err(e) => return Err(e),
    };

    let outcome = state
        .capture
        .capture(&api_key.key, &request.url, request.display)
        .await;

    Ok(Json(outcome.into()))
}
