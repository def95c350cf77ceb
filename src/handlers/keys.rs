//! API key management handlers.

use crate::{
    AppState, error::AppError, middleware::auth::AuthContext,
    models::api_key::RotateKeyResponse, services::key_service,
};
use axum::{Extension, Json, extract::State};

/// Rotate the caller's API key.
///
/// # Endpoint
///
/// `POST /api/v1/keys/rotate`
///
/// # Process
///
/// Deactivates the current active key and issues a replacement in one
/// database transaction. The old key stops authenticating immediately; its
/// usage history stays attached to the deactivated row.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "key": "sk_live_a1b2c3d4...",
///   "created_at": "2025-01-15T10:30:00Z"
/// }
/// ```
pub async fn rotate_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<RotateKeyResponse>, AppError> {
    let key = key_service::rotate_key(&state.pool, auth.user_id).await?;

    Ok(Json(key.into()))
}
