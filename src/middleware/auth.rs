//! Session-token authentication middleware.
//!
//! Sessions are issued by the external identity provider; this service only
//! verifies them. The middleware intercepts every protected request to:
//! 1. Extract the session token from the Authorization header
//! 2. Hash it and look up an unexpired session in the database
//! 3. Inject the caller identity into the request
//! 4. Reject unauthorized requests with HTTP 401
//!
//! Handlers never read ambient authentication state: the resolved identity is
//! passed down explicitly as [`AuthContext`], so the services below stay
//! testable without the hosting runtime.

use crate::{AppState, error::AppError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Authentication context attached to authenticated requests.
///
/// This struct is inserted into the request's extension map and can be
/// extracted by route handlers to know who made the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Identity of the authenticated user
    ///
    /// Every service call takes this explicitly; row-level ownership of
    /// profiles, keys, and usage is keyed on it.
    pub user_id: Uuid,
}

/// Session authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header from request
/// 2. Hash the `<token>` using SHA-256
/// 3. Query database for a matching session with `expires_at` in the future
/// 4. If found: inject `AuthContext`, call next handler
/// 5. If not found: return 401 Unauthorized
///
/// # Headers
///
/// Expected header format:
/// ```text
/// Authorization: Bearer abc123xyz
/// ```
///
/// # Returns
///
/// - `Ok(Response)` if authenticated successfully (calls next handler)
/// - `Err(AppError::Unauthenticated)` if authentication fails (returns 401)
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Step 1: Extract Authorization header
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;

    // Step 2: Extract Bearer token
    // Expected format: "Bearer <session_token>"
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthenticated)?;

    // Step 3: Hash the token; only the hash is stored
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let token_hash = hex::encode(hasher.finalize());

    // Step 4: Lookup unexpired session
    let user_id: Uuid = sqlx::query_scalar(
        "SELECT user_id
         FROM sessions
         WHERE token_hash = $1 AND expires_at > NOW()",
    )
    .bind(&token_hash)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::Unauthenticated)?;

    // Step 5: Inject context into request extensions
    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(AuthContext { user_id });

    // Step 6: Call the next middleware/handler
    Ok(next.run(request).await)
}
