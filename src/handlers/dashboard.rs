//! Dashboard read handler.

use crate::{
    AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::dashboard::DashboardResponse,
    models::profile::{FREE_CREDITS_LIMIT, FREE_PLAN, Profile},
    services::{key_service, usage_service},
};
use axum::{Extension, Json, extract::State};

/// Everything the dashboard page shows, in one read.
///
/// # Endpoint
///
/// `GET /api/v1/dashboard`
///
/// # Flow
///
/// 1. Load the profile; absent rows fall back to the free plan defaults
/// 2. Resolve the active API key, provisioning one on first visit
/// 3. Sum recorded usage for that key and compute the clamped percentage
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "plan": "free",
///   "credits_limit": 100,
///   "usage": 42,
///   "usage_percent": 42,
///   "api_key": "sk_live_a1b2c3d4..."
/// }
/// ```
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<DashboardResponse>, AppError> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(auth.user_id)
        .fetch_optional(&state.pool)
        .await?;

    // Plan and limit are defaulted by the reader when no profile row exists
    let (plan, credits_limit) = match profile {
        Some(p) => (p.plan, p.credits_limit),
        None => (FREE_PLAN.to_string(), FREE_CREDITS_LIMIT),
    };

    let api_key = key_service::ensure_active_key(&state.pool, auth.user_id).await?;
    let usage = usage_service::usage_for(&state.pool, api_key.id).await?;

    Ok(Json(DashboardResponse {
        plan,
        credits_limit,
        usage,
        usage_percent: usage_service::usage_percent(usage, credits_limit),
        api_key: api_key.key,
    }))
}
