//! User profile model.
//!
//! Profiles hold the billing-relevant state for a user: plan, credit limit,
//! and the Stripe customer reference. Rows are created by the external
//! identity-provisioning step; this service reads them and lets the billing
//! reconciler update them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Plan and quota applied by the billing reconciler on paid subscriptions.
pub const PRO_PLAN: &str = "pro";
pub const PRO_CREDITS_LIMIT: i32 = 5000;

/// Defaults used by readers when no profile row exists yet.
pub const FREE_PLAN: &str = "free";
pub const FREE_CREDITS_LIMIT: i32 = 100;

/// Represents a user profile record from the database.
///
/// # Database Table
///
/// Maps to the `profiles` table with columns:
/// - `id`: The user identity (UUID, primary key — at most one profile per user)
/// - `email`: Address used when creating the Stripe customer
/// - `plan`: Plan name (`free`, `pro`)
/// - `credits_limit`: Requests permitted per billing period
/// - `stripe_customer_id`: Payment-provider customer reference, set on first checkout
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub plan: String,
    pub credits_limit: i32,
    pub stripe_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
