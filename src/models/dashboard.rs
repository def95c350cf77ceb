//! Response type for the dashboard read.

use serde::Serialize;

/// Everything the dashboard page needs in one response.
///
/// # Example
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
///
/// `usage_percent` is null when `credits_limit` is zero: the percentage is
/// undefined and the UI is expected to hide the meter rather than divide by
/// zero.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub plan: String,
    pub credits_limit: i32,
    pub usage: i64,

    pub usage_percent: Option<u8>,

    pub api_key: String,
}
