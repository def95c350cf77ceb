//! Usage aggregation and quota math.
//!
//! Usage log entries are written by the capture gateway's accounting
//! pipeline; this service only reads and sums them. Entries are immutable, so
//! the aggregate is a pure sum over whatever rows exist at read time.

use crate::{db::DbPool, error::AppError};
use uuid::Uuid;

/// Total recorded requests for one API key.
///
/// Fetches every `request_count` referencing the key and sums in code,
/// treating NULL as zero. Returns 0 when no entries exist.
pub async fn usage_for(pool: &DbPool, key_id: Uuid) -> Result<i64, AppError> {
    let counts: Vec<Option<i32>> =
        sqlx::query_scalar("SELECT request_count FROM usage_logs WHERE key_id = $1")
            .bind(key_id)
            .fetch_all(pool)
            .await?;

    Ok(sum_counts(&counts))
}

/// Sum request counts, treating missing values as zero.
pub fn sum_counts(counts: &[Option<i32>]) -> i64 {
    counts
        .iter()
        .copied()
        .map(|count| count.unwrap_or(0) as i64)
        .sum()
}

/// Percentage of the credit limit consumed, clamped to 100.
///
/// Returns `None` when the limit is zero: the percentage is undefined and the
/// caller must not divide. Callers render "n/a" (or hide the meter) instead.
pub fn usage_percent(usage: i64, limit: i32) -> Option<u8> {
    if limit <= 0 {
        return None;
    }

    let percent = (usage as f64 / limit as f64 * 100.0).round();
    Some(percent.clamp(0.0, 100.0) as u8)
}
