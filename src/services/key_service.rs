//! Key provisioning service - get-or-create and rotation of API keys.
//!
//! Both the capture path and the dashboard read go through
//! [`ensure_active_key`]; there is exactly one provisioning code path in the
//! service.
//!
//! # Concurrency
//!
//! Two concurrent first-time calls for the same user must not both create an
//! active key. The read and the write are therefore never split across two
//! unguarded calls: the insert is an upsert against the partial unique index
//! `api_keys (user_id) WHERE is_active`, so the loser of the race falls
//! through to a re-select and returns the winner's key.

use crate::{
    db::DbPool,
    error::AppError,
    models::api_key::{ApiKey, KEY_PREFIX},
};
use uuid::Uuid;

/// Return the user's active API key, creating one if none exists.
///
/// # Process
///
/// 1. Look up an active key for the user; if found, return it
/// 2. Generate a fresh key value (16 random bytes, hex, `sk_live_` prefix)
/// 3. Insert with `ON CONFLICT DO NOTHING` against the one-active-per-user index
/// 4. If the insert lost a race, re-select the winning row
///
/// # Errors
///
/// - `ProvisioningFailed`: no key could be created or read back — callers
///   must treat this as a hard failure, never proceed without a key
/// - `Database`: any other database error
pub async fn ensure_active_key(pool: &DbPool, user_id: Uuid) -> Result<ApiKey, AppError> {
    // Fast path: an active key already exists
    if let Some(existing) = find_active_key(pool, user_id).await? {
        return Ok(existing);
    }

    // No key found: attempt the atomic conditional insert. Uniqueness of the
    // value relies on entropy, not a storage-level collision check.
    let new_key = generate_api_key();

    let inserted = sqlx::query_as::<_, ApiKey>(
        r#"
        INSERT INTO api_keys (user_id, key, is_active)
        VALUES ($1, $2, true)
        ON CONFLICT (user_id) WHERE is_active DO NOTHING
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&new_key)
    .fetch_optional(pool)
    .await?;

    if let Some(key) = inserted {
        tracing::info!(user_id = %user_id, key_id = %key.id, "Provisioned new API key");
        return Ok(key);
    }

    // A concurrent call inserted first; its key is the active one now.
    find_active_key(pool, user_id)
        .await?
        .ok_or(AppError::ProvisioningFailed)
}

/// Rotate the user's API key: deactivate the old one, issue a new one.
///
/// Both steps run in one database transaction so there is never a window with
/// two active keys or none. The old key's row (and its usage history) is
/// preserved.
pub async fn rotate_key(pool: &DbPool, user_id: Uuid) -> Result<ApiKey, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE api_keys SET is_active = false WHERE user_id = $1 AND is_active")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let key = sqlx::query_as::<_, ApiKey>(
        r#"
        INSERT INTO api_keys (user_id, key, is_active)
        VALUES ($1, $2, true)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(generate_api_key())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = %user_id, key_id = %key.id, "Rotated API key");
    Ok(key)
}

/// Look up the user's active key, if any.
async fn find_active_key(pool: &DbPool, user_id: Uuid) -> Result<Option<ApiKey>, AppError> {
    let key = sqlx::query_as::<_, ApiKey>(
        "SELECT id, user_id, key, is_active, created_at
         FROM api_keys
         WHERE user_id = $1 AND is_active = true",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(key)
}

/// Generate a new API key value.
///
/// # Output
///
/// `sk_live_` followed by 32 hex characters (16 random bytes).
fn generate_api_key() -> String {
    let bytes: [u8; 16] = rand::random();
    format!("{}{}", KEY_PREFIX, hex::encode(bytes))
}
