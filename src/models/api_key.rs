//! API key model.
//!
//! API keys identify a user to the external capture gateway. The key value is
//! a bearer secret: it is generated with 16 bytes of entropy, prefixed with
//! `sk_live_`, shown on the dashboard, and forwarded verbatim in the
//! `x-api-key` header of capture requests. Keys are stored in plaintext
//! because both of those uses need the original value back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Fixed prefix distinguishing API keys from other secret classes.
pub const KEY_PREFIX: &str = "sk_live_";

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier (UUID)
/// - `user_id`: Owner identity
/// - `key`: The bearer secret (`sk_live_` + 32 hex characters)
/// - `is_active`: Whether the key is currently valid
/// - `created_at`: When the key was created
///
/// A partial unique index on `(user_id) WHERE is_active` guarantees at most
/// one active key per user; provisioning's upsert relies on it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKey {
    /// Unique identifier for this API key, referenced by usage log entries
    pub id: Uuid,

    /// Owner of this key
    pub user_id: Uuid,

    /// The key value itself
    pub key: String,

    /// Whether this API key is currently active
    ///
    /// Rotation deactivates the old key instead of deleting it, preserving
    /// the usage history attached to its id.
    pub is_active: bool,

    /// Timestamp when this API key was created
    pub created_at: DateTime<Utc>,
}

/// Response when rotating an API key.
///
/// # Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "key": "sk_live_a1b2c3d4...",
///   "created_at": "2025-01-15T10:30:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct RotateKeyResponse {
    pub id: Uuid,
    pub key: String,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for RotateKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            key: key.key,
            created_at: key.created_at,
        }
    }
}
