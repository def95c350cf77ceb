//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `CAPTURE_API_URL` (optional): screenshot capture endpoint, defaults to the hosted service
/// - `CAPTURE_TIMEOUT_SECS` (optional): upper bound on one capture round trip, defaults to 20
/// - `STRIPE_SECRET_KEY` (required): Stripe REST API key
/// - `STRIPE_WEBHOOK_SECRET` (required): shared secret for webhook signature verification
/// - `STRIPE_API_URL` (optional): Stripe API base URL, overridable for tests
/// - `BASE_URL` (optional): public base URL used for checkout redirect targets
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_capture_api_url")]
    pub capture_api_url: String,

    #[serde(default = "default_capture_timeout_secs")]
    pub capture_timeout_secs: u64,

    pub stripe_secret_key: String,

    pub stripe_webhook_secret: String,

    #[serde(default = "default_stripe_api_url")]
    pub stripe_api_url: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_capture_api_url() -> String {
    "https://api.easywebscreenshot.com/screenshot".to_string()
}

fn default_capture_timeout_secs() -> u64 {
    20
}

fn default_stripe_api_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }

    /// Configuration with placeholder values for offline tests.
    ///
    /// The database URL points at a server that is never contacted (tests use
    /// lazy pools), and the Stripe webhook secret is a fixed test value.
    pub fn test_default() -> Self {
        Self {
            database_url: "postgres://localhost:1/unused".to_string(),
            server_port: 0,
            capture_api_url: "http://127.0.0.1:9/screenshot".to_string(),
            capture_timeout_secs: 5,
            stripe_secret_key: "sk_test_placeholder".to_string(),
            stripe_webhook_secret: "whsec_test_secret".to_string(),
            stripe_api_url: "http://127.0.0.1:9".to_string(),
            base_url: "http://localhost:3000".to_string(),
        }
    }
}
