//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; there is no runtime reload.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase Realtime Database base URL (e.g. `https://app.firebaseio.com`)
    pub firebase_database_url: String,
    /// Optional database auth token appended to REST calls
    pub firebase_auth_token: Option<String>,
    /// Firebase Storage bucket holding uploaded challenge media
    pub firebase_storage_bucket: String,
    /// Airtable API key for the challenge-entry base
    pub airtable_api_key: String,
    /// Airtable base id
    pub airtable_base_id: String,
    /// Airtable table holding media challenge entries
    pub airtable_table: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            firebase_database_url: env::var("FIREBASE_DATABASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_DATABASE_URL"))?,
            firebase_auth_token: env::var("FIREBASE_AUTH_TOKEN").ok(),
            firebase_storage_bucket: env::var("FIREBASE_STORAGE_BUCKET")
                .map_err(|_| ConfigError::Missing("FIREBASE_STORAGE_BUCKET"))?,
            airtable_api_key: env::var("AIRTABLE_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("AIRTABLE_API_KEY"))?,
            airtable_base_id: env::var("AIRTABLE_BASE_ID")
                .map_err(|_| ConfigError::Missing("AIRTABLE_BASE_ID"))?,
            airtable_table: env::var("AIRTABLE_TABLE")
                .unwrap_or_else(|_| "Challenges".to_string()),
        })
    }

    /// Fixed config for tests; no network endpoint behind it is real.
    pub fn test_default() -> Self {
        Self {
            firebase_database_url: "https://test-project.firebaseio.test".to_string(),
            firebase_auth_token: None,
            firebase_storage_bucket: "test-project.appspot.test".to_string(),
            airtable_api_key: "key_test".to_string(),
            airtable_base_id: "app_test".to_string(),
            airtable_table: "Challenges".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
