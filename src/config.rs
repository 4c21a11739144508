//! Application configuration loaded from environment variables.
//!
//! The backend (Firebase Auth + Firestore) is optional: without both an API
//! key and a project id the service runs in demo mode against the in-memory
//! store. Image hosting is optional in the same way.

use std::env;

/// Account that is treated as admin when no profile document says otherwise.
pub const DEFAULT_FALLBACK_ADMIN_EMAIL: &str = "admin@barberia.dev";

/// Firebase project settings. Present only when fully configured.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key used by the Auth REST API
    pub api_key: String,
    /// Project id used by Firestore
    pub project_id: String,
    /// `host:port` of the Auth emulator, if any
    pub auth_emulator_host: Option<String>,
}

/// Cloudinary unsigned-upload settings.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` means demo mode
    pub firebase: Option<FirebaseConfig>,
    /// `None` means placeholder image URLs
    pub cloudinary: Option<CloudinaryConfig>,
    /// Lower-cased email granted admin by the session fallback
    pub fallback_admin_email: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw.clone()))?,
            None => 8080,
        };

        Ok(Self {
            firebase: firebase_from_env(),
            cloudinary: cloudinary_from_env(),
            fallback_admin_email: non_empty("FALLBACK_ADMIN_EMAIL")
                .unwrap_or_else(|| DEFAULT_FALLBACK_ADMIN_EMAIL.to_string())
                .to_lowercase(),
            frontend_url: non_empty("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            port,
        })
    }

    /// Demo-mode config for tests.
    pub fn test_default() -> Self {
        Self {
            firebase: None,
            cloudinary: None,
            fallback_admin_email: DEFAULT_FALLBACK_ADMIN_EMAIL.to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
        }
    }

    pub fn demo_mode(&self) -> bool {
        self.firebase.is_none()
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn firebase_from_env() -> Option<FirebaseConfig> {
    match (non_empty("FIREBASE_API_KEY"), non_empty("FIREBASE_PROJECT_ID")) {
        (Some(api_key), Some(project_id)) => Some(FirebaseConfig {
            api_key,
            project_id,
            auth_emulator_host: non_empty("FIREBASE_AUTH_EMULATOR_HOST"),
        }),
        (None, None) => None,
        (api_key, _) => {
            tracing::warn!(
                has_api_key = api_key.is_some(),
                "Incomplete Firebase configuration, running in demo mode"
            );
            None
        }
    }
}

fn cloudinary_from_env() -> Option<CloudinaryConfig> {
    Some(CloudinaryConfig {
        cloud_name: non_empty("CLOUDINARY_CLOUD_NAME")?,
        upload_preset: non_empty("CLOUDINARY_UPLOAD_PRESET")?,
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
