//! Configuration module
//!
//! Settings come from the process environment (after loading `.env`). Parsing goes
//! through a lookup function so tests can feed a map instead of mutating the
//! environment.

use std::env;
use std::time::Duration;

use crate::constants::{
    shared_images_collection, DEFAULT_APP_ID, DEFAULT_MAX_FILE_SIZE_MB,
    DEFAULT_MAX_UPLOAD_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_SHARE_BASE_URL,
    PLACEHOLDER_FIREBASE_PROJECT_ID,
};
use crate::store_types::StoreBackend;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_LOCAL_STORE_PATH: &str = "./data";
const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_IDENTITY_TOOLKIT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_SECURE_TOKEN_BASE_URL: &str = "https://securetoken.googleapis.com/v1";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Document store and identity settings
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub app_id: String,
    pub local_store_path: String,
    pub firebase_project_id: Option<String>,
    pub firebase_api_key: Option<String>,
    /// Custom sign-in token; anonymous sign-in is used when absent.
    pub firebase_auth_token: Option<String>,
    pub firestore_base_url: String,
    pub identity_toolkit_base_url: String,
    /// Exchanges refresh tokens for new id tokens.
    pub secure_token_base_url: String,
}

/// Uploader settings
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub share_base_url: String,
    pub max_file_size_bytes: usize,
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub store: StoreConfig,
    pub upload: UploadConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match var("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let backend = match var("STORE_BACKEND") {
            Some(name) => name.parse()?,
            None => StoreBackend::Local,
        };

        let max_file_size_mb: usize = parse_var(&var, "MAX_FILE_SIZE_MB", DEFAULT_MAX_FILE_SIZE_MB)?;
        let max_file_size_bytes = max_file_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", max_file_size_mb))?;

        let max_attempts = parse_var(&var, "UPLOAD_MAX_ATTEMPTS", DEFAULT_MAX_UPLOAD_ATTEMPTS)?;
        let retry_base_delay_ms =
            parse_var(&var, "UPLOAD_RETRY_BASE_DELAY_MS", DEFAULT_RETRY_BASE_DELAY_MS)?;

        Ok(Config {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
            },
            store: StoreConfig {
                backend,
                app_id: var("APP_ID").unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
                local_store_path: var("LOCAL_STORE_PATH")
                    .unwrap_or_else(|| DEFAULT_LOCAL_STORE_PATH.to_string()),
                firebase_project_id: var("FIREBASE_PROJECT_ID"),
                firebase_api_key: var("FIREBASE_API_KEY"),
                firebase_auth_token: var("FIREBASE_AUTH_TOKEN"),
                firestore_base_url: var("FIRESTORE_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.to_string()),
                identity_toolkit_base_url: var("IDENTITY_TOOLKIT_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_IDENTITY_TOOLKIT_BASE_URL.to_string()),
                secure_token_base_url: var("SECURE_TOKEN_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_SECURE_TOKEN_BASE_URL.to_string()),
            },
            upload: UploadConfig {
                share_base_url: var("SHARE_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_SHARE_BASE_URL.to_string()),
                max_file_size_bytes,
                max_attempts,
                retry_base_delay: Duration::from_millis(retry_base_delay_ms),
            },
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload.max_attempts == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_ATTEMPTS must be at least 1"));
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be at least 1"));
        }

        let base_url = &self.upload.share_base_url;
        if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
            return Err(anyhow::anyhow!(
                "SHARE_BASE_URL must be an http(s) URL, got '{}'",
                base_url
            ));
        }

        if self.store.backend == StoreBackend::Firestore
            && !self.firebase_is_placeholder()
            && self.store.firebase_api_key.is_none()
        {
            return Err(anyhow::anyhow!(
                "FIREBASE_API_KEY must be set when using the firestore store backend"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.base.environment)
    }

    /// Collection path shared by the upload and view paths.
    pub fn collection_path(&self) -> String {
        shared_images_collection(&self.store.app_id)
    }

    /// True when the Firebase project id is unset or still the sample placeholder.
    ///
    /// The server then starts without a backend instead of failing.
    pub fn firebase_is_placeholder(&self) -> bool {
        match self.store.firebase_project_id.as_deref() {
            None => true,
            Some(id) => id == PLACEHOLDER_FIREBASE_PROJECT_ID,
        }
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }
}

/// Parse an optional numeric variable; a present but malformed value is an error.
fn parse_var<T, F>(var: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, value)),
        None => Ok(default),
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}
