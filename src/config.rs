use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::domain::pincode::Pincode;
use crate::infrastructure::cloudinary::CloudinaryConfig;
use crate::media::UploadLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable '{0}'")]
    Missing(&'static str),
    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub secret: Vec<u8>,
    pub days: i64,
    pub secure: bool,
    /// Test-mode login, only honoured outside production.
    pub test_login: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_pool_size: u32,
    pub db_connect_timeout_secs: u64,
    pub production: bool,
    pub session: SessionSettings,
    pub default_pincode: Pincode,
    pub identity_api_url: String,
    pub identity_api_key: String,
    pub admin_uids: Vec<String>,
    pub delivery_uids: Vec<String>,
    pub cloudinary: CloudinaryConfig,
    pub upload: UploadLimits,
    pub upload_max_attempts: u32,
    pub upload_retry_delay: Duration,
    pub http_timeout: Duration,
}

fn parse<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

fn list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok().filter(|v| !v.is_empty()))
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let secret = get("SESSION_SECRET").ok_or(ConfigError::Missing("SESSION_SECRET"))?;
        if secret.len() < 32 {
            return Err(ConfigError::Invalid {
                name: "SESSION_SECRET",
                reason: "must be at least 32 bytes".to_string(),
            });
        }

        let production = get("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));
        let test_login = if production {
            None
        } else {
            Some((
                get("TEST_LOGIN_EMAIL").unwrap_or_else(|| "test@example.com".to_string()),
                get("TEST_LOGIN_PASSWORD").unwrap_or_else(|| "password".to_string()),
            ))
        };

        let default_pincode = get("DEFAULT_PINCODE")
            .unwrap_or_else(|| "332211".to_string())
            .parse::<Pincode>()
            .map_err(|e| ConfigError::Invalid {
                name: "DEFAULT_PINCODE",
                reason: e.to_string(),
            })?;

        let folder = get("CLOUDINARY_FOLDER").unwrap_or_else(|| "products".to_string());
        let http_timeout = Duration::from_secs(parse("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"), 15)?);

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse("PORT", get("PORT"), 8080)?,
            database_url,
            db_pool_size: parse("DB_POOL_SIZE", get("DB_POOL_SIZE"), 10)?,
            db_connect_timeout_secs: parse(
                "DB_CONNECT_TIMEOUT_SECS",
                get("DB_CONNECT_TIMEOUT_SECS"),
                30,
            )?,
            production,
            session: SessionSettings {
                secret: secret.into_bytes(),
                days: parse("SESSION_DAYS", get("SESSION_DAYS"), 7)?,
                secure: parse("COOKIE_SECURE", get("COOKIE_SECURE"), production)?,
                test_login,
            },
            default_pincode,
            identity_api_url: get("IDENTITY_API_URL")
                .unwrap_or_else(|| "https://identitytoolkit.googleapis.com/v1".to_string()),
            identity_api_key: get("IDENTITY_API_KEY").unwrap_or_default(),
            admin_uids: list(get("ADMIN_UIDS")),
            delivery_uids: list(get("DELIVERY_UIDS")),
            cloudinary: CloudinaryConfig {
                cloud_name: get("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
                api_key: get("CLOUDINARY_API_KEY").unwrap_or_default(),
                api_secret: get("CLOUDINARY_API_SECRET").unwrap_or_default(),
                upload_preset: get("CLOUDINARY_UPLOAD_PRESET").unwrap_or_default(),
                api_base: get("CLOUDINARY_API_BASE")
                    .unwrap_or_else(|| "https://api.cloudinary.com".to_string()),
            },
            upload: UploadLimits {
                max_bytes: parse("IMAGE_MAX_BYTES", get("IMAGE_MAX_BYTES"), 5 * 1024 * 1024)?,
                attempt_timeout: http_timeout,
                folder,
            },
            upload_max_attempts: parse("UPLOAD_MAX_ATTEMPTS", get("UPLOAD_MAX_ATTEMPTS"), 3)?,
            upload_retry_delay: Duration::from_millis(parse(
                "UPLOAD_RETRY_DELAY_MS",
                get("UPLOAD_RETRY_DELAY_MS"),
                1000,
            )?),
            http_timeout,
        })
    }
}
