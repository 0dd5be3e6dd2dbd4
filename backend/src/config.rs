use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::env;
use thiserror::Error;
use tower_sessions::cookie::Key;

use crate::utils::cookies::SameSite;

pub const DEFAULT_SESSION_SECRET: &str = "gamevault-development-secret-change-me";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub session_secret: String,
    pub session_ttl_days: i64,
    pub steam_return_url: String,
    pub steam_realm: String,
    pub steam_api_key: Option<String>,
    pub admin_steam_id: Option<String>,
    pub port: u16,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    pub static_dir: String,
    pub cors_allow_origins: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `load` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url =
            get("DATABASE_URL").unwrap_or_else(|| "postgres://localhost/gamevault".to_string());
        let database_max_connections =
            parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 10)?;

        let session_secret =
            get("SESSION_SECRET").unwrap_or_else(|| DEFAULT_SESSION_SECRET.to_string());
        let session_ttl_days = parse_or("SESSION_TTL_DAYS", get("SESSION_TTL_DAYS"), 7)?;
        if session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "SESSION_TTL_DAYS",
                value: session_ttl_days.to_string(),
            });
        }

        let steam_return_url = get("STEAM_RETURN_URL")
            .unwrap_or_else(|| "http://localhost:3000/auth/steam/return".to_string());
        let steam_realm =
            get("STEAM_REALM").unwrap_or_else(|| "http://localhost:3000/".to_string());
        let steam_api_key = get("STEAM_API_KEY");
        let admin_steam_id = get("ADMIN_STEAM_ID").map(|id| id.trim().to_string());

        let port = parse_or("PORT", get("PORT"), 3000)?;
        let cookie_secure = parse_bool("COOKIE_SECURE", get("COOKIE_SECURE"), false)?;
        let cookie_same_site = match get("COOKIE_SAME_SITE") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "COOKIE_SAME_SITE",
                value: raw,
            })?,
            None => SameSite::Lax,
        };

        let static_dir = get("STATIC_DIR").unwrap_or_else(|| "public".to_string());
        let cors_allow_origins = get("CORS_ALLOW_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().trim_end_matches('/').to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            database_url,
            database_max_connections,
            session_secret,
            session_ttl_days,
            steam_return_url,
            steam_realm,
            steam_api_key,
            admin_steam_id,
            port,
            cookie_secure,
            cookie_same_site,
            static_dir,
            cors_allow_origins,
        })
    }

    pub fn uses_default_session_secret(&self) -> bool {
        self.session_secret == DEFAULT_SESSION_SECRET
    }

    /// Fixed lifetime of a signed-in session, counted from sign-in.
    pub fn session_ttl(&self) -> time::Duration {
        time::Duration::days(self.session_ttl_days)
    }

    /// Cookie signing key. The secret is stretched to the 64 bytes the
    /// signer requires.
    pub fn session_key(&self) -> Key {
        let digest = Sha512::digest(self.session_secret.as_bytes());
        Key::from(digest.as_slice())
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn parse_bool(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { key, value }),
        },
        None => Ok(default),
    }
}
