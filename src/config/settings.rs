use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::qr_image::{CorrectionLevel, MAX_SIZE, MIN_SIZE};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub db_name: String,
    /// Overrides the request-derived base URL in generated links.
    pub public_base_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub default_qr_size: u32,
    pub default_qr_level: CorrectionLevel,
    pub analytics_enabled: bool,
    pub analytics_timeout: Duration,
    pub visitor_salt: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset or unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let default_qr_size = parse_or(&get, "QR_CODE_SIZE", 256u32);
        let default_qr_size = if (MIN_SIZE..=MAX_SIZE).contains(&default_qr_size) {
            default_qr_size
        } else {
            log::warn!(
                "QR_CODE_SIZE {} outside {}..={}, using 256",
                default_qr_size,
                MIN_SIZE,
                MAX_SIZE
            );
            256
        };

        let default_qr_level = match get("QR_CODE_LEVEL") {
            Some(level) => CorrectionLevel::parse(&level).unwrap_or_else(|| {
                log::warn!("Invalid QR_CODE_LEVEL value: {}, using medium", level);
                CorrectionLevel::Medium
            }),
            None => CorrectionLevel::Medium,
        };

        Self {
            host: get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&get, "SERVER_PORT", 3000u16),
            mongodb_uri: get("MONGODB_URI")
                .unwrap_or_else(|| "mongodb://localhost:27017".to_string()),
            db_name: get("DB_NAME").unwrap_or_else(|| "qr_platform".to_string()),
            public_base_url: get("PUBLIC_BASE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string()),
            cors_origins: get("CORS_ORIGINS")
                .unwrap_or_else(|| "http://localhost:5173".to_string())
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            default_qr_size,
            default_qr_level,
            analytics_enabled: parse_or(&get, "ANALYTICS_ENABLED", true),
            analytics_timeout: Duration::from_secs(parse_or(&get, "ANALYTICS_TIMEOUT_SECS", 5u64)),
            visitor_salt: get("VISITOR_SALT").unwrap_or_else(|| "qr_platform_salt".to_string()),
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            log::warn!("Invalid {} value {:?}: {}, using default: {}", key, raw, e, default);
            default
        }),
        None => default,
    }
}
