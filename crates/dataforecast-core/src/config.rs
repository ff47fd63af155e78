use std::time::Duration;

use chrono_tz::Tz;

use crate::error::CoreError;

pub const DEFAULT_API_BASE: &str = "https://datafa.st/api/v1/analytics";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// IANA timezone label sent upstream with every ranged request.
    pub timezone: String,
    pub api_base: String,
    /// Server-side fallback credential, used when the request carries no
    /// `datafast-api-key` cookie.
    pub default_api_key: Option<String>,
    pub cache_ttl_seconds: u64,
    pub forecast_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            timezone: "UTC".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            default_api_key: None,
            cache_ttl_seconds: 300,
            forecast_days: 7,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, CoreError> {
        let cfg = Self {
            port: std::env::var("DATAFORECAST_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| CoreError::Config(format!("invalid port: {e}")))?,
            timezone: std::env::var("DATAFORECAST_TIMEZONE")
                .unwrap_or_else(|_| "UTC".to_string()),
            api_base: std::env::var("DATAFAST_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            default_api_key: std::env::var("DATAFAST_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            cache_ttl_seconds: std::env::var("DATAFAST_CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
            forecast_days: std::env::var("DATAFORECAST_FORECAST_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .unwrap_or(7),
        };
        cfg.tz()?;
        Ok(cfg)
    }

    /// Parsed form of [`Config::timezone`].
    pub fn tz(&self) -> Result<Tz, CoreError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| CoreError::Config(format!("unknown timezone: {}", self.timezone)))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}
