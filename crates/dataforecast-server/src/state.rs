use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

use dataforecast_core::{
    analytics::AnalyticsSource, config::Config, error::CoreError, ranges::local_today,
};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Holds no per-request data: the credential is resolved inside each handler
/// and passed down explicitly.
pub struct AppState {
    /// Upstream analytics provider. The DataFa.st client in production.
    pub source: Arc<dyn AnalyticsSource>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    tz: Tz,
}

impl AppState {
    pub fn new(source: Arc<dyn AnalyticsSource>, config: Config) -> Result<Self, CoreError> {
        let tz = config.tz()?;
        Ok(Self {
            source,
            config: Arc::new(config),
            tz,
        })
    }

    /// Current calendar date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        local_today(Utc::now(), &self.tz)
    }
}
