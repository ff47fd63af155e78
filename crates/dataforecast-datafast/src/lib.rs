//! HTTP client for the DataFa.st analytics API.

pub mod cache;

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use dataforecast_core::analytics::{AnalyticsSource, ApiKey, Endpoint};
use dataforecast_core::error::{CoreError, SourceError};

use crate::cache::ResponseCache;

/// Read-only DataFa.st client.
///
/// Every request carries the caller's credential as a bearer token. There is
/// no retry and no timeout beyond reqwest's defaults.
pub struct DatafastClient {
    client: Client,
    base: String,
    cache: ResponseCache,
}

impl DatafastClient {
    pub fn new(api_base: &str, cache_ttl: Duration) -> Result<Self, CoreError> {
        let base = api_base.trim_end_matches('/').to_string();
        Url::parse(&base).map_err(|e| CoreError::Config(format!("invalid DataFa.st URL: {e}")))?;
        let client = Client::builder()
            .user_agent(concat!("dataforecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::Config(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            base,
            cache: ResponseCache::new(cache_ttl),
        })
    }

    fn url_for(&self, endpoint: Endpoint, params: &[(&'static str, String)]) -> Result<Url, SourceError> {
        let mut url = Url::parse(&format!("{}/{}", self.base, endpoint.path())).map_err(|e| {
            SourceError::Transport {
                endpoint: endpoint.path(),
                message: e.to_string(),
            }
        })?;
        if !params.is_empty() {
            let mut qs = url.query_pairs_mut();
            for (k, v) in params {
                qs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl AnalyticsSource for DatafastClient {
    async fn fetch(
        &self,
        credential: &ApiKey,
        endpoint: Endpoint,
        params: &[(&'static str, String)],
    ) -> Result<Value, SourceError> {
        let cache_key = ResponseCache::key(credential, endpoint, params);
        if let Some(body) = self.cache.get(&cache_key).await {
            debug!(%endpoint, "DataFa.st cache hit");
            return Ok(body);
        }

        let url = self.url_for(endpoint, params)?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|e| SourceError::Transport {
                endpoint: endpoint.path(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                endpoint: endpoint.path(),
                status: status.as_u16(),
            });
        }

        let body: Value = resp.json().await.map_err(|e| SourceError::Decode {
            endpoint: endpoint.path(),
            message: e.to_string(),
        })?;
        self.cache.insert(cache_key, body.clone()).await;
        debug!(%endpoint, "DataFa.st request ok");
        Ok(body)
    }
}
