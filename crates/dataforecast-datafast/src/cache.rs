//! Short-lived cache of successful upstream bodies.
//!
//! Entries are keyed by a SHA-256 digest of the credential together with the
//! endpoint and its query parameters, so two dashboards never share data.
//! Only successful responses are stored.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tokio::time::Instant;

use dataforecast_core::analytics::{ApiKey, Endpoint};

struct CachedBody {
    body: Value,
    expires_at: Instant,
}

pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedBody>>,
}

impl ResponseCache {
    /// A zero `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn key(credential: &ApiKey, endpoint: Endpoint, params: &[(&'static str, String)]) -> String {
        let digest = Sha256::digest(credential.expose().as_bytes());
        let mut pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort();
        format!("{}:{}?{}", hex::encode(&digest[..16]), endpoint.path(), pairs.join("&"))
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|cached| cached.expires_at > Instant::now())
            .map(|cached| cached.body.clone())
    }

    pub async fn insert(&self, key: String, body: Value) {
        if !self.is_enabled() {
            return;
        }
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, cached| cached.expires_at > now);
        entries.insert(
            key,
            CachedBody {
                body,
                expires_at: now + self.ttl,
            },
        );
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
