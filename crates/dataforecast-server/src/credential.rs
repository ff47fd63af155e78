use axum::http::{header, HeaderMap};

use dataforecast_core::analytics::ApiKey;

/// Cookie the landing page sets after the user pastes a key. URL-encoded.
pub const API_KEY_COOKIE: &str = "datafast-api-key";

/// Resolve the bearer credential for one request.
///
/// A non-empty `datafast-api-key` cookie wins; otherwise the server-side
/// default is used. The key's shape is not checked here, an invalid key just
/// makes every upstream request fail.
pub fn resolve_credential(headers: &HeaderMap, default_key: Option<&str>) -> Option<ApiKey> {
    cookie_value(headers, API_KEY_COOKIE)
        .and_then(ApiKey::new)
        .or_else(|| default_key.and_then(ApiKey::new))
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .find_map(|c| {
            let (k, v) = c.trim().split_once('=')?;
            (k == name).then(|| decode_component(v))
        })
}

fn decode_component(raw: &str) -> String {
    url::form_urlencoded::parse(format!("v={raw}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}
