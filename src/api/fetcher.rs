//! Cache-aware fetcher
//!
//! Consults the cache, falls back to the transport, classifies failures, and
//! stores successful payloads verbatim.

use std::time::Duration;

use serde_json::Value;

use super::transport::{Transport, TransportError};
use crate::cache::{CacheStore, RequestSignature};
use crate::error::RadarError;

/// Longest raw-body excerpt quoted in a provider error
const MAX_DETAIL_CHARS: usize = 160;

const NO_DETAIL: &str = "no additional details";

/// A decoded payload and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub payload: Value,
    pub cache_hit: bool,
}

/// Fetches JSON payloads through a cache
pub struct Fetcher<C, T> {
    cache: C,
    transport: T,
    bearer_token: Option<String>,
}

impl<C: CacheStore, T: Transport> Fetcher<C, T> {
    pub fn new(cache: C, transport: T, bearer_token: Option<String>) -> Self {
        Self {
            cache,
            transport,
            bearer_token,
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches `signature`, serving it from the cache when fresh
    ///
    /// The cache is skipped entirely when `bypass_cache` is set or `ttl` is
    /// zero. The bearer token is only required when the network is used.
    pub async fn fetch(
        &self,
        signature: &RequestSignature,
        ttl: Duration,
        bypass_cache: bool,
    ) -> Result<Fetched, RadarError> {
        let use_cache = !bypass_cache && !ttl.is_zero();

        if use_cache {
            if let Some(payload) = self.cache.get(signature, ttl) {
                tracing::debug!(url = %signature, "cache hit");
                return Ok(Fetched {
                    payload,
                    cache_hit: true,
                });
            }
        }

        let token = self
            .bearer_token
            .as_deref()
            .ok_or_else(|| RadarError::Auth("Missing X_BEARER_TOKEN env var".to_string()))?;

        tracing::debug!(url = %signature, "cache miss, requesting");
        let response = self
            .transport
            .get(signature.url(), token)
            .await
            .map_err(|e| match e {
                TransportError::Timeout => {
                    RadarError::Network("Request to X API timed out".to_string())
                }
                TransportError::Connect(reason) => {
                    RadarError::Network(format!("Network error while calling X API: {reason}"))
                }
            })?;

        if !response.is_success() {
            tracing::info!(status = response.status, url = %signature, "X API returned an error status");
            return Err(RadarError::Provider {
                status: response.status,
                reason: response.reason,
                detail: error_detail(&response.body),
            });
        }

        let payload: Value = serde_json::from_str(&response.body)
            .map_err(|_| RadarError::Protocol("X API returned invalid JSON response".to_string()))?;

        if use_cache {
            self.cache.put(signature, &payload);
        }

        Ok(Fetched {
            payload,
            cache_hit: false,
        })
    }
}

/// Best-effort human-readable detail from a provider error body
///
/// Precedence: first entry of `errors` (`message`, `detail`, `title`), then the
/// top-level `detail`, `title`, `error`, then a whitespace-collapsed excerpt of
/// a non-JSON body.
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => {
            let first_error = obj
                .get("errors")
                .and_then(Value::as_array)
                .and_then(|errors| errors.first())
                .and_then(Value::as_object);

            let found = match first_error {
                Some(err) => first_present(err, &["message", "detail", "title"]),
                None => first_present(&obj, &["detail", "title", "error"]),
            };
            found.unwrap_or_else(|| NO_DETAIL.to_string())
        }
        Ok(_) => NO_DETAIL.to_string(),
        Err(_) => {
            let compact = body.split_whitespace().collect::<Vec<_>>().join(" ");
            if compact.is_empty() {
                NO_DETAIL.to_string()
            } else {
                compact.chars().take(MAX_DETAIL_CHARS).collect()
            }
        }
    }
}

fn first_present(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| match value {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::testing::ScriptedTransport;
    use crate::cache::DiskCache;
    use serde_json::json;
    use tempfile::TempDir;
    use url::Url;

    const TTL: Duration = Duration::from_secs(900);

    fn signature() -> RequestSignature {
        let base = Url::parse("https://api.x.com/2").unwrap();
        RequestSignature::new(&base, &["tweets"], [("ids", "1")])
    }

    fn fetcher(
        transport: ScriptedTransport,
        token: Option<&str>,
    ) -> (Fetcher<DiskCache, ScriptedTransport>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = DiskCache::new(temp_dir.path());
        (
            Fetcher::new(cache, transport, token.map(str::to_string)),
            temp_dir,
        )
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let transport = ScriptedTransport::new().reply(200, r#"{"data":[{"id":"1"}]}"#);
        let (fetcher, _dir) = fetcher(transport, Some("token"));

        let first = fetcher.fetch(&signature(), TTL, false).await.unwrap();
        assert!(!first.cache_hit);
        assert_eq!(first.payload, json!({"data": [{"id": "1"}]}));

        let second = fetcher.fetch(&signature(), TTL, false).await.unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.payload, first.payload);
        assert_eq!(fetcher.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_needs_no_token() {
        let (fetcher, _dir) = fetcher(ScriptedTransport::new(), None);
        fetcher.cache().put(&signature(), &json!({"data": []}));

        let fetched = fetcher.fetch(&signature(), TTL, false).await.unwrap();
        assert!(fetched.cache_hit);
        assert!(fetcher.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_on_miss_is_auth_error() {
        let (fetcher, _dir) = fetcher(ScriptedTransport::new(), None);

        let err = fetcher.fetch(&signature(), TTL, false).await.unwrap_err();
        assert!(matches!(err, RadarError::Auth(_)));
        assert!(err.to_string().contains("Missing X_BEARER_TOKEN"));
        assert!(fetcher.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_bypass_ignores_and_does_not_write_cache() {
        let transport = ScriptedTransport::new()
            .reply(200, r#"{"data":[{"id":"fresh"}]}"#);
        let (fetcher, _dir) = fetcher(transport, Some("token"));
        fetcher.cache().put(&signature(), &json!({"data": [{"id": "stale"}]}));

        let fetched = fetcher.fetch(&signature(), TTL, true).await.unwrap();
        assert!(!fetched.cache_hit);
        assert_eq!(fetched.payload["data"][0]["id"], "fresh");

        // The earlier entry is untouched
        let cached = fetcher.cache().get(&signature(), TTL).unwrap();
        assert_eq!(cached["data"][0]["id"], "stale");
    }

    #[tokio::test]
    async fn test_zero_ttl_skips_cache() {
        let transport = ScriptedTransport::new()
            .reply(200, r#"{"data":[]}"#)
            .reply(200, r#"{"data":[]}"#);
        let (fetcher, dir) = fetcher(transport, Some("token"));

        fetcher.fetch(&signature(), Duration::ZERO, false).await.unwrap();
        let second = fetcher.fetch(&signature(), Duration::ZERO, false).await.unwrap();

        assert!(!second.cache_hit);
        assert_eq!(fetcher.transport().requests().len(), 2);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_provider_error_uses_errors_message() {
        let body = r#"{"errors":[{"message":"Invalid query","title":"ignored"}]}"#;
        let (fetcher, _dir) = fetcher(ScriptedTransport::new().reply(400, body), Some("token"));

        let err = fetcher.fetch(&signature(), TTL, false).await.unwrap_err();
        match &err {
            RadarError::Provider { status, detail, .. } => {
                assert_eq!(*status, 400);
                assert_eq!(detail, "Invalid query");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "X API request failed (400 Bad Request): Invalid query"
        );
    }

    #[tokio::test]
    async fn test_provider_error_is_not_cached() {
        let transport = ScriptedTransport::new()
            .reply(503, "Service Unavailable")
            .reply(200, r#"{"data":[]}"#);
        let (fetcher, _dir) = fetcher(transport, Some("token"));

        assert!(fetcher.fetch(&signature(), TTL, false).await.is_err());
        let fetched = fetcher.fetch(&signature(), TTL, false).await.unwrap();
        assert!(!fetched.cache_hit);
    }

    #[tokio::test]
    async fn test_invalid_json_is_protocol_error() {
        let (fetcher, _dir) = fetcher(ScriptedTransport::new().reply(200, "<html>"), Some("token"));

        let err = fetcher.fetch(&signature(), TTL, false).await.unwrap_err();
        assert!(matches!(err, RadarError::Protocol(_)));
        assert_eq!(err.to_string(), "X API returned invalid JSON response");
    }

    #[tokio::test]
    async fn test_transport_failures_are_network_errors() {
        let transport = ScriptedTransport::new()
            .fail(TransportError::Timeout)
            .fail(TransportError::Connect("connection refused".to_string()));
        let (fetcher, _dir) = fetcher(transport, Some("token"));

        let timeout = fetcher.fetch(&signature(), TTL, false).await.unwrap_err();
        assert!(matches!(timeout, RadarError::Network(_)));
        assert_eq!(timeout.to_string(), "Request to X API timed out");

        let refused = fetcher.fetch(&signature(), TTL, false).await.unwrap_err();
        assert_eq!(
            refused.to_string(),
            "Network error while calling X API: connection refused"
        );
    }

    #[test]
    fn test_error_detail_precedence() {
        assert_eq!(
            error_detail(r#"{"errors":[{"detail":"d","title":"t"}]}"#),
            "d"
        );
        assert_eq!(error_detail(r#"{"errors":[{"title":"t"}]}"#), "t");
        assert_eq!(
            error_detail(r#"{"title":"Unauthorized","detail":"Unauthorized access","type":"about:blank"}"#),
            "Unauthorized access"
        );
        assert_eq!(error_detail(r#"{"error":"rate limited"}"#), "rate limited");
        assert_eq!(error_detail(r#"{"errors":[]}"#), NO_DETAIL);
        assert_eq!(error_detail(r#"{"errors":[{}]}"#), NO_DETAIL);
        assert_eq!(error_detail("[1,2]"), NO_DETAIL);
        assert_eq!(error_detail(""), NO_DETAIL);
    }

    #[test]
    fn test_error_detail_truncates_raw_body() {
        let body = format!("  Bad\n\n gateway {}", "x".repeat(500));
        let detail = error_detail(&body);
        assert!(detail.starts_with("Bad gateway x"));
        assert_eq!(detail.chars().count(), MAX_DETAIL_CHARS);
    }
}
