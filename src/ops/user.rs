//! Recent original posts by one author
//!
//! Two sequential fetches: username → user id, then the user's timeline. Each
//! fetch contributes its own cost and cache flag.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::window::window_start;
use super::{user_lookup_signature, user_tweets_signature, Radar, DEFAULT_TTL};
use crate::api::Transport;
use crate::cache::CacheStore;
use crate::data::{items_from, rank, FetchCost, FilterSpec, SortKey};
use crate::envelope::{passthrough, Envelope, ErrorBody, Metadata, UserCacheFlags};
use crate::error::RadarError;

/// Inputs to a user timeline listing
#[derive(Debug, Clone, PartialEq)]
pub struct UserTweetsParams {
    /// Handle, with or without a leading `@`
    pub username: String,
    pub limit: usize,
    pub sort: SortKey,
    pub since: Option<String>,
    pub filters: FilterSpec,
    pub no_cache: bool,
}

impl UserTweetsParams {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            limit: 10,
            sort: SortKey::Recent,
            since: None,
            filters: FilterSpec::default(),
            no_cache: false,
        }
    }
}

/// The user id from a lookup payload, if the user exists
fn user_id(payload: &Value) -> Option<String> {
    match payload.get("data")?.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl<C: CacheStore, T: Transport> Radar<C, T> {
    /// Lists a user's recent original posts, ranked
    ///
    /// An unknown username yields an envelope with a `not_found` error and no
    /// timeline request.
    pub async fn user_tweets(
        &self,
        params: UserTweetsParams,
        now: DateTime<Utc>,
    ) -> Result<Envelope, RadarError> {
        let handle = params.username.trim().trim_start_matches('@');
        if handle.is_empty() {
            return Err(RadarError::Validation("--username must not be empty".to_string()));
        }

        let since = params.since.filter(|s| !s.trim().is_empty());
        let start_time = since
            .as_deref()
            .map(|s| window_start(now, s))
            .transpose()?;

        let lookup_sig = user_lookup_signature(self.api_base(), handle);
        let lookup = self.fetcher().fetch(&lookup_sig, DEFAULT_TTL, params.no_cache).await?;
        let lookup_cost = FetchCost::user_lookup(lookup.cache_hit);

        let Some(id) = user_id(&lookup.payload) else {
            tracing::info!(username = %handle, "user not found");
            let metadata = Metadata::UserTweets {
                username: params.username.clone(),
                since,
                sort: params.sort,
                filters: params.filters,
                cache: UserCacheFlags {
                    user_lookup_hit: lookup.cache_hit,
                    tweets_hit: false,
                },
                returned: 0,
                cost: lookup_cost.estimate(),
            };
            let mut envelope = Envelope::new(metadata, Vec::new());
            envelope.user = passthrough(&lookup.payload, "data");
            envelope.errors = passthrough(&lookup.payload, "errors");
            envelope.error = Some(ErrorBody::new(
                "not_found",
                format!("user not found: {handle}"),
            ));
            return Ok(envelope);
        };

        let timeline_sig = user_tweets_signature(self.api_base(), &id, start_time.as_deref());
        let timeline = self.fetcher().fetch(&timeline_sig, DEFAULT_TTL, params.no_cache).await?;

        let items = items_from(&timeline.payload);
        let timeline_cost = FetchCost::posts(timeline.cache_hit, items.len());
        let cost = [lookup_cost, timeline_cost].into_iter().sum::<FetchCost>().estimate();
        let ranked = rank(items, &params.filters, params.sort, params.limit);

        tracing::info!(
            username = %handle,
            user_lookup_hit = lookup.cache_hit,
            tweets_hit = timeline.cache_hit,
            returned = ranked.len(),
            "user timeline complete"
        );

        let metadata = Metadata::UserTweets {
            username: params.username.clone(),
            since,
            sort: params.sort,
            filters: params.filters,
            cache: UserCacheFlags {
                user_lookup_hit: lookup.cache_hit,
                tweets_hit: timeline.cache_hit,
            },
            returned: ranked.len(),
            cost,
        };

        let mut envelope = Envelope::new(metadata, ranked);
        envelope.user = passthrough(&lookup.payload, "data");
        envelope.meta = passthrough(&timeline.payload, "meta");
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::ops::test_support::{base, radar};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 14, 9, 0, 0).unwrap()
    }

    fn user_body() -> String {
        json!({"data": {"id": "u1", "username": "alice", "name": "Alice"}}).to_string()
    }

    fn timeline_body() -> String {
        json!({
            "data": [
                {"id": "t1", "created_at": "2026-01-01T00:00:00Z",
                 "public_metrics": {"like_count": 1, "reply_count": 0, "retweet_count": 0}},
                {"id": "t2", "created_at": "2026-01-02T00:00:00Z",
                 "public_metrics": {"like_count": 0, "reply_count": 0, "retweet_count": 0}}
            ],
            "meta": {"result_count": 2}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_both_misses_cost_two_requests() {
        let transport = ScriptedTransport::new()
            .reply(200, &user_body())
            .reply(200, &timeline_body());
        let (radar, _dir) = radar(transport, Some("token"));

        let envelope = radar
            .user_tweets(UserTweetsParams::new("@alice"), now())
            .await
            .unwrap();
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["x_radar"]["mode"], "user-tweets");
        assert_eq!(value["x_radar"]["username"], "@alice");
        assert_eq!(value["x_radar"]["cost"]["requests"], 2);
        assert_eq!(value["x_radar"]["cost"]["user_lookups"], 1);
        assert_eq!(value["x_radar"]["cost"]["post_reads"], 2);
        assert_eq!(value["x_radar"]["cost"]["estimated_usd"], 0.02);
        assert_eq!(value["user"]["username"], "alice");
        assert_eq!(value["meta"]["result_count"], 2);
        // Default sort is recent
        assert_eq!(value["data"][0]["id"], "t2");

        let requests = radar.fetcher().transport().requests();
        assert_eq!(
            requests,
            vec![
                user_lookup_signature(&base(), "alice").as_str().to_string(),
                user_tweets_signature(&base(), "u1", None).as_str().to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_cache_hit_counts_one_request() {
        let transport = ScriptedTransport::new().reply(200, &timeline_body());
        let (radar, _dir) = radar(transport, Some("token"));
        radar.fetcher().cache().put(
            &user_lookup_signature(&base(), "alice"),
            &serde_json::from_str(&user_body()).unwrap(),
        );

        let envelope = radar
            .user_tweets(UserTweetsParams::new("alice"), now())
            .await
            .unwrap();
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["x_radar"]["cache"]["user_lookup_hit"], true);
        assert_eq!(value["x_radar"]["cache"]["tweets_hit"], false);
        assert_eq!(value["x_radar"]["cost"]["requests"], 1);
        assert_eq!(value["x_radar"]["cost"]["user_lookups"], 0);
        assert_eq!(value["x_radar"]["cost"]["post_reads"], 2);
    }

    #[tokio::test]
    async fn test_full_cache_hit_is_free_and_needs_no_token() {
        let (radar, _dir) = radar(ScriptedTransport::new(), None);
        let cache = radar.fetcher().cache();
        cache.put(
            &user_lookup_signature(&base(), "alice"),
            &serde_json::from_str(&user_body()).unwrap(),
        );
        cache.put(
            &user_tweets_signature(&base(), "u1", None),
            &serde_json::from_str(&timeline_body()).unwrap(),
        );

        let params = UserTweetsParams {
            sort: SortKey::Likes,
            ..UserTweetsParams::new("alice")
        };
        let value = serde_json::to_value(radar.user_tweets(params, now()).await.unwrap()).unwrap();

        assert_eq!(value["x_radar"]["cost"]["requests"], 0);
        assert_eq!(value["x_radar"]["cost"]["estimated_usd"], 0.0);
        assert_eq!(value["data"][0]["id"], "t1");
        assert!(radar.fetcher().transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_short_circuits() {
        let body = json!({
            "errors": [{"detail": "Could not find user with username: [ghost].", "title": "Not Found Error"}]
        })
        .to_string();
        let (radar, _dir) = radar(ScriptedTransport::new().reply(200, &body), Some("token"));

        let envelope = radar
            .user_tweets(UserTweetsParams::new("ghost"), now())
            .await
            .unwrap();
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["error"]["code"], "not_found");
        assert!(value["error"]["message"].as_str().unwrap().contains("ghost"));
        assert_eq!(value["errors"][0]["title"], "Not Found Error");
        assert_eq!(value["data"], json!([]));
        assert_eq!(value["x_radar"]["cost"]["requests"], 1);
        assert_eq!(value["x_radar"]["cost"]["user_lookups"], 1);
        assert_eq!(radar.fetcher().transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_since_adds_start_time_to_timeline_request() {
        let transport = ScriptedTransport::new()
            .reply(200, &user_body())
            .reply(200, &timeline_body());
        let (radar, _dir) = radar(transport, Some("token"));
        let params = UserTweetsParams {
            since: Some("1d".to_string()),
            ..UserTweetsParams::new("alice")
        };

        radar.user_tweets(params, now()).await.unwrap();

        let requests = radar.fetcher().transport().requests();
        assert_eq!(
            requests[1],
            user_tweets_signature(&base(), "u1", Some("2026-02-13T09:00:00Z")).as_str()
        );
    }

    #[tokio::test]
    async fn test_invalid_since_fails_before_lookup() {
        let (radar, _dir) = radar(ScriptedTransport::new(), Some("token"));
        let params = UserTweetsParams {
            since: Some("yesterday".to_string()),
            ..UserTweetsParams::new("alice")
        };

        let err = radar.user_tweets(params, now()).await.unwrap_err();
        assert!(matches!(err, RadarError::Validation(_)));
        assert!(radar.fetcher().transport().requests().is_empty());
    }

    #[test]
    fn test_user_id_extraction() {
        assert_eq!(user_id(&json!({"data": {"id": "42"}})), Some("42".to_string()));
        assert_eq!(user_id(&json!({"data": {"id": 42}})), Some("42".to_string()));
        assert_eq!(user_id(&json!({"data": {"id": ""}})), None);
        assert_eq!(user_id(&json!({"data": {}})), None);
        assert_eq!(user_id(&json!({"errors": []})), None);
    }
}
