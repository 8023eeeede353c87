//! Query operations
//!
//! Each operation builds request signatures, fetches through the cache, ranks
//! the results, and assembles an `Envelope`. Fetches within an operation run
//! strictly one after another.

mod search;
mod tweet;
mod user;
pub mod window;

pub use search::SearchParams;
pub use user::UserTweetsParams;
pub use window::{apply_quick_filters, parse_since, window_start, SINCE_FORMAT_HINT};

use std::time::Duration;

use url::Url;

use crate::api::{Fetcher, Transport};
use crate::cache::{CacheStore, RequestSignature};

/// Tweet fields requested by search and single-tweet lookups
pub const TWEET_FIELDS: &str = "created_at,public_metrics,author_id,conversation_id";

/// Tweet fields requested by per-user timelines
pub const TIMELINE_TWEET_FIELDS: &str = "created_at,public_metrics,conversation_id";

/// User fields attached via the author expansion
pub const EXPANSION_USER_FIELDS: &str = "username,name,verified";

/// User fields requested by username lookups
pub const LOOKUP_USER_FIELDS: &str = "public_metrics,verified,created_at";

/// Cache TTL for full searches, single tweets, and user timelines
pub const DEFAULT_TTL: Duration = Duration::from_secs(900);

/// Cache TTL for quick searches
pub const QUICK_TTL: Duration = Duration::from_secs(3600);

/// Page size for full searches and user timelines
pub const FULL_PAGE: u32 = 100;

/// Page size for quick searches
pub const QUICK_PAGE: u32 = 10;

/// Runs query operations against the X API
pub struct Radar<C, T> {
    fetcher: Fetcher<C, T>,
    api_base: Url,
}

impl<C: CacheStore, T: Transport> Radar<C, T> {
    pub fn new(fetcher: Fetcher<C, T>, api_base: Url) -> Self {
        Self { fetcher, api_base }
    }

    pub fn fetcher(&self) -> &Fetcher<C, T> {
        &self.fetcher
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }
}

/// `GET /tweets/search/recent`
pub fn search_signature(
    base: &Url,
    query: &str,
    max_results: u32,
    start_time: Option<&str>,
) -> RequestSignature {
    let mut params = vec![
        ("query", query.to_string()),
        ("max_results", max_results.to_string()),
        ("tweet.fields", TWEET_FIELDS.to_string()),
        ("expansions", "author_id".to_string()),
        ("user.fields", EXPANSION_USER_FIELDS.to_string()),
    ];
    if let Some(start) = start_time {
        params.push(("start_time", start.to_string()));
    }
    RequestSignature::new(base, &["tweets", "search", "recent"], params)
}

/// `GET /tweets?ids=<id>`
pub fn tweet_signature(base: &Url, id: &str) -> RequestSignature {
    RequestSignature::new(
        base,
        &["tweets"],
        [
            ("ids", id),
            ("tweet.fields", TWEET_FIELDS),
            ("expansions", "author_id"),
            ("user.fields", EXPANSION_USER_FIELDS),
        ],
    )
}

/// `GET /users/by/username/<username>`
pub fn user_lookup_signature(base: &Url, username: &str) -> RequestSignature {
    RequestSignature::new(
        base,
        &["users", "by", "username", username],
        [("user.fields", LOOKUP_USER_FIELDS)],
    )
}

/// `GET /users/<id>/tweets`, original posts only
pub fn user_tweets_signature(base: &Url, user_id: &str, start_time: Option<&str>) -> RequestSignature {
    let mut params = vec![
        ("max_results", FULL_PAGE.to_string()),
        ("tweet.fields", TIMELINE_TWEET_FIELDS.to_string()),
        ("exclude", "replies,retweets".to_string()),
    ];
    if let Some(start) = start_time {
        params.push(("start_time", start.to_string()));
    }
    RequestSignature::new(base, &["users", user_id, "tweets"], params)
}
