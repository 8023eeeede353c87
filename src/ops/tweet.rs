//! Single tweet lookup

use super::{tweet_signature, Radar, DEFAULT_TTL};
use crate::api::Transport;
use crate::cache::CacheStore;
use crate::data::{items_from, FetchCost};
use crate::envelope::{passthrough, Envelope, Metadata};
use crate::error::RadarError;

impl<C: CacheStore, T: Transport> Radar<C, T> {
    /// Fetches one tweet by id; `no_cache` forces a live request
    pub async fn tweet(&self, id: &str, no_cache: bool) -> Result<Envelope, RadarError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(RadarError::Validation("--id must not be empty".to_string()));
        }

        let signature = tweet_signature(self.api_base(), id);
        let fetched = self.fetcher().fetch(&signature, DEFAULT_TTL, no_cache).await?;

        let metadata = Metadata::Tweet {
            id: id.to_string(),
            cache_hit: fetched.cache_hit,
            cost: FetchCost::posts(fetched.cache_hit, 1).estimate(),
        };

        let mut envelope = Envelope::new(metadata, items_from(&fetched.payload));
        envelope.includes = passthrough(&fetched.payload, "includes");
        envelope.errors = passthrough(&fetched.payload, "errors");
        Ok(envelope)
    }
}
