//! Recent search

use chrono::{DateTime, Utc};

use super::window::{apply_quick_filters, window_start};
use super::{search_signature, Radar, DEFAULT_TTL, FULL_PAGE, QUICK_PAGE, QUICK_TTL};
use crate::api::Transport;
use crate::cache::CacheStore;
use crate::data::{items_from, rank, FetchCost, FilterSpec, SortKey};
use crate::envelope::{passthrough, Envelope, Metadata};
use crate::error::RadarError;

/// Window applied by quick mode when none is given
const QUICK_DEFAULT_SINCE: &str = "24h";

/// Inputs to a recent search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub limit: usize,
    pub sort: SortKey,
    pub since: Option<String>,
    pub filters: FilterSpec,
    /// Cheap pulse check: fewer results, noise exclusions, longer TTL
    pub quick: bool,
    pub no_cache: bool,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 15,
            sort: SortKey::Likes,
            since: None,
            filters: FilterSpec::default(),
            quick: false,
            no_cache: false,
        }
    }
}

impl<C: CacheStore, T: Transport> Radar<C, T> {
    /// Searches recent posts and ranks the single page returned
    pub async fn search(&self, params: SearchParams, now: DateTime<Utc>) -> Result<Envelope, RadarError> {
        let mut query = params.query;
        let mut since = params.since.filter(|s| !s.trim().is_empty());

        if params.quick {
            query = apply_quick_filters(&query);
            if since.is_none() {
                since = Some(QUICK_DEFAULT_SINCE.to_string());
            }
        }

        // Validate the window before touching the cache or network
        let start_time = since
            .as_deref()
            .map(|s| window_start(now, s))
            .transpose()?;

        let (max_results, ttl) = if params.quick {
            (QUICK_PAGE, QUICK_TTL)
        } else {
            (FULL_PAGE, DEFAULT_TTL)
        };

        let signature = search_signature(self.api_base(), &query, max_results, start_time.as_deref());
        let fetched = self.fetcher().fetch(&signature, ttl, params.no_cache).await?;

        let items = items_from(&fetched.payload);
        let cost = FetchCost::posts(fetched.cache_hit, items.len()).estimate();
        let ranked = rank(items, &params.filters, params.sort, params.limit);

        tracing::info!(
            query = %query,
            cache_hit = fetched.cache_hit,
            returned = ranked.len(),
            "search complete"
        );

        let metadata = Metadata::Search {
            query,
            since,
            sort: params.sort,
            quick: params.quick,
            filters: params.filters,
            cache_hit: fetched.cache_hit,
            returned: ranked.len(),
            cost,
        };

        let mut envelope = Envelope::new(metadata, ranked);
        envelope.includes = passthrough(&fetched.payload, "includes");
        envelope.meta = passthrough(&fetched.payload, "meta");
        Ok(envelope)
    }
}
