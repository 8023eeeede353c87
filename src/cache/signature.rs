//! Request signatures
//!
//! A `RequestSignature` is the fully-resolved request URL. It doubles as the
//! cache key: the SHA-256 of the URL string names the cache file.

use std::collections::BTreeMap;
use std::fmt;

use sha2::{Digest, Sha256};
use url::Url;

/// A fully-resolved GET request (base URL, path, sorted query string)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestSignature {
    url: Url,
}

impl RequestSignature {
    /// Builds a signature from an API base, extra path segments, and query parameters
    ///
    /// Path segments are percent-encoded. Parameters are sorted by name before
    /// encoding, so the order they are supplied in does not matter. A repeated
    /// name keeps its last value.
    pub fn new<I, K, V>(base: &Url, segments: &[&str], params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);

        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        let params: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }

        Self { url }
    }

    /// The request URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request URL as a string
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Stable, fixed-length cache key (lowercase hex SHA-256 of the URL)
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_str().as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
