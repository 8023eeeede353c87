//! Output documents
//!
//! Every invocation prints exactly one of these as JSON: an `Envelope` on
//! success or an `ErrorEnvelope` on failure.

use serde::Serialize;
use serde_json::Value;

use crate::data::{CostEstimate, FilterSpec, Item, SortKey};
use crate::error::RadarError;

/// Per-fetch cache outcome for the user-tweets operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserCacheFlags {
    pub user_lookup_hit: bool,
    pub tweets_hit: bool,
}

/// Operation metadata, tagged by `mode`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode")]
pub enum Metadata {
    #[serde(rename = "search")]
    Search {
        query: String,
        since: Option<String>,
        sort: SortKey,
        quick: bool,
        filters: FilterSpec,
        cache_hit: bool,
        returned: usize,
        cost: CostEstimate,
    },
    #[serde(rename = "tweet")]
    Tweet {
        id: String,
        cache_hit: bool,
        cost: CostEstimate,
    },
    #[serde(rename = "user-tweets")]
    UserTweets {
        username: String,
        since: Option<String>,
        sort: SortKey,
        filters: FilterSpec,
        cache: UserCacheFlags,
        returned: usize,
        cost: CostEstimate,
    },
}

impl Metadata {
    pub fn cost(&self) -> &CostEstimate {
        match self {
            Metadata::Search { cost, .. }
            | Metadata::Tweet { cost, .. }
            | Metadata::UserTweets { cost, .. } => cost,
        }
    }
}

/// Successful operation result
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    #[serde(rename = "x_radar")]
    pub metadata: Metadata,
    /// Resolved user object (user-tweets only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    pub data: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub includes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    /// Structured non-fatal outcome, e.g. an unknown username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Envelope {
    pub fn new(metadata: Metadata, data: Vec<Item>) -> Self {
        Self {
            metadata,
            user: None,
            data,
            includes: None,
            meta: None,
            errors: None,
            error: None,
        }
    }
}

/// Copies a non-null top-level field of a provider payload
pub fn passthrough(payload: &Value, field: &str) -> Option<Value> {
    payload.get(field).filter(|v| !v.is_null()).cloned()
}

/// `{code, message}` pair used by failures and not-found results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Failure document: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

impl From<&RadarError> for ErrorEnvelope {
    fn from(err: &RadarError) -> Self {
        Self {
            error: ErrorBody::new(err.code(), err.to_string()),
        }
    }
}
