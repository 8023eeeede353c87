//! Core data models for x-radar
//!
//! Tweets are kept as the raw provider JSON so the output can pass them
//! through untouched; typed accessors read the fields ranking needs.

pub mod cost;
pub mod rank;

pub use cost::{CostEstimate, FetchCost};
pub use rank::{rank, SortField};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tweet as returned by the X API
///
/// Serializes back to exactly the JSON it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Value);

/// Engagement counters under `public_metrics`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Likes,
    Replies,
    Retweets,
}

impl Metric {
    /// Field name inside `public_metrics`
    pub fn field(self) -> &'static str {
        match self {
            Metric::Likes => "like_count",
            Metric::Replies => "reply_count",
            Metric::Retweets => "retweet_count",
        }
    }
}

impl Item {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// The raw JSON
    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn into_raw(self) -> Value {
        self.0
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn author_id(&self) -> Option<&str> {
        self.0.get("author_id").and_then(Value::as_str)
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.0.get("conversation_id").and_then(Value::as_str)
    }

    /// ISO-8601 creation time, or `""` when absent
    ///
    /// UTC timestamps in this format order correctly as plain strings.
    pub fn created_at(&self) -> &str {
        self.0
            .get("created_at")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Value of an engagement counter; absent or unparseable values read as 0
    pub fn metric(&self, metric: Metric) -> i64 {
        self.0
            .get("public_metrics")
            .and_then(|m| m.get(metric.field()))
            .map(metric_value)
            .unwrap_or(0)
    }
}

fn metric_value(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Extracts the `data` array of a provider envelope as items
///
/// Anything other than an array yields no items.
pub fn items_from(payload: &Value) -> Vec<Item> {
    payload
        .get("data")
        .and_then(Value::as_array)
        .map(|items| items.iter().cloned().map(Item::new).collect())
        .unwrap_or_default()
}

/// Minimum engagement thresholds; 0 disables a threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub min_likes: u64,
    pub min_replies: u64,
    pub min_retweets: u64,
}

impl FilterSpec {
    /// Whether `item` meets every threshold
    pub fn accepts(&self, item: &Item) -> bool {
        meets(item.metric(Metric::Likes), self.min_likes)
            && meets(item.metric(Metric::Replies), self.min_replies)
            && meets(item.metric(Metric::Retweets), self.min_retweets)
    }
}

fn meets(value: i64, minimum: u64) -> bool {
    i128::from(value) >= i128::from(minimum)
}

/// Ranking mode for result sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Likes,
    Replies,
    Retweets,
    Recent,
}
