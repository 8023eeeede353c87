//! Result ranking
//!
//! Each sort mode is an ordered list of fields compared in descending order.
//! The trailing `CreatedAt` field gives equal engagement a chronological
//! tie-break, so every mode yields a deterministic order.

use std::cmp::Ordering;

use super::{FilterSpec, Item, Metric, SortKey};

/// One component of a composite sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Likes,
    Replies,
    Retweets,
    CreatedAt,
}

impl SortField {
    /// Ascending comparison of `a` and `b` on this field
    fn compare(self, a: &Item, b: &Item) -> Ordering {
        match self {
            SortField::Likes => a.metric(Metric::Likes).cmp(&b.metric(Metric::Likes)),
            SortField::Replies => a.metric(Metric::Replies).cmp(&b.metric(Metric::Replies)),
            SortField::Retweets => a.metric(Metric::Retweets).cmp(&b.metric(Metric::Retweets)),
            SortField::CreatedAt => a.created_at().cmp(b.created_at()),
        }
    }
}

impl SortKey {
    /// Fields compared, most significant first
    pub fn fields(self) -> &'static [SortField] {
        match self {
            SortKey::Likes => &[SortField::Likes, SortField::Replies, SortField::CreatedAt],
            SortKey::Replies => &[SortField::Replies, SortField::Likes, SortField::CreatedAt],
            SortKey::Retweets => &[SortField::Retweets, SortField::Likes, SortField::CreatedAt],
            SortKey::Recent => &[SortField::CreatedAt],
        }
    }

    /// Ascending comparison on the full composite key
    pub fn compare(self, a: &Item, b: &Item) -> Ordering {
        self.fields()
            .iter()
            .map(|field| field.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Filters, sorts descending, and truncates a result set
///
/// Items with equal keys keep their input order. `limit` is clamped to at
/// least 1 and applied last.
pub fn rank(items: Vec<Item>, filter: &FilterSpec, sort: SortKey, limit: usize) -> Vec<Item> {
    let mut ranked: Vec<Item> = items.into_iter().filter(|item| filter.accepts(item)).collect();
    ranked.sort_by(|a, b| sort.compare(b, a));
    ranked.truncate(limit.max(1));
    ranked
}
