//! Cost estimation
//!
//! Every fetch produces a `FetchCost`; an operation sums them into a
//! `CostEstimate`. Cache hits cost nothing.

use std::iter::Sum;
use std::ops::Add;

use serde::Serialize;

/// Estimated USD per post read
pub const POST_READ_USD: f64 = 0.005;

/// Estimated USD per user lookup
pub const USER_LOOKUP_USD: f64 = 0.010;

/// When the unit prices above were last checked against X API pricing
pub const PRICING_LAST_REVIEWED_UTC: &str = "2026-02-13";

const PRICING_NOTE: &str = "Estimate only. Actual X billing may differ by tier/resource.";

/// Billable work done by a single fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchCost {
    pub requests: u64,
    pub post_reads: u64,
    pub user_lookups: u64,
}

impl FetchCost {
    /// A fetch that returned `post_count` posts
    pub fn posts(cache_hit: bool, post_count: usize) -> Self {
        if cache_hit {
            return Self::default();
        }
        Self {
            requests: 1,
            post_reads: post_count as u64,
            user_lookups: 0,
        }
    }

    /// A username → user lookup
    pub fn user_lookup(cache_hit: bool) -> Self {
        if cache_hit {
            return Self::default();
        }
        Self {
            requests: 1,
            post_reads: 0,
            user_lookups: 1,
        }
    }

    pub fn estimate(self) -> CostEstimate {
        CostEstimate::from(self)
    }
}

impl Add for FetchCost {
    type Output = FetchCost;

    fn add(self, other: FetchCost) -> FetchCost {
        FetchCost {
            requests: self.requests + other.requests,
            post_reads: self.post_reads + other.post_reads,
            user_lookups: self.user_lookups + other.user_lookups,
        }
    }
}

impl Sum for FetchCost {
    fn sum<I: Iterator<Item = FetchCost>>(iter: I) -> FetchCost {
        iter.fold(FetchCost::default(), Add::add)
    }
}

/// Unit prices the estimate was computed with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingAssumptions {
    pub post_read_usd: f64,
    pub user_lookup_usd: f64,
    pub pricing_last_reviewed_utc: &'static str,
    pub note: &'static str,
}

impl Default for PricingAssumptions {
    fn default() -> Self {
        Self {
            post_read_usd: POST_READ_USD,
            user_lookup_usd: USER_LOOKUP_USD,
            pricing_last_reviewed_utc: PRICING_LAST_REVIEWED_UTC,
            note: PRICING_NOTE,
        }
    }
}

/// Estimated cost of one invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub requests: u64,
    pub post_reads: u64,
    pub user_lookups: u64,
    /// Rounded to 3 decimal places
    pub estimated_usd: f64,
    pub assumptions: PricingAssumptions,
}

impl From<FetchCost> for CostEstimate {
    fn from(cost: FetchCost) -> Self {
        let usd = cost.post_reads as f64 * POST_READ_USD + cost.user_lookups as f64 * USER_LOOKUP_USD;
        Self {
            requests: cost.requests,
            post_reads: cost.post_reads,
            user_lookups: cost.user_lookups,
            estimated_usd: round_usd(usd),
            assumptions: PricingAssumptions::default(),
        }
    }
}

fn round_usd(usd: f64) -> f64 {
    (usd * 1000.0).round() / 1000.0
}
