//! Cache module for storing raw API responses on disk
//!
//! Responses are keyed by a hash of the fully-resolved request URL and judged
//! fresh or stale against a TTL chosen by each caller. Caching is purely an
//! optimization: every read or write failure is swallowed.

mod manager;
mod signature;

pub use manager::{CacheEntry, CacheStore, DiskCache, NoopCache};
pub use signature::RequestSignature;
