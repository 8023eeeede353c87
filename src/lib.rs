//! x-radar library
//!
//! Read-only X (Twitter) scouting: cached requests, engagement ranking, and
//! per-invocation cost estimates. The binary in `main.rs` is a thin wrapper
//! around these modules.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod envelope;
pub mod error;
pub mod ops;

pub use error::RadarError;
