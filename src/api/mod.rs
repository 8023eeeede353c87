//! X API access: transport and cache-aware fetcher

mod fetcher;
mod transport;

pub use fetcher::{error_detail, Fetched, Fetcher};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError, USER_AGENT};

#[cfg(test)]
pub(crate) use transport::testing;
