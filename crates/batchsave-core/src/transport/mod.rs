//! Fetch and save capabilities the engine is written against.
//!
//! The scheduler, retry executor and archive builder only see these traits, so they
//! run unchanged against libcurl and a directory, or against in-memory test doubles.

mod curl;
mod sink;

use async_trait::async_trait;

use crate::retry::TransferError;

pub use self::curl::CurlHttpClient;
pub use self::sink::DirectorySink;

/// Fetches the full body behind a URL.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransferError>;
}

/// Platform save: where finished archives and individual files end up.
#[async_trait]
pub trait FileSink: Send + Sync {
    /// Saves an in-memory payload (the archive path's single blob).
    async fn save_blob(&self, bytes: Vec<u8>, filename: &str) -> Result<(), TransferError>;

    /// Saves the resource at `url` directly under `filename` (the sequential path).
    async fn save_url(&self, url: &str, filename: &str) -> Result<(), TransferError>;
}
