//! libcurl-backed HTTP client, run on tokio's blocking pool.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::retry::{classify_curl_error, classify_http_status, TransferError};

use super::HttpClient;

/// Blocking curl transfers wrapped for async callers.
#[derive(Debug, Clone)]
pub struct CurlHttpClient {
    connect_timeout: Duration,
    timeout: Duration,
    max_bytes: Option<u64>,
}

impl Default for CurlHttpClient {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
            max_bytes: None,
        }
    }
}

impl CurlHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeouts(mut self, connect_timeout: Duration, timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.timeout = timeout;
        self
    }

    /// Fail a transfer with `TooLarge` once its body exceeds `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: Option<u64>) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, TransferError> {
        let mut easy = curl::easy::Easy::new();
        let setup = |easy: &mut curl::easy::Easy| -> Result<(), curl::Error> {
            easy.url(url)?;
            easy.follow_location(true)?;
            easy.connect_timeout(self.connect_timeout)?;
            easy.timeout(self.timeout)?;
            easy.fail_on_error(false)?;
            Ok(())
        };
        setup(&mut easy).map_err(|e| classify_curl_error(&e))?;
        Ok(easy)
    }

    /// Runs one GET, handing each body chunk to `sink`. Runs in the current thread.
    fn perform<W>(&self, url: &str, mut sink: W) -> Result<(), TransferError>
    where
        W: FnMut(&[u8]) -> std::io::Result<()>,
    {
        let mut easy = self.easy(url)?;
        let limit = self.max_bytes;
        let mut received: u64 = 0;
        let mut over_limit = false;
        let mut write_error: Option<std::io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    received += data.len() as u64;
                    if limit.is_some_and(|l| received > l) {
                        over_limit = true;
                        return Ok(0);
                    }
                    if let Err(e) = sink(data) {
                        write_error = Some(e);
                        return Ok(0);
                    }
                    Ok(data.len())
                })
                .map_err(|e| classify_curl_error(&e))?;
            transfer.perform()
        };

        if let (true, Some(limit)) = (over_limit, limit) {
            return Err(TransferError::TooLarge { limit });
        }
        if let Some(e) = write_error {
            return Err(TransferError::from(e));
        }
        performed.map_err(|e| classify_curl_error(&e))?;

        let code = easy.response_code().map_err(|e| classify_curl_error(&e))?;
        match classify_http_status(code) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// GET `url` into memory. Blocking.
    pub fn fetch_blocking(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        let mut body = Vec::new();
        self.perform(url, |data| {
            body.extend_from_slice(data);
            Ok(())
        })?;
        Ok(body)
    }

    /// GET `url` straight into a file at `path`. Blocking. The file is removed on failure.
    pub fn download_to_path_blocking(&self, url: &str, path: &Path) -> Result<(), TransferError> {
        let mut file = File::create(path)?;
        let result = self
            .perform(url, |data| file.write_all(data))
            .and_then(|()| file.sync_all().map_err(TransferError::from));
        if result.is_err() {
            let _ = std::fs::remove_file(path);
        }
        result
    }

    /// Async wrapper for [`download_to_path_blocking`](Self::download_to_path_blocking).
    pub async fn download_to_path(&self, url: &str, path: PathBuf) -> Result<(), TransferError> {
        let client = self.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || client.download_to_path_blocking(&url, &path))
            .await
            .map_err(|e| TransferError::Save(format!("download task join: {}", e)))?
    }
}

#[async_trait]
impl HttpClient for CurlHttpClient {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        let client = self.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || client.fetch_blocking(&url))
            .await
            .map_err(|e| TransferError::Network(format!("fetch task join: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_url_is_reported_as_transfer_error() {
        let client = CurlHttpClient::new();
        let err = client.fetch_blocking("ht!tp://nope").unwrap_err();
        assert!(
            matches!(err, TransferError::Malformed(_) | TransferError::Network(_)),
            "unexpected error: {:?}",
            err
        );
    }

    #[test]
    fn builder_sets_limits() {
        let client = CurlHttpClient::new()
            .with_timeouts(Duration::from_secs(1), Duration::from_secs(2))
            .with_max_bytes(Some(10));
        assert_eq!(client.connect_timeout, Duration::from_secs(1));
        assert_eq!(client.timeout, Duration::from_secs(2));
        assert_eq!(client.max_bytes, Some(10));
    }
}
