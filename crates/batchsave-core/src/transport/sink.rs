//! File sink that saves into a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::archive::with_suffix;
use crate::retry::TransferError;
use crate::url_model::derive_save_name;

use super::curl::CurlHttpClient;
use super::FileSink;

const PART_SUFFIX: &str = ".part";

/// Saves blobs and URLs as files under `dir`.
///
/// Names are sanitized for Linux. Unless `overwrite` is set, an existing file is
/// kept and the new one gets a numbered name (`photo_1.jpg`, `photo_2.jpg`, …).
/// Data is written to `<name>.part` first and renamed into place when complete.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    overwrite: bool,
    client: CurlHttpClient,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
            client: CurlHttpClient::new(),
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Client used for direct URL saves.
    pub fn with_client(mut self, client: CurlHttpClient) -> Self {
        self.client = client;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path for `filename`, avoiding existing files unless overwriting.
    pub fn target_path(&self, filename: &str, url: Option<&str>) -> PathBuf {
        let name = derive_save_name(filename, url);
        let mut path = self.dir.join(&name);
        if self.overwrite {
            return path;
        }
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(with_suffix(&name, n));
            n += 1;
        }
        path
    }
}

fn part_path(final_path: &Path) -> PathBuf {
    let mut s = final_path.as_os_str().to_owned();
    s.push(PART_SUFFIX);
    PathBuf::from(s)
}

#[async_trait]
impl FileSink for DirectorySink {
    async fn save_blob(&self, bytes: Vec<u8>, filename: &str) -> Result<(), TransferError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let final_path = self.target_path(filename, None);
        let tmp = part_path(&final_path);
        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tokio::fs::rename(&tmp, &final_path).await?;
        tracing::info!(path = %final_path.display(), bytes = bytes.len(), "saved file");
        Ok(())
    }

    async fn save_url(&self, url: &str, filename: &str) -> Result<(), TransferError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let final_path = self.target_path(filename, Some(url));
        let tmp = part_path(&final_path);
        self.client.download_to_path(url, tmp.clone()).await?;
        tokio::fs::rename(&tmp, &final_path).await?;
        tracing::info!(path = %final_path.display(), "saved file");
        Ok(())
    }
}
