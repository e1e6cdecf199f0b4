use std::fmt;
use std::path::{Path, PathBuf};

use futures_util::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::artifact::sha1_file;
use crate::core::config::RetryPolicy;
use crate::core::error::{DistroError, DistroResult};
use crate::core::http::{check_status, retry_with_backoff};

/// One remote file and where it belongs on disk.
#[derive(Debug, Clone)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
    /// Expected hex SHA-1, checked before the file is moved into place.
    pub sha1: Option<String>,
}

impl fmt::Display for DownloadEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.url, self.dest.display())
    }
}

pub struct Downloader {
    client: Client,
    retry: RetryPolicy,
    concurrency: usize,
}

impl Downloader {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            concurrency: 8,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    // ── Single file ─────────────────────────────────────

    /// Fetch `url` into `dest`.
    ///
    /// Transient failures are retried. The body is checked against
    /// `sha1_expected` in memory, written to `<dest>.part` and renamed, so
    /// `dest` only ever holds a complete, verified file.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> DistroResult<()> {
        let bytes = retry_with_backoff(&self.retry, url, move || async move {
            let response = check_status(self.client.get(url).send().await?)?;
            Ok::<_, DistroError>(response.bytes().await?)
        })
        .await?;

        if let Some(expected) = sha1_expected {
            let actual = hex::encode(Sha1::digest(&bytes));
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(DistroError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DistroError::io(parent, e))?;
        }
        let part = part_path(dest);
        let mut file = tokio::fs::File::create(&part)
            .await
            .map_err(|e| DistroError::io(&part, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| DistroError::io(&part, e))?;
        file.flush().await.map_err(|e| DistroError::io(&part, e))?;
        drop(file);
        tokio::fs::rename(&part, dest)
            .await
            .map_err(|e| DistroError::io(dest, e))?;

        debug!("Downloaded {} ({} bytes)", dest.display(), bytes.len());
        Ok(())
    }

    // ── Batches ─────────────────────────────────────────

    /// Make sure every entry exists on disk, downloading the ones that don't.
    ///
    /// An existing file is kept when it has no expected hash or its hash
    /// matches. Stops at the first failed download. Returns the number of
    /// files fetched.
    pub async fn fetch_all(&self, entries: Vec<DownloadEntry>) -> DistroResult<usize> {
        let mut pending = Vec::new();
        for entry in entries {
            if !is_satisfied(&entry).await? {
                pending.push(entry);
            }
        }
        if pending.is_empty() {
            return Ok(0);
        }

        info!(
            "Fetching {} file(s), concurrency={}",
            pending.len(),
            self.concurrency
        );
        stream::iter(pending)
            .map(|entry| async move {
                self.download_file(&entry.url, &entry.dest, entry.sha1.as_deref())
                    .await
                    .map_err(|e| DistroError::Other(format!("{entry}: {e}")))
            })
            .buffer_unordered(self.concurrency)
            .try_fold(0, |count, ()| async move { Ok(count + 1) })
            .await
    }
}

async fn is_satisfied(entry: &DownloadEntry) -> DistroResult<bool> {
    if !tokio::fs::try_exists(&entry.dest)
        .await
        .map_err(|e| DistroError::io(&entry.dest, e))?
    {
        return Ok(false);
    }
    match &entry.sha1 {
        None => Ok(true),
        Some(expected) => Ok(sha1_file(&entry.dest).await?.eq_ignore_ascii_case(expected)),
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
