// ─── Build Configuration ───
// Explicit inputs for the builders. The core never reads env vars or
// globals; the binary resolves these once and passes them down.

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::core::error::{DistroError, DistroResult};
use crate::core::loaders::LoaderTable;

/// Bounded exponential backoff for remote calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: usize,
    /// Initial delay between retries (doubles each retry).
    pub initial_delay: Duration,
    /// Cap so the backoff never grows unbounded.
    pub max_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 2_u32.saturating_pow(attempt as u32);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Everything a distribution build depends on besides the files under `root`.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub root: PathBuf,
    /// Normalised base URL, always ending in `/`.
    pub base_url: String,
    /// Maximum number of hashing / resolution tasks in flight.
    pub concurrency: usize,
    pub retry: RetryPolicy,
    pub loader_table: LoaderTable,
    /// Download missing loader artifacts from the loader's maven repository.
    pub fetch_loader_files: bool,
}

impl BuildConfig {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> DistroResult<Self> {
        Ok(Self {
            root: root.into(),
            base_url: normalize_base_url(base_url)?,
            concurrency: 8,
            retry: RetryPolicy::default(),
            loader_table: LoaderTable::default(),
            fetch_loader_files: false,
        })
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn servers_dir(&self) -> PathBuf {
        servers_dir(&self.root)
    }

    pub fn manifest_path(&self) -> PathBuf {
        manifest_path(&self.root)
    }
}

pub const MANIFEST_FILE: &str = "distribution.json";
pub const SERVERS_DIR: &str = "servers";
pub const META_DIR: &str = "meta";

pub fn servers_dir(root: &Path) -> PathBuf {
    root.join(SERVERS_DIR)
}

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// Pick the root directory: explicit argument wins over the environment.
/// The result is made absolute against the current directory.
pub fn resolve_root(arg: Option<&Path>, env: Option<&str>) -> DistroResult<PathBuf> {
    let raw = match (arg, env) {
        (Some(p), _) => p.to_path_buf(),
        (None, Some(e)) if !e.trim().is_empty() => PathBuf::from(e.trim()),
        _ => {
            return Err(DistroError::InvalidConfiguration(
                "Root path not specified. Use --root or set ROOT".into(),
            ))
        }
    };

    if raw.is_absolute() {
        return Ok(raw);
    }
    let cwd = std::env::current_dir().map_err(|e| DistroError::io(".", e))?;
    Ok(cwd.join(raw))
}

/// Validate a base URL, defaulting the scheme to `https://` and forcing a
/// trailing slash so relative artifact paths join underneath it.
pub fn normalize_base_url(raw: &str) -> DistroResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DistroError::InvalidConfiguration(
            "BASE_URL not specified. Use --base-url or set BASE_URL".into(),
        ));
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| DistroError::InvalidUrl {
        url: with_scheme.clone(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(DistroError::InvalidUrl {
            url: with_scheme,
            reason: "cannot be used as a base".into(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url.to_string())
}
