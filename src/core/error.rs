use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the distribution builder.
/// Every module returns `Result<T, DistroError>`.
#[derive(Debug, Error)]
pub enum DistroError {
    // ── Version ─────────────────────────────────────────
    #[error("Invalid version string: {0:?}")]
    InvalidVersion(String),

    // ── Loader ──────────────────────────────────────────
    #[error("{loader} {loader_version} is not supported for Minecraft {game_version}: {reason}")]
    UnsupportedLoaderForVersion {
        loader: String,
        loader_version: String,
        game_version: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ── IO ──────────────────────────────────────────────
    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Third-party resolution ──────────────────────────
    #[error("CurseForge file {project_id}/{file_id} not found")]
    NotFound { project_id: u32, file_id: u32 },

    #[error("Request to {url} failed: {message}")]
    Network {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Dependency cycle detected: {}", format_chain(.0))]
    CycleDetected(Vec<(u32, u32)>),

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Formats ─────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate module id {0:?} among siblings")]
    DuplicateModule(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type DistroResult<T> = Result<T, DistroError>;

impl DistroError {
    /// Wrap an IO error with the path it happened on. A missing file is
    /// reported as [`DistroError::FileNotFound`] so the tree walk can treat
    /// it as a skippable module.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            DistroError::FileNotFound(path)
        } else {
            DistroError::Io { path, source }
        }
    }

    /// Whether a retry has a chance of succeeding.
    ///
    /// Timeouts, connection failures, 5xx and 429 are transient; everything
    /// else (4xx, bad ids, integrity errors) fails immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            DistroError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                e.status()
                    .map_or(e.is_request(), |s| s.is_server_error() || s.as_u16() == 429)
            }
            DistroError::Network { status, .. } => {
                status.map_or(true, |s| s >= 500 || s == 429)
            }
            _ => false,
        }
    }
}

fn format_chain(chain: &[(u32, u32)]) -> String {
    chain
        .iter()
        .map(|(p, f)| format!("{}/{}", p, f))
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl From<std::io::Error> for DistroError {
    fn from(source: std::io::Error) -> Self {
        DistroError::io(PathBuf::new(), source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_maps_to_file_not_found() {
        let err = DistroError::io(
            "/tmp/gone.jar",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, DistroError::FileNotFound(_)));
    }

    #[test]
    fn network_status_classification() {
        let server = DistroError::Network {
            url: "u".into(),
            status: Some(503),
            message: "unavailable".into(),
        };
        let missing = DistroError::Network {
            url: "u".into(),
            status: Some(404),
            message: "missing".into(),
        };
        assert!(server.is_transient());
        assert!(!missing.is_transient());
        assert!(!DistroError::NotFound { project_id: 1, file_id: 2 }.is_transient());
    }

    #[test]
    fn cycle_message_lists_chain() {
        let err = DistroError::CycleDetected(vec![(1, 10), (2, 20), (1, 10)]);
        assert_eq!(
            err.to_string(),
            "Dependency cycle detected: 1/10 -> 2/20 -> 1/10"
        );
    }
}
