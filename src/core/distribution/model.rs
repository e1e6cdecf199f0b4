use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::artifact::Artifact;
use crate::core::error::{DistroError, DistroResult};
use crate::core::fs::{to_json_bytes, write_atomic};
use crate::core::server::Server;

/// Manifest schema version written to `distribution.json`.
pub const SCHEMA_VERSION: &str = "1.0.0";
pub const DISTRO_META_FILE: &str = "distrometa.json";

/// The manifest: every server of the distribution, in id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<serde_json::Value>,
    #[serde(default)]
    pub servers: Vec<Server>,
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            rss: None,
            discord: None,
            servers: Vec::new(),
        }
    }
}

impl Distribution {
    pub fn server(&self, id: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.id == id)
    }

    /// Every artifact in every server, depth-first.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.servers
            .iter()
            .flat_map(|s| s.modules.iter())
            .flat_map(|m| m.artifacts())
    }

    /// Read a manifest; `None` when the file does not exist yet.
    pub async fn load(path: &Path) -> DistroResult<Option<Self>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(DistroError::io(path, e)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub async fn write(&self, path: &Path) -> DistroResult<()> {
        write_atomic(path, &to_json_bytes(self)?).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistroMetaInfo {
    #[serde(default)]
    pub rss: Option<String>,
    #[serde(default)]
    pub discord: Option<serde_json::Value>,
}

/// Contents of `meta/distrometa.json`, copied onto the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistroMeta {
    #[serde(default)]
    pub meta: DistroMetaInfo,
}

impl DistroMeta {
    /// A missing file means no metadata.
    pub async fn load(path: &Path) -> DistroResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                DistroError::InvalidConfiguration(format!("{}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(DistroError::io(path, e)),
        }
    }
}

/// A problem that was recorded instead of aborting the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailure {
    /// Empty when the failure concerns the distribution as a whole.
    pub server_id: String,
    /// Relative file path, module id or config file the failure concerns.
    pub location: String,
    pub message: String,
}

impl BuildFailure {
    pub fn new(
        server_id: impl Into<String>,
        location: impl Into<String>,
        error: &impl fmt::Display,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            location: location.into(),
            message: error.to_string(),
        }
    }

    /// A failure outside any server, such as unreadable distribution metadata.
    pub fn distribution(location: impl Into<String>, error: &impl fmt::Display) -> Self {
        Self::new(String::new(), location, error)
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.server_id.is_empty() {
            write!(f, "{}: {}", self.location, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.server_id, self.location, self.message)
        }
    }
}

/// What a build produced: the manifest for everything that resolved, plus
/// the failures that were skipped over.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub distribution: Distribution,
    pub failures: Vec<BuildFailure>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
