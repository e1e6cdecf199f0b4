use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{DistroError, DistroResult};

const DEFAULT_EXTENSION: &str = "jar";

/// A maven coordinate naming one loader file.
///
/// Accepted forms are `group:artifact:version[:classifier][@extension]`.
/// Loader files are stored under a server in the same layout a maven
/// repository serves them, so the coordinate alone locates the file both
/// on disk and remotely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    /// `jar` unless overridden with `@ext`.
    pub packaging: String,
}

impl MavenArtifact {
    /// Parse a coordinate string.
    ///
    /// ```
    /// use helios_distro::core::maven::MavenArtifact;
    ///
    /// let a = MavenArtifact::parse("net.fabricmc:intermediary:1.20.1").unwrap();
    /// assert_eq!(a.group_id, "net.fabricmc");
    /// ```
    pub fn parse(coord: &str) -> DistroResult<Self> {
        let invalid = || DistroError::InvalidMavenCoordinate(coord.to_string());

        let (body, packaging) = match coord.split_once('@') {
            Some((body, ext)) if !ext.is_empty() && !ext.contains(['@', ':']) => (body, ext),
            Some(_) => return Err(invalid()),
            None => (coord, DEFAULT_EXTENSION),
        };

        let mut fields = body.split(':');
        let mut next = || fields.next().filter(|s| !s.is_empty()).map(str::to_string);
        let (Some(group_id), Some(artifact_id), Some(version)) = (next(), next(), next()) else {
            return Err(invalid());
        };
        let classifier = next();
        if next().is_some() || body.split(':').any(str::is_empty) {
            return Err(invalid());
        }

        Ok(Self {
            group_id,
            artifact_id,
            version,
            classifier,
            packaging: packaging.to_string(),
        })
    }

    /// `artifact-version[-classifier].ext`
    pub fn filename(&self) -> String {
        let classifier = self
            .classifier
            .as_deref()
            .map(|c| format!("-{c}"))
            .unwrap_or_default();
        format!(
            "{}-{}{}.{}",
            self.artifact_id, self.version, classifier, self.packaging
        )
    }

    fn segments(&self) -> impl Iterator<Item = String> + '_ {
        self.group_id
            .split('.')
            .map(str::to_string)
            .chain([
                self.artifact_id.clone(),
                self.version.clone(),
                self.filename(),
            ])
    }

    /// Download URL under a maven repository root.
    pub fn url(&self, repository: &str) -> String {
        let mut url = repository.trim_end_matches('/').to_string();
        for segment in self.segments() {
            url.push('/');
            url.push_str(&segment);
        }
        url
    }

    /// Path of the file relative to a maven-layout directory.
    pub fn local_path(&self) -> PathBuf {
        self.segments().collect()
    }

    /// Module id used in the manifest. The extension is only kept when it is
    /// not the default.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl FromStr for MavenArtifact {
    type Err = DistroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        if self.packaging != DEFAULT_EXTENSION {
            write!(f, "@{}", self.packaging)?;
        }
        Ok(())
    }
}
