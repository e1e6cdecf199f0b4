mod resolver;

pub use resolver::{sha1_file, ArtifactResolver, HashCache};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::error::{DistroError, DistroResult};

/// A concrete file in the distribution.
///
/// `path` is relative to the distribution root and always `/`-separated.
/// `mtime` is the modification marker (ms since the epoch) that keys the
/// hash cache on the next generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: String,
    pub hash: String,
    pub size: u64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<u64>,
}

/// Join a `/`-separated relative path under `base_url`, percent-escaping
/// each segment.
pub fn artifact_url(base_url: &str, relative: &str) -> DistroResult<String> {
    let invalid = |reason: &str| DistroError::InvalidUrl {
        url: base_url.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| invalid("cannot be used as a base"))?;
        segments.pop_if_empty();
        segments.extend(relative.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_segments_are_escaped() {
        let url = artifact_url(
            "https://cdn.example.com/distro/",
            "servers/main/files/config/my file#1.cfg",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://cdn.example.com/distro/servers/main/files/config/my%20file%231.cfg"
        );
    }

    #[test]
    fn base_without_path_still_joins() {
        let url = artifact_url("https://cdn.example.com/", "servers/a.jar").unwrap();
        assert_eq!(url, "https://cdn.example.com/servers/a.jar");
    }

    #[test]
    fn mtime_is_omitted_when_unknown() {
        let artifact = Artifact {
            path: "a.jar".into(),
            hash: "00".into(),
            size: 1,
            url: "https://x/a.jar".into(),
            mtime: None,
        };
        let json = serde_json::to_string(&artifact).unwrap();
        assert_eq!(json, r#"{"path":"a.jar","hash":"00","size":1,"url":"https://x/a.jar"}"#);
    }
}
