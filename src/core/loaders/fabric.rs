use super::installer::{LoaderInstaller, LoaderKind};
use super::table::LoaderRule;
use crate::core::error::{DistroError, DistroResult};
use crate::core::maven::FABRIC_MAVEN;
use crate::core::version::VersionToken;

/// Fabric exists from Minecraft 1.14 onward and always uses the same layout:
/// the loader jar plus the intermediary mappings for the game version.
pub struct FabricInstaller;

impl LoaderInstaller for FabricInstaller {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Fabric
    }

    /// `<major>.<minor>.<patch>` with an optional `+build.N` suffix.
    fn check_version_shape(&self, loader_version: &str) -> DistroResult<()> {
        let (core, build) = match loader_version.split_once('+') {
            Some((c, b)) => (c, Some(b)),
            None => (loader_version, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        let core_ok = parts.len() == 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
        let build_ok = build.map_or(true, |b| {
            b.strip_prefix("build.")
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|c| c.is_ascii_digit()))
        });

        if core_ok && build_ok {
            Ok(())
        } else {
            Err(DistroError::InvalidVersion(format!("fabric {}", loader_version)))
        }
    }

    fn default_rule(&self) -> LoaderRule {
        LoaderRule {
            boundary: VersionToken::new(1, 14, 0),
            minimum: Some(VersionToken::new(1, 14, 0)),
            legacy_installer: None,
            modern_installer: "net.fabricmc:fabric-loader:{loader}".into(),
            modern_libraries: vec!["net.fabricmc:intermediary:{mc}".into()],
            repository: FABRIC_MAVEN.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_release_and_build_versions() {
        assert!(FabricInstaller.check_version_shape("0.14.21").is_ok());
        assert!(FabricInstaller.check_version_shape("0.7.2+build.175").is_ok());
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["", "0.14", "0.14.x", "0.14.21+", "0.14.21+foo.1", "0.14.21+build."] {
            assert!(FabricInstaller.check_version_shape(bad).is_err(), "{bad}");
        }
    }
}
