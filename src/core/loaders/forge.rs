use super::installer::{LoaderInstaller, LoaderKind};
use super::table::LoaderRule;
use crate::core::error::{DistroError, DistroResult};
use crate::core::maven::FORGE_MAVEN;
use crate::core::version::VersionToken;

/// Forge ships a self-contained universal jar up to 1.12.2; from 1.13 on the
/// installer jar is needed together with the split universal/client jars.
pub struct ForgeInstaller;

impl LoaderInstaller for ForgeInstaller {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Forge
    }

    /// Forge versions are 3 or 4 dot-separated numbers (`36.2.39`,
    /// `14.23.5.2860`).
    fn check_version_shape(&self, loader_version: &str) -> DistroResult<()> {
        let parts: Vec<&str> = loader_version.split('.').collect();
        let numeric = parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
        if numeric && (3..=4).contains(&parts.len()) {
            Ok(())
        } else {
            Err(DistroError::InvalidVersion(format!("forge {}", loader_version)))
        }
    }

    fn default_rule(&self) -> LoaderRule {
        LoaderRule {
            boundary: VersionToken::new(1, 13, 0),
            minimum: None,
            legacy_installer: Some("net.minecraftforge:forge:{mc}-{loader}:universal".into()),
            modern_installer: "net.minecraftforge:forge:{mc}-{loader}:installer".into(),
            modern_libraries: vec![
                "net.minecraftforge:forge:{mc}-{loader}:universal".into(),
                "net.minecraftforge:forge:{mc}-{loader}:client".into(),
            ],
            repository: FORGE_MAVEN.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_three_and_four_part_versions() {
        assert!(ForgeInstaller.check_version_shape("36.2.39").is_ok());
        assert!(ForgeInstaller.check_version_shape("14.23.5.2860").is_ok());
    }

    #[test]
    fn rejects_malformed_versions() {
        for bad in ["", "36", "36.2", "36.2.x", "1.16.5-36.2.39", "1.2.3.4.5"] {
            assert!(ForgeInstaller.check_version_shape(bad).is_err(), "{bad}");
        }
    }
}
