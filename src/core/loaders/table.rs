use serde::{Deserialize, Serialize};

use super::installer::{Installer, LoaderKind};
use crate::core::version::VersionToken;

/// How one loader is packaged, split at a game-version boundary.
///
/// Coordinates are maven templates; `{mc}` expands to the game version and
/// `{loader}` to the loader version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderRule {
    /// First game version using the modern layout.
    pub boundary: VersionToken,
    /// Oldest game version the loader exists for at all.
    #[serde(default)]
    pub minimum: Option<VersionToken>,
    /// Single installer jar used below `boundary`.
    #[serde(default)]
    pub legacy_installer: Option<String>,
    pub modern_installer: String,
    #[serde(default)]
    pub modern_libraries: Vec<String>,
    /// Maven repository the artifacts can be fetched from.
    pub repository: String,
}

/// Layout rules for every loader, overridable from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderTable {
    pub forge: LoaderRule,
    pub fabric: LoaderRule,
}

impl LoaderTable {
    pub fn rule(&self, kind: LoaderKind) -> Option<&LoaderRule> {
        match kind {
            LoaderKind::None => None,
            LoaderKind::Forge => Some(&self.forge),
            LoaderKind::Fabric => Some(&self.fabric),
        }
    }
}

impl Default for LoaderTable {
    fn default() -> Self {
        Self {
            forge: Installer::Forge(super::forge::ForgeInstaller).default_rule(),
            fabric: Installer::Fabric(super::fabric::FabricInstaller).default_rule(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_overrides_parse_from_json() {
        let json = r#"{
            "forge": {
                "boundary": "1.14",
                "legacyInstaller": "net.minecraftforge:forge:{mc}-{loader}:universal",
                "modernInstaller": "net.minecraftforge:forge:{mc}-{loader}:installer",
                "repository": "https://maven.example.com"
            },
            "fabric": {
                "boundary": "1.14",
                "minimum": "1.14",
                "modernInstaller": "net.fabricmc:fabric-loader:{loader}",
                "modernLibraries": ["net.fabricmc:intermediary:{mc}"],
                "repository": "https://maven.fabricmc.net"
            }
        }"#;
        let table: LoaderTable = serde_json::from_str(json).unwrap();

        let forge = table.rule(LoaderKind::Forge).unwrap();
        assert_eq!(forge.boundary, VersionToken::parse("1.14").unwrap());
        assert_eq!(forge.minimum, None);
        assert!(forge.modern_libraries.is_empty());
        assert_eq!(table.fabric.modern_libraries.len(), 1);
        assert!(table.rule(LoaderKind::None).is_none());
    }

    #[test]
    fn default_forge_boundary_is_1_13() {
        let table = LoaderTable::default();
        assert_eq!(table.forge.boundary.as_str(), "1.13");
        assert!(table.forge.legacy_installer.is_some());
    }
}
