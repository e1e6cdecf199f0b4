use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::installer::{Installer, LoaderKind};
use super::table::LoaderTable;
use crate::core::artifact::ArtifactResolver;
use crate::core::downloader::{DownloadEntry, Downloader};
use crate::core::error::{DistroError, DistroResult};
use crate::core::maven::MavenArtifact;
use crate::core::module::{Module, ModuleKind};
use crate::core::version::VersionToken;

/// Directory, relative to a server, holding loader artifacts in maven layout.
pub const LOADER_DIR: &str = "loader";

/// One loader file: its maven coordinate and the module kind it becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderEntry {
    pub coordinate: MavenArtifact,
    pub kind: ModuleKind,
}

impl LoaderEntry {
    /// Location of the file relative to the server directory.
    pub fn server_relative_path(&self) -> PathBuf {
        Path::new(LOADER_DIR).join(self.coordinate.local_path())
    }
}

/// The module shape a loader takes for one game version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderLayout {
    /// A single installer jar.
    Legacy {
        kind: LoaderKind,
        repository: String,
        installer: LoaderEntry,
    },
    /// Installer jar followed by bootstrap libraries.
    Modern {
        kind: LoaderKind,
        repository: String,
        installer: LoaderEntry,
        libraries: Vec<LoaderEntry>,
    },
}

impl LoaderLayout {
    pub fn kind(&self) -> LoaderKind {
        match self {
            LoaderLayout::Legacy { kind, .. } | LoaderLayout::Modern { kind, .. } => *kind,
        }
    }

    pub fn is_modern(&self) -> bool {
        matches!(self, LoaderLayout::Modern { .. })
    }

    /// Installer first, then libraries in declaration order.
    pub fn entries(&self) -> Vec<&LoaderEntry> {
        match self {
            LoaderLayout::Legacy { installer, .. } => vec![installer],
            LoaderLayout::Modern {
                installer,
                libraries,
                ..
            } => std::iter::once(installer).chain(libraries.iter()).collect(),
        }
    }

    fn repository(&self) -> &str {
        match self {
            LoaderLayout::Legacy { repository, .. } | LoaderLayout::Modern { repository, .. } => {
                repository
            }
        }
    }

    /// Download entries whose file is not yet present under `server_dir`.
    ///
    /// Returns how many files were fetched.
    pub async fn fetch_missing(
        &self,
        server_dir: &Path,
        downloader: &Downloader,
    ) -> DistroResult<usize> {
        let entries: Vec<DownloadEntry> = self
            .entries()
            .into_iter()
            .map(|entry| DownloadEntry {
                url: entry.coordinate.url(self.repository()),
                dest: server_dir.join(entry.server_relative_path()),
                sha1: None,
            })
            .collect();

        let fetched = downloader.fetch_all(entries).await?;
        if fetched > 0 {
            info!("Fetched {} {} artifact(s)", fetched, self.kind());
        }
        Ok(fetched)
    }

    /// Resolve every entry's file and assemble the loader module.
    ///
    /// Any missing file fails the whole loader module.
    pub async fn materialize(
        &self,
        server_dir: &Path,
        artifacts: &ArtifactResolver,
    ) -> DistroResult<Module> {
        match self {
            LoaderLayout::Legacy { installer, .. } => {
                resolve_entry(installer, server_dir, artifacts).await
            }
            LoaderLayout::Modern {
                kind,
                installer,
                libraries,
                ..
            } => {
                let mut children = Vec::with_capacity(libraries.len() + 1);
                children.push(resolve_entry(installer, server_dir, artifacts).await?);
                for lib in libraries {
                    children.push(resolve_entry(lib, server_dir, artifacts).await?);
                }
                Module::group(kind.to_string(), ModuleKind::ModLoaderInstaller, children)
            }
        }
    }
}

async fn resolve_entry(
    entry: &LoaderEntry,
    server_dir: &Path,
    artifacts: &ArtifactResolver,
) -> DistroResult<Module> {
    let path = server_dir.join(entry.server_relative_path());
    let artifact = artifacts.resolve(&path).await?;
    Ok(Module::leaf(entry.coordinate.id(), entry.kind, artifact))
}

/// Decides what a loader looks like for a given game version.
///
/// Pure: no filesystem or network access. Boundaries come from the
/// [`LoaderTable`], and the layout is chosen with `is_at_least`, never by
/// comparing strings.
pub struct LoaderInstallerResolver<'a> {
    table: &'a LoaderTable,
}

impl<'a> LoaderInstallerResolver<'a> {
    pub fn new(table: &'a LoaderTable) -> Self {
        Self { table }
    }

    pub fn resolve(
        &self,
        kind: LoaderKind,
        game_version: &VersionToken,
        loader_version: &str,
    ) -> DistroResult<Option<LoaderLayout>> {
        let (Some(installer), Some(rule)) = (Installer::new(kind), self.table.rule(kind)) else {
            return Ok(None);
        };

        installer.check_version_shape(loader_version)?;

        let unsupported = |reason: String| DistroError::UnsupportedLoaderForVersion {
            loader: kind.to_string(),
            loader_version: loader_version.to_string(),
            game_version: game_version.to_string(),
            reason,
        };

        if let Some(minimum) = &rule.minimum {
            if !game_version.is_at_least(minimum) {
                return Err(unsupported(format!("requires Minecraft {} or newer", minimum)));
            }
        }

        let mc = game_version.canonical();
        let expand = |template: &str, kind: ModuleKind| -> DistroResult<LoaderEntry> {
            let coord = template
                .replace("{mc}", &mc)
                .replace("{loader}", loader_version);
            Ok(LoaderEntry {
                coordinate: MavenArtifact::parse(&coord)?,
                kind,
            })
        };

        let layout = if game_version.is_at_least(&rule.boundary) {
            debug!("{} {} uses the modern layout", kind, game_version);
            LoaderLayout::Modern {
                kind,
                repository: rule.repository.clone(),
                installer: expand(&rule.modern_installer, ModuleKind::ModLoaderInstaller)?,
                libraries: rule
                    .modern_libraries
                    .iter()
                    .map(|t| expand(t, ModuleKind::ModLoaderLibrary))
                    .collect::<DistroResult<_>>()?,
            }
        } else {
            let Some(template) = rule.legacy_installer.as_deref() else {
                return Err(unsupported(format!(
                    "no layout below Minecraft {}",
                    rule.boundary
                )));
            };
            debug!("{} {} uses the legacy layout", kind, game_version);
            LoaderLayout::Legacy {
                kind,
                repository: rule.repository.clone(),
                installer: expand(template, ModuleKind::ModLoaderInstaller)?,
            }
        };

        Ok(Some(layout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::HashCache;
    use tempfile::TempDir;

    fn v(s: &str) -> VersionToken {
        VersionToken::parse(s).unwrap()
    }

    #[test]
    fn none_has_no_layout() {
        let table = LoaderTable::default();
        let resolver = LoaderInstallerResolver::new(&table);
        assert_eq!(resolver.resolve(LoaderKind::None, &v("1.16.5"), "").unwrap(), None);
    }

    #[test]
    fn forge_below_boundary_is_single_installer() {
        let table = LoaderTable::default();
        let layout = LoaderInstallerResolver::new(&table)
            .resolve(LoaderKind::Forge, &v("1.12.2"), "14.23.5.2860")
            .unwrap()
            .unwrap();

        assert!(!layout.is_modern());
        let entries = layout.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].coordinate.id(),
            "net.minecraftforge:forge:1.12.2-14.23.5.2860:universal"
        );
        assert_eq!(entries[0].kind, ModuleKind::ModLoaderInstaller);
    }

    #[test]
    fn forge_at_boundary_adds_bootstrap_libraries() {
        let table = LoaderTable::default();
        let resolver = LoaderInstallerResolver::new(&table);
        for game in ["1.13", "1.16.5"] {
            let layout = resolver
                .resolve(LoaderKind::Forge, &v(game), "36.2.39")
                .unwrap()
                .unwrap();
            assert!(layout.is_modern(), "{game}");
            let kinds: Vec<ModuleKind> = layout.entries().iter().map(|e| e.kind).collect();
            assert_eq!(
                kinds,
                [
                    ModuleKind::ModLoaderInstaller,
                    ModuleKind::ModLoaderLibrary,
                    ModuleKind::ModLoaderLibrary
                ]
            );
        }
    }

    #[test]
    fn coordinates_use_the_canonical_game_version() {
        let table = LoaderTable::default();
        let layout = LoaderInstallerResolver::new(&table)
            .resolve(LoaderKind::Fabric, &v("v1.20.01"), "0.14.21")
            .unwrap()
            .unwrap();
        let ids: Vec<String> = layout.entries().iter().map(|e| e.coordinate.id()).collect();
        assert!(ids.contains(&"net.fabricmc:intermediary:1.20.1".to_string()), "{ids:?}");
    }

    #[test]
    fn boundary_comes_from_the_table() {
        let mut table = LoaderTable::default();
        table.forge.boundary = v("1.17");
        let layout = LoaderInstallerResolver::new(&table)
            .resolve(LoaderKind::Forge, &v("1.16.5"), "36.2.39")
            .unwrap()
            .unwrap();
        assert!(!layout.is_modern());
    }

    #[test]
    fn fabric_below_minimum_is_unsupported() {
        let table = LoaderTable::default();
        let err = LoaderInstallerResolver::new(&table)
            .resolve(LoaderKind::Fabric, &v("1.12.2"), "0.14.21")
            .unwrap_err();
        assert!(matches!(err, DistroError::UnsupportedLoaderForVersion { .. }));
    }

    #[test]
    fn malformed_loader_version_is_rejected() {
        let table = LoaderTable::default();
        let err = LoaderInstallerResolver::new(&table)
            .resolve(LoaderKind::Fabric, &v("1.20.1"), "latest")
            .unwrap_err();
        assert!(matches!(err, DistroError::InvalidVersion(_)));
    }

    #[tokio::test]
    async fn materialize_builds_required_group() {
        let dir = TempDir::new().unwrap();
        let server_dir = dir.path().join("servers").join("fab");
        let table = LoaderTable::default();
        let layout = LoaderInstallerResolver::new(&table)
            .resolve(LoaderKind::Fabric, &v("1.20.1"), "0.14.21")
            .unwrap()
            .unwrap();
        for entry in layout.entries() {
            let path = server_dir.join(entry.server_relative_path());
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, entry.coordinate.id()).unwrap();
        }

        let artifacts = ArtifactResolver::new(dir.path(), "https://cdn.example.com/", HashCache::default());
        let module = layout.materialize(&server_dir, &artifacts).await.unwrap();

        assert_eq!(module.id(), "fabric");
        assert!(module.required());
        let ids: Vec<&str> = module.sub_modules().iter().map(|m| m.id()).collect();
        assert_eq!(
            ids,
            ["net.fabricmc:fabric-loader:0.14.21", "net.fabricmc:intermediary:1.20.1"]
        );
        assert!(module.sub_modules().iter().all(|m| m.required()));
        assert_eq!(
            module.sub_modules()[1].artifact().unwrap().path,
            "servers/fab/loader/net/fabricmc/intermediary/1.20.1/intermediary-1.20.1.jar"
        );
    }

    #[tokio::test]
    async fn materialize_fails_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let table = LoaderTable::default();
        let layout = LoaderInstallerResolver::new(&table)
            .resolve(LoaderKind::Forge, &v("1.12.2"), "14.23.5.2860")
            .unwrap()
            .unwrap();
        let artifacts = ArtifactResolver::new(dir.path(), "https://cdn.example.com/", HashCache::default());
        let err = layout.materialize(dir.path(), &artifacts).await.unwrap_err();
        assert!(matches!(err, DistroError::FileNotFound(_)));
    }
}
