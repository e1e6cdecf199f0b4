use serde::{Deserialize, Serialize};

use crate::core::error::DistroResult;

use super::{fabric::FabricInstaller, forge::ForgeInstaller, table::LoaderRule};

/// Supported mod loaders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    None,
    Forge,
    Fabric,
}

impl std::fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderKind::None => write!(f, "none"),
            LoaderKind::Forge => write!(f, "forge"),
            LoaderKind::Fabric => write!(f, "fabric"),
        }
    }
}

/// The loader a server runs, as recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderSelection {
    #[serde(rename = "type")]
    pub kind: LoaderKind,
    pub version: String,
}

/// Per-loader knowledge that does not depend on the configurable table.
pub trait LoaderInstaller: Send + Sync {
    fn kind(&self) -> LoaderKind;

    /// Shape-check a loader version string. No registry lookup happens here.
    fn check_version_shape(&self, loader_version: &str) -> DistroResult<()>;

    /// Built-in layout rule used when the table is not overridden.
    fn default_rule(&self) -> LoaderRule;
}

/// Static dispatch over the loaders that have an installer.
pub enum Installer {
    Forge(ForgeInstaller),
    Fabric(FabricInstaller),
}

impl Installer {
    /// `None` for [`LoaderKind::None`], which has nothing to install.
    pub fn new(kind: LoaderKind) -> Option<Self> {
        match kind {
            LoaderKind::None => None,
            LoaderKind::Forge => Some(Self::Forge(ForgeInstaller)),
            LoaderKind::Fabric => Some(Self::Fabric(FabricInstaller)),
        }
    }

    pub fn kind(&self) -> LoaderKind {
        match self {
            Installer::Forge(i) => i.kind(),
            Installer::Fabric(i) => i.kind(),
        }
    }

    pub fn check_version_shape(&self, loader_version: &str) -> DistroResult<()> {
        match self {
            Installer::Forge(i) => i.check_version_shape(loader_version),
            Installer::Fabric(i) => i.check_version_shape(loader_version),
        }
    }

    pub fn default_rule(&self) -> LoaderRule {
        match self {
            Installer::Forge(i) => i.default_rule(),
            Installer::Fabric(i) => i.default_rule(),
        }
    }
}
