use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{DistroError, DistroResult};
use crate::core::fs::{to_json_bytes, write_if_absent};
use crate::core::loaders::{LoaderKind, LoaderSelection};
use crate::core::module::Module;
use crate::core::version::VersionToken;

pub const SERVER_META_FILE: &str = "servermeta.json";
pub const LIBRARIES_DIR: &str = "libraries";
pub const FILES_DIR: &str = "files";
pub const FORGE_MODS_DIR: &str = "forgemods";
pub const FABRIC_MODS_DIR: &str = "fabricmods";

/// Mod directory of a server running `kind`, if that loader takes mods.
pub fn mods_dir_name(kind: LoaderKind) -> Option<&'static str> {
    match kind {
        LoaderKind::None => None,
        LoaderKind::Forge => Some(FORGE_MODS_DIR),
        LoaderKind::Fabric => Some(FABRIC_MODS_DIR),
    }
}

/// One server entry of the distribution manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: VersionToken,
    #[serde(default)]
    pub main_server: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<LoaderSelection>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Server {
    /// A server with no modules yet, described by its `servermeta.json`.
    pub fn from_meta(id: impl Into<String>, meta: &ServerMeta) -> DistroResult<Self> {
        Ok(Self {
            id: id.into(),
            name: meta.meta.name.clone(),
            description: meta.meta.description.clone(),
            version: meta.meta.version.clone(),
            main_server: meta.meta.main_server,
            loader: meta.loader()?,
            modules: Vec::new(),
        })
    }

    pub fn loader_kind(&self) -> LoaderKind {
        self.loader.as_ref().map_or(LoaderKind::None, |l| l.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMetaInfo {
    pub version: VersionToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub main_server: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderVersionMeta {
    pub version: String,
}

/// Contents of `servers/<id>/servermeta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerMeta {
    pub meta: ServerMetaInfo,
    #[serde(default)]
    pub forge: Option<LoaderVersionMeta>,
    #[serde(default)]
    pub fabric: Option<LoaderVersionMeta>,
}

impl ServerMeta {
    pub fn new(version: VersionToken, selection: Option<&LoaderSelection>) -> Self {
        let pick = |kind: LoaderKind| {
            selection
                .filter(|s| s.kind == kind)
                .map(|s| LoaderVersionMeta {
                    version: s.version.clone(),
                })
        };
        Self {
            meta: ServerMetaInfo {
                version,
                name: None,
                description: None,
                main_server: false,
            },
            forge: pick(LoaderKind::Forge),
            fabric: pick(LoaderKind::Fabric),
        }
    }

    /// The declared loader. Declaring both forge and fabric is an error.
    pub fn loader(&self) -> DistroResult<Option<LoaderSelection>> {
        select_loader(
            self.forge.as_ref().map(|l| l.version.as_str()),
            self.fabric.as_ref().map(|l| l.version.as_str()),
        )
    }

    pub async fn load(server_dir: &Path) -> DistroResult<Self> {
        let path = server_dir.join(SERVER_META_FILE);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DistroError::io(&path, e))?;
        serde_json::from_str(&raw).map_err(|e| {
            DistroError::InvalidConfiguration(format!("{}: {}", path.display(), e))
        })
    }

    /// Write the file unless one already exists. Returns whether it wrote.
    pub async fn save_if_absent(&self, server_dir: &Path) -> DistroResult<bool> {
        write_if_absent(&server_dir.join(SERVER_META_FILE), &to_json_bytes(self)?).await
    }
}

/// Turn the optional forge/fabric versions into one loader selection.
pub fn select_loader(
    forge_version: Option<&str>,
    fabric_version: Option<&str>,
) -> DistroResult<Option<LoaderSelection>> {
    match (forge_version, fabric_version) {
        (Some(forge), Some(fabric)) => Err(DistroError::InvalidConfiguration(format!(
            "a server runs one loader, got forge {} and fabric {}",
            forge, fabric
        ))),
        (Some(version), None) => Ok(Some(LoaderSelection {
            kind: LoaderKind::Forge,
            version: version.to_string(),
        })),
        (None, Some(version)) => Ok(Some(LoaderSelection {
            kind: LoaderKind::Fabric,
            version: version.to_string(),
        })),
        (None, None) => Ok(None),
    }
}
