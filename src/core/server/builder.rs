use std::path::{Path, PathBuf};

use futures_util::future::try_join_all;
use tracing::{info, warn};

use super::model::{mods_dir_name, select_loader, Server, ServerMeta, FILES_DIR, LIBRARIES_DIR};
use crate::core::error::{DistroError, DistroResult};
use crate::core::fs::create_dir_safe;
use crate::core::loaders::{LoaderInstallerResolver, LoaderLayout, LoaderTable, LOADER_DIR};
use crate::core::module::Presence;
use crate::core::version::VersionToken;

/// Result of [`ServerStructureBuilder::create_server`].
#[derive(Debug, Clone)]
pub struct CreatedServer {
    pub server: Server,
    pub directory: PathBuf,
    /// Where the loader artifacts are expected, if the server has a loader.
    pub loader_layout: Option<LoaderLayout>,
}

/// Scaffolds new servers under `<root>/servers/`.
pub struct ServerStructureBuilder<'a> {
    servers_dir: PathBuf,
    table: &'a LoaderTable,
}

impl<'a> ServerStructureBuilder<'a> {
    pub fn new(servers_dir: impl Into<PathBuf>, table: &'a LoaderTable) -> Self {
        Self {
            servers_dir: servers_dir.into(),
            table,
        }
    }

    /// Create the skeleton of a server.
    ///
    /// Everything is validated before the first write, so a rejected request
    /// leaves the filesystem untouched. Re-running on an existing server only
    /// adds what is missing; `servermeta.json` is never overwritten.
    ///
    /// Creates:
    /// - `<server>/servermeta.json`
    /// - `<server>/{forgemods,fabricmods}/{required,optionalon,optionaloff}/`
    /// - `<server>/loader/`
    /// - `<server>/libraries/`
    /// - `<server>/files/`
    pub async fn create_server(
        &self,
        id: &str,
        game_version: &str,
        forge_version: Option<&str>,
        fabric_version: Option<&str>,
    ) -> DistroResult<CreatedServer> {
        check_server_id(id)?;
        let version = VersionToken::parse(game_version)?;
        let selection = select_loader(forge_version, fabric_version)?;

        let loader_layout = match &selection {
            Some(sel) => {
                LoaderInstallerResolver::new(self.table).resolve(sel.kind, &version, &sel.version)?
            }
            None => None,
        };

        let directory = self.servers_dir.join(id);
        let mut dirs = vec![directory.join(LIBRARIES_DIR), directory.join(FILES_DIR)];
        if let Some(sel) = &selection {
            if let Some(mods) = mods_dir_name(sel.kind) {
                dirs.extend(
                    Presence::ALL
                        .iter()
                        .map(|p| directory.join(mods).join(p.dir_name())),
                );
            }
            dirs.push(directory.join(LOADER_DIR));
        }
        try_join_all(dirs.iter().map(|d| create_dir_safe(d))).await?;

        let meta = ServerMeta::new(version, selection.as_ref());
        if !meta.save_if_absent(&directory).await? {
            warn!(
                "Server '{}' already has a servermeta.json, leaving it as is",
                id
            );
        }

        let server = Server::from_meta(id, &meta)?;
        info!(
            "Created server '{}' ({} {})",
            id,
            server.version,
            server.loader_kind()
        );
        Ok(CreatedServer {
            server,
            directory,
            loader_layout,
        })
    }
}

/// Server ids become directory names.
fn check_server_id(id: &str) -> DistroResult<()> {
    let path = Path::new(id);
    let plain = !id.trim().is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && path.components().count() == 1;
    if !plain {
        return Err(DistroError::InvalidConfiguration(format!(
            "server id {:?} is not a plain directory name",
            id
        )));
    }
    Ok(())
}
