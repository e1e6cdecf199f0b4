use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{DistroError, DistroResult};
use crate::core::module::Presence;

/// Marker file in a server directory declaring third-party mods.
pub const CURSEFORGE_FILE: &str = "curseforge.json";
/// Server-relative cache of downloaded third-party files.
pub const CURSEFORGE_CACHE_DIR: &str = "curseforge";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseForgeEntry {
    pub project_id: u32,
    pub file_id: u32,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_enabled: Option<bool>,
}

fn default_required() -> bool {
    true
}

impl CurseForgeEntry {
    pub fn presence(&self) -> Presence {
        Presence::from_flags(self.required, self.default_enabled)
    }
}

/// Contents of `curseforge.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurseForgeDeclaration {
    #[serde(default)]
    pub mods: Vec<CurseForgeEntry>,
}

impl CurseForgeDeclaration {
    /// Read the declaration next to a server; a missing file means none.
    pub async fn load(server_dir: &Path) -> DistroResult<Self> {
        let path = server_dir.join(CURSEFORGE_FILE);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(DistroError::io(&path, e)),
        };
        let declaration: Self = serde_json::from_str(&raw)?;

        let mut seen = std::collections::HashSet::new();
        for entry in &declaration.mods {
            if !seen.insert((entry.project_id, entry.file_id)) {
                return Err(DistroError::InvalidConfiguration(format!(
                    "{} declares {}/{} twice",
                    path.display(),
                    entry.project_id,
                    entry.file_id
                )));
            }
        }
        Ok(declaration)
    }
}
