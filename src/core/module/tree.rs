use std::collections::HashSet;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::kind::{ModuleKind, Presence};
use crate::core::artifact::Artifact;
use crate::core::error::{DistroError, DistroResult};

/// Payload of a module: one artifact or an ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleContent {
    Artifact(Artifact),
    SubModules(Vec<Module>),
}

/// A node of a server's module tree.
///
/// Sibling ids are unique and child order is the discovery/declaration
/// order; both are enforced by the constructors and by deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ModuleRepr")]
pub struct Module {
    id: String,
    name: Option<String>,
    kind: ModuleKind,
    required: bool,
    default_enabled: Option<bool>,
    content: ModuleContent,
}

impl Module {
    pub fn leaf(id: impl Into<String>, kind: ModuleKind, artifact: Artifact) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind,
            required: true,
            default_enabled: None,
            content: ModuleContent::Artifact(artifact),
        }
    }

    pub fn group(
        id: impl Into<String>,
        kind: ModuleKind,
        children: Vec<Module>,
    ) -> DistroResult<Self> {
        ensure_unique_ids(&children)?;
        Ok(Self {
            id: id.into(),
            name: None,
            kind,
            required: true,
            default_enabled: None,
            content: ModuleContent::SubModules(children),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.required = presence.required();
        self.default_enabled = presence.default_enabled();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn default_enabled(&self) -> Option<bool> {
        self.default_enabled
    }

    pub fn presence(&self) -> Presence {
        Presence::from_flags(self.required, self.default_enabled)
    }

    pub fn content(&self) -> &ModuleContent {
        &self.content
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match &self.content {
            ModuleContent::Artifact(a) => Some(a),
            ModuleContent::SubModules(_) => None,
        }
    }

    pub fn sub_modules(&self) -> &[Module] {
        match &self.content {
            ModuleContent::Artifact(_) => &[],
            ModuleContent::SubModules(children) => children,
        }
    }

    /// Append a child to a group module, rejecting duplicate ids.
    pub fn push_sub_module(&mut self, child: Module) -> DistroResult<()> {
        match &mut self.content {
            ModuleContent::SubModules(children) => {
                if children.iter().any(|c| c.id == child.id) {
                    return Err(DistroError::DuplicateModule(child.id));
                }
                children.push(child);
                Ok(())
            }
            ModuleContent::Artifact(_) => Err(DistroError::Other(format!(
                "Module {:?} is backed by an artifact and cannot hold sub-modules",
                self.id
            ))),
        }
    }

    /// Every artifact in this subtree, depth-first in child order.
    pub fn artifacts(&self) -> Vec<&Artifact> {
        let mut out = Vec::new();
        self.collect_artifacts(&mut out);
        out
    }

    fn collect_artifacts<'a>(&'a self, out: &mut Vec<&'a Artifact>) {
        match &self.content {
            ModuleContent::Artifact(a) => out.push(a),
            ModuleContent::SubModules(children) => {
                for child in children {
                    child.collect_artifacts(out);
                }
            }
        }
    }

    /// Depth-first lookup by id.
    pub fn find(&self, id: &str) -> Option<&Module> {
        if self.id == id {
            return Some(self);
        }
        self.sub_modules().iter().find_map(|c| c.find(id))
    }
}

/// Fail on the first id that appears twice in a sibling list.
pub fn ensure_unique_ids(siblings: &[Module]) -> DistroResult<()> {
    let mut seen = HashSet::new();
    for module in siblings {
        if !seen.insert(module.id.as_str()) {
            return Err(DistroError::DuplicateModule(module.id.clone()));
        }
    }
    Ok(())
}

// ── Wire format ─────────────────────────────────────────
// `{ id, name?, type, required, defaultEnabled?, artifact | null, subModules }`

impl Serialize for Module {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Module", 7)?;
        state.serialize_field("id", &self.id)?;
        match &self.name {
            Some(name) => state.serialize_field("name", name)?,
            None => state.skip_field("name")?,
        }
        state.serialize_field("type", &self.kind)?;
        state.serialize_field("required", &self.required)?;
        match &self.default_enabled {
            Some(flag) => state.serialize_field("defaultEnabled", flag)?,
            None => state.skip_field("defaultEnabled")?,
        }
        match &self.content {
            ModuleContent::Artifact(a) => {
                state.serialize_field("artifact", a)?;
                state.serialize_field("subModules", &[] as &[Module])?;
            }
            ModuleContent::SubModules(children) => {
                state.serialize_field("artifact", &None::<Artifact>)?;
                state.serialize_field("subModules", children)?;
            }
        }
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleRepr {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    kind: ModuleKind,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(default)]
    default_enabled: Option<bool>,
    #[serde(default)]
    artifact: Option<Artifact>,
    #[serde(default)]
    sub_modules: Vec<Module>,
}

fn default_required() -> bool {
    true
}

impl TryFrom<ModuleRepr> for Module {
    type Error = DistroError;

    fn try_from(repr: ModuleRepr) -> Result<Self, Self::Error> {
        let content = match (repr.artifact, repr.sub_modules) {
            (Some(_), children) if !children.is_empty() => {
                return Err(DistroError::Other(format!(
                    "Module {:?} has both an artifact and sub-modules",
                    repr.id
                )))
            }
            (Some(artifact), _) => ModuleContent::Artifact(artifact),
            (None, children) => {
                ensure_unique_ids(&children)?;
                ModuleContent::SubModules(children)
            }
        };

        Ok(Self {
            id: repr.id,
            name: repr.name,
            kind: repr.kind,
            required: repr.required,
            default_enabled: repr.default_enabled,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(path: &str) -> Artifact {
        Artifact {
            path: path.to_string(),
            hash: "da39a3ee5e6b4b0d3255bfef95601890afd80709".into(),
            size: 0,
            url: format!("https://cdn.example.com/{}", path),
            mtime: None,
        }
    }

    #[test]
    fn group_rejects_duplicate_sibling_ids() {
        let children = vec![
            Module::leaf("a.jar", ModuleKind::GenericMod, artifact("x/a.jar")),
            Module::leaf("a.jar", ModuleKind::GenericMod, artifact("y/a.jar")),
        ];
        assert!(matches!(
            Module::group("mods", ModuleKind::GenericFile, children),
            Err(DistroError::DuplicateModule(id)) if id == "a.jar"
        ));
    }

    #[test]
    fn push_preserves_order_and_uniqueness() {
        let mut group = Module::group("files", ModuleKind::GenericFile, vec![]).unwrap();
        group
            .push_sub_module(Module::leaf("z", ModuleKind::GenericFile, artifact("z")))
            .unwrap();
        group
            .push_sub_module(Module::leaf("a", ModuleKind::GenericFile, artifact("a")))
            .unwrap();
        assert!(group
            .push_sub_module(Module::leaf("z", ModuleKind::GenericFile, artifact("z2")))
            .is_err());

        let ids: Vec<&str> = group.sub_modules().iter().map(|m| m.id()).collect();
        assert_eq!(ids, ["z", "a"]);
    }

    #[test]
    fn leaf_cannot_take_children() {
        let mut leaf = Module::leaf("a", ModuleKind::Library, artifact("a"));
        assert!(leaf
            .push_sub_module(Module::leaf("b", ModuleKind::Library, artifact("b")))
            .is_err());
    }

    #[test]
    fn wire_shape_for_leaf_and_group() {
        let leaf = Module::leaf("jei.jar", ModuleKind::ForgeHostedMod, artifact("jei.jar"))
            .with_presence(Presence::OptionalOff);
        let group = Module::group("config", ModuleKind::GenericFile, vec![leaf]).unwrap();

        let value = serde_json::to_value(&group).unwrap();
        assert_eq!(value["id"], "config");
        assert_eq!(value["type"], "generic-file");
        assert!(value["artifact"].is_null());
        assert!(value.get("defaultEnabled").is_none());

        let child = &value["subModules"][0];
        assert_eq!(child["required"], false);
        assert_eq!(child["defaultEnabled"], false);
        assert_eq!(child["artifact"]["path"], "jei.jar");
        assert_eq!(child["subModules"], serde_json::json!([]));

        let back: Module = serde_json::from_value(value).unwrap();
        assert_eq!(back, group);
    }

    #[test]
    fn deserialize_rejects_artifact_with_children() {
        let json = serde_json::json!({
            "id": "bad",
            "type": "library",
            "required": true,
            "artifact": { "path": "a", "hash": "0", "size": 0, "url": "u" },
            "subModules": [
                { "id": "c", "type": "library", "required": true,
                  "artifact": { "path": "c", "hash": "0", "size": 0, "url": "u" },
                  "subModules": [] }
            ]
        });
        assert!(serde_json::from_value::<Module>(json).is_err());
    }

    #[test]
    fn artifacts_walks_depth_first() {
        let inner = Module::group(
            "inner",
            ModuleKind::GenericFile,
            vec![Module::leaf("b", ModuleKind::GenericFile, artifact("b"))],
        )
        .unwrap();
        let root = Module::group(
            "root",
            ModuleKind::GenericFile,
            vec![
                Module::leaf("a", ModuleKind::GenericFile, artifact("a")),
                inner,
                Module::leaf("c", ModuleKind::GenericFile, artifact("c")),
            ],
        )
        .unwrap();
        let paths: Vec<&str> = root.artifacts().iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, ["a", "b", "c"]);
        assert!(root.find("b").is_some());
    }
}
