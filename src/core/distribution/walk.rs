use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::core::artifact::Artifact;
use crate::core::error::{DistroError, DistroResult};
use crate::core::module::{Module, ModuleKind, Presence};

/// A module found on disk whose files are not hashed yet.
#[derive(Debug)]
pub(super) enum Planned {
    File {
        path: PathBuf,
        id: String,
        kind: ModuleKind,
        presence: Presence,
    },
    Group {
        path: PathBuf,
        id: String,
        kind: ModuleKind,
        children: Vec<Planned>,
    },
    /// A sub-directory that could not be listed. Reported on its own so its
    /// siblings still build.
    Unreadable { path: PathBuf, error: DistroError },
}

/// Directory entries sorted by file name. A missing directory has none.
/// Dotfiles are ignored.
async fn sorted_entries(dir: &Path) -> DistroResult<Vec<(String, PathBuf)>> {
    let mut reader = match tokio::fs::read_dir(dir).await {
        Ok(reader) => reader,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DistroError::io(dir, e)),
    };

    let mut entries = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|e| DistroError::io(dir, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        entries.push((name, entry.path()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Plan the files of `dir` as leaf modules of `kind`. With `groups`, each
/// sub-directory becomes a group module of the same kind; without, it is
/// skipped.
///
/// Anything that is not a readable directory is planned as a file, so a
/// broken entry surfaces as a failure of that one module when it is hashed.
pub(super) fn plan_directory<'a>(
    dir: &'a Path,
    kind: ModuleKind,
    presence: Presence,
    groups: bool,
) -> Pin<Box<dyn Future<Output = DistroResult<Vec<Planned>>> + Send + 'a>> {
    Box::pin(async move {
        let mut planned = Vec::new();
        for (name, path) in sorted_entries(dir).await? {
            let is_dir = tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);

            if !is_dir {
                planned.push(Planned::File {
                    path,
                    id: name,
                    kind,
                    presence,
                });
            } else if groups {
                planned.push(plan_group(path, name, kind, presence).await);
            }
        }
        Ok(planned)
    })
}

async fn plan_group(path: PathBuf, id: String, kind: ModuleKind, presence: Presence) -> Planned {
    match plan_directory(&path, kind, presence, true).await {
        Ok(children) => Planned::Group {
            path,
            id,
            kind,
            children,
        },
        Err(error) => Planned::Unreadable { path, error },
    }
}

/// Every file path in plan order.
pub(super) fn file_paths(plan: &[Planned], out: &mut Vec<PathBuf>) {
    for node in plan {
        match node {
            Planned::File { path, .. } => out.push(path.clone()),
            Planned::Group { children, .. } => file_paths(children, out),
            Planned::Unreadable { .. } => {}
        }
    }
}

/// Turn a plan into modules using the hashed artifacts.
///
/// Files whose hashing failed are dropped and reported through `on_failure`
/// with their path; their siblings are kept.
pub(super) fn assemble(
    plan: Vec<Planned>,
    hashed: &mut HashMap<PathBuf, DistroResult<Artifact>>,
    on_failure: &mut dyn FnMut(&Path, DistroError),
) -> Vec<Module> {
    let mut modules = Vec::with_capacity(plan.len());
    for node in plan {
        match node {
            Planned::File {
                path,
                id,
                kind,
                presence,
            } => match hashed.remove(&path) {
                Some(Ok(artifact)) => {
                    modules.push(Module::leaf(id, kind, artifact).with_presence(presence))
                }
                Some(Err(e)) => on_failure(&path, e),
                None => on_failure(&path, DistroError::FileNotFound(path.clone())),
            },
            Planned::Group {
                path,
                id,
                kind,
                children,
            } => {
                let children = assemble(children, hashed, on_failure);
                match Module::group(id, kind, children) {
                    Ok(group) => modules.push(group),
                    Err(e) => on_failure(&path, e),
                }
            }
            Planned::Unreadable { path, error } => on_failure(&path, error),
        }
    }
    modules
}
