// ─── CurseForge ───
// Third-party mod resolution: declared (projectId, fileId) pairs become
// downloaded, hashed modules together with their dependencies.

mod api;
mod client;
mod declaration;
mod resolver;

pub use api::{CurseForgeApi, ModTarget, RemoteDependency, RemoteFile};
pub use client::{CurseForgeClient, CURSEFORGE_API_BASE};
pub use declaration::{CurseForgeDeclaration, CurseForgeEntry, CURSEFORGE_CACHE_DIR, CURSEFORGE_FILE};
pub use resolver::{
    merge_duplicates, ResolvedDependency, Resolution, SkippedDependency, ThirdPartyModResolver, Visit,
    Visited,
};

#[cfg(test)]
pub(crate) use resolver::tests as resolver_tests;
