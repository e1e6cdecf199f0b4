use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::{debug, warn};

use super::api::{CurseForgeApi, ModTarget, RemoteDependency, RemoteFile};
use crate::core::artifact::{Artifact, ArtifactResolver};
use crate::core::config::RetryPolicy;
use crate::core::error::{DistroError, DistroResult};
use crate::core::http::retry_with_backoff;
use crate::core::module::{Module, ModuleKind, Presence};

type FileKey = (u32, u32);

/// How far a file has been taken within one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Added as an optional dependency; its own dependencies were not read.
    Leaf,
    /// Resolved with its required dependencies.
    Expanded,
}

/// Files seen by one top-level request.
pub type Visited = HashMap<FileKey, Visit>;

/// A resolved file and its resolved dependencies. Only lives until it is
/// collapsed into modules.
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub project_id: u32,
    pub file_id: u32,
    pub file_name: String,
    pub artifact: Artifact,
    pub presence: Presence,
    pub dependencies: Vec<ResolvedDependency>,
}

impl ResolvedDependency {
    pub fn module_id(project_id: u32, file_id: u32) -> String {
        format!("curseforge:{}:{}", project_id, file_id)
    }

    /// Flatten into sibling modules: this file first, then each dependency
    /// subtree depth-first in declaration order. A file reached more than
    /// once keeps its first position and the strongest presence.
    pub fn into_modules(self, kind: ModuleKind) -> Vec<Module> {
        let mut out = Vec::new();
        self.collapse_into(kind, &mut out);
        merge_duplicates(out)
    }

    fn collapse_into(self, kind: ModuleKind, out: &mut Vec<Module>) {
        out.push(
            Module::leaf(Self::module_id(self.project_id, self.file_id), kind, self.artifact)
                .with_name(self.file_name)
                .with_presence(self.presence),
        );
        for dep in self.dependencies {
            dep.collapse_into(kind, out);
        }
    }
}

/// Collapse modules sharing an id into the first one, raised to the
/// strongest presence among them.
pub fn merge_duplicates(modules: Vec<Module>) -> Vec<Module> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Module> = Vec::with_capacity(modules.len());
    for module in modules {
        match index.get(module.id()) {
            Some(&i) => {
                let presence = kept[i].presence().strongest(module.presence());
                if presence != kept[i].presence() {
                    kept[i] = kept[i].clone().with_presence(presence);
                }
            }
            None => {
                index.insert(module.id().to_string(), kept.len());
                kept.push(module);
            }
        }
    }
    kept
}

/// An optional dependency that could not be resolved and was left out.
#[derive(Debug)]
pub struct SkippedDependency {
    pub parent: FileKey,
    pub project_id: u32,
    /// `None` when no file of the project fits the target.
    pub file_id: Option<u32>,
    pub error: DistroError,
}

impl SkippedDependency {
    pub fn module_id(&self) -> String {
        match self.file_id {
            Some(file_id) => ResolvedDependency::module_id(self.project_id, file_id),
            None => format!("curseforge:{}", self.project_id),
        }
    }
}

#[derive(Debug)]
pub struct Resolution {
    pub root: ResolvedDependency,
    pub skipped: Vec<SkippedDependency>,
}

/// Mutable state of one top-level resolution.
struct Walk {
    visited: Visited,
    /// Ancestors of the node being resolved, for cycle detection.
    stack: Vec<FileKey>,
    skipped: Vec<SkippedDependency>,
}

impl Walk {
    fn skip(&mut self, parent: FileKey, dep: &RemoteDependency, file_id: Option<u32>, error: DistroError) {
        warn!(
            "Skipping optional dependency {} of {}/{}: {}",
            dep.project_id, parent.0, parent.1, error
        );
        self.skipped.push(SkippedDependency {
            parent,
            project_id: dep.project_id,
            file_id,
            error,
        });
    }
}

/// Resolves declared `(projectId, fileId)` pairs into downloaded, hashed
/// files, pulling required dependencies in recursively.
///
/// A required dependency that leads back to one of its ancestors fails the
/// whole request with [`DistroError::CycleDetected`]. A file already
/// resolved elsewhere in the same request (diamond) is not repeated.
/// Optional dependencies become `required = false, defaultEnabled = false`
/// modules and are not followed further, unless a required edge reaches
/// the same file later, which expands it with its parent's presence.
pub struct ThirdPartyModResolver<'a> {
    api: &'a dyn CurseForgeApi,
    artifacts: &'a ArtifactResolver,
    retry: &'a RetryPolicy,
    cache_dir: PathBuf,
    target: ModTarget,
}

impl<'a> ThirdPartyModResolver<'a> {
    pub fn new(
        api: &'a dyn CurseForgeApi,
        artifacts: &'a ArtifactResolver,
        retry: &'a RetryPolicy,
        cache_dir: impl Into<PathBuf>,
        target: ModTarget,
    ) -> Self {
        Self {
            api,
            artifacts,
            retry,
            cache_dir: cache_dir.into(),
            target,
        }
    }

    /// Resolve one declared file. `visited` is scoped to this request by the
    /// caller; it is extended with every pair pulled into the result.
    pub async fn resolve(
        &self,
        project_id: u32,
        file_id: u32,
        presence: Presence,
        visited: &mut Visited,
    ) -> DistroResult<Resolution> {
        let key = (project_id, file_id);
        let mut walk = Walk {
            visited: std::mem::take(visited),
            stack: Vec::new(),
            skipped: Vec::new(),
        };
        walk.visited.insert(key, Visit::Expanded);

        let result = self.resolve_node(key, presence, &mut walk).await;
        *visited = walk.visited;

        Ok(Resolution {
            root: result?,
            skipped: walk.skipped,
        })
    }

    fn resolve_node<'s>(
        &'s self,
        key: FileKey,
        presence: Presence,
        walk: &'s mut Walk,
    ) -> Pin<Box<dyn Future<Output = DistroResult<ResolvedDependency>> + Send + 's>> {
        Box::pin(async move {
            let (file, artifact) = self.fetch_file(key).await?;

            walk.stack.push(key);
            let result = self.resolve_dependencies(key, &file, presence, walk).await;
            walk.stack.pop();

            Ok(ResolvedDependency {
                project_id: key.0,
                file_id: key.1,
                file_name: file.file_name,
                artifact,
                presence,
                dependencies: result?,
            })
        })
    }

    async fn resolve_dependencies(
        &self,
        key: FileKey,
        file: &RemoteFile,
        presence: Presence,
        walk: &mut Walk,
    ) -> DistroResult<Vec<ResolvedDependency>> {
        let mut dependencies = Vec::new();
        for dep in &file.dependencies {
            let dep_key = match self.dependency_key(dep).await {
                Ok(dep_key) => dep_key,
                Err(error) if !dep.required => {
                    walk.skip(key, dep, dep.file_id, error);
                    continue;
                }
                Err(error) => return Err(error),
            };

            if dep.required {
                if let Some(pos) = walk.stack.iter().position(|k| *k == dep_key) {
                    let mut chain = walk.stack[pos..].to_vec();
                    chain.push(dep_key);
                    return Err(DistroError::CycleDetected(chain));
                }
            }

            match (walk.visited.get(&dep_key), dep.required) {
                (Some(Visit::Expanded), _) | (Some(Visit::Leaf), false) => {
                    debug!(
                        "CurseForge {}/{} already resolved in this request",
                        dep_key.0, dep_key.1
                    );
                    continue;
                }
                (Some(Visit::Leaf), true) => debug!(
                    "CurseForge {}/{} is required after all, expanding it",
                    dep_key.0, dep_key.1
                ),
                (None, _) => {}
            }

            if dep.required {
                walk.visited.insert(dep_key, Visit::Expanded);
                // A required dependency is only as present as its parent.
                dependencies.push(self.resolve_node(dep_key, presence, walk).await?);
            } else {
                walk.visited.insert(dep_key, Visit::Leaf);
                match self.fetch_file(dep_key).await {
                    Ok((dep_file, dep_artifact)) => dependencies.push(ResolvedDependency {
                        project_id: dep_key.0,
                        file_id: dep_key.1,
                        file_name: dep_file.file_name,
                        artifact: dep_artifact,
                        presence: Presence::OptionalOff,
                        dependencies: Vec::new(),
                    }),
                    Err(error) => walk.skip(key, dep, Some(dep_key.1), error),
                }
            }
        }
        Ok(dependencies)
    }

    /// The declared file, or the newest one fitting the target when the
    /// dependency only names a project.
    async fn dependency_key(&self, dep: &RemoteDependency) -> DistroResult<FileKey> {
        if let Some(file_id) = dep.file_id {
            return Ok((dep.project_id, file_id));
        }
        let api = self.api;
        let target = &self.target;
        let project_id = dep.project_id;
        let label = format!("CurseForge {} latest file", project_id);
        let file_id = retry_with_backoff(self.retry, &label, move || {
            api.latest_file(project_id, target)
        })
        .await?;
        Ok((project_id, file_id))
    }

    /// Metadata (with retries) plus the local artifact, downloading the file
    /// unless an intact copy is already cached.
    async fn fetch_file(&self, (project_id, file_id): FileKey) -> DistroResult<(RemoteFile, Artifact)> {
        let api = self.api;
        let target = &self.target;
        let label = format!("CurseForge {}/{}", project_id, file_id);
        let file = retry_with_backoff(self.retry, &label, move || {
            api.file_info(project_id, file_id, target)
        })
        .await?;

        check_file_name(&file.file_name)?;
        let dest = self
            .cache_dir
            .join(project_id.to_string())
            .join(file_id.to_string())
            .join(&file.file_name);

        if let Some(artifact) = self.cached_artifact(&dest, &file).await? {
            debug!("Using cached {}", artifact.path);
            return Ok((file, artifact));
        }

        self.api.download(&file, &dest).await?;
        let artifact = self.artifacts.resolve(&dest).await?;
        if !matches_remote(&artifact, &file) {
            return Err(DistroError::Sha1Mismatch {
                path: dest,
                expected: file.sha1.clone().unwrap_or_default(),
                actual: artifact.hash,
            });
        }
        Ok((file, artifact))
    }

    async fn cached_artifact(&self, dest: &Path, file: &RemoteFile) -> DistroResult<Option<Artifact>> {
        if !tokio::fs::try_exists(dest)
            .await
            .map_err(|e| DistroError::io(dest, e))?
        {
            return Ok(None);
        }
        let artifact = self.artifacts.resolve(dest).await?;
        Ok(matches_remote(&artifact, file).then_some(artifact))
    }
}

fn matches_remote(artifact: &Artifact, file: &RemoteFile) -> bool {
    let size_ok = file.size == 0 || artifact.size == file.size;
    let hash_ok = file
        .sha1
        .as_deref()
        .map_or(true, |h| h.eq_ignore_ascii_case(&artifact.hash));
    size_ok && hash_ok
}

/// Remote file names end up on disk; refuse anything that is not a plain
/// file name.
fn check_file_name(name: &str) -> DistroResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(DistroError::Other(format!(
            "Refusing remote file name {:?}",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::artifact::HashCache;
    use crate::core::curseforge::api::RemoteDependency;
    use crate::core::loaders::LoaderKind;
    use crate::core::version::VersionToken;
    use async_trait::async_trait;
    use sha1::{Digest, Sha1};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// In-memory CurseForge: files keyed by id pair, each with content and
    /// dependencies. Unknown ids are `NotFound`; ids listed in
    /// `flaky` fail with a 503 that many times first. A dependency with file
    /// id 0 names only its project and is picked through `latest`.
    #[derive(Default)]
    pub(crate) struct FakeCurseForge {
        files: HashMap<FileKey, (Vec<u8>, Vec<RemoteDependency>)>,
        latest: HashMap<u32, u32>,
        flaky: Mutex<HashMap<FileKey, usize>>,
        pub(crate) info_calls: AtomicUsize,
        pub(crate) downloads: AtomicUsize,
    }

    impl FakeCurseForge {
        pub(crate) fn with_file(mut self, key: FileKey, deps: &[(u32, u32, bool)]) -> Self {
            let content = format!("mod {}-{}", key.0, key.1).into_bytes();
            let deps = deps
                .iter()
                .map(|&(p, f, required)| RemoteDependency {
                    project_id: p,
                    file_id: (f != 0).then_some(f),
                    required,
                })
                .collect();
            self.files.insert(key, (content, deps));
            self
        }

        pub(crate) fn with_latest(mut self, project_id: u32, file_id: u32) -> Self {
            self.latest.insert(project_id, file_id);
            self
        }

        pub(crate) fn flaky(self, key: FileKey, failures: usize) -> Self {
            self.flaky.lock().unwrap().insert(key, failures);
            self
        }
    }

    #[async_trait]
    impl CurseForgeApi for FakeCurseForge {
        async fn file_info(
            &self,
            project_id: u32,
            file_id: u32,
            _target: &ModTarget,
        ) -> DistroResult<RemoteFile> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            let key = (project_id, file_id);
            if let Some(left) = self.flaky.lock().unwrap().get_mut(&key) {
                if *left > 0 {
                    *left -= 1;
                    return Err(DistroError::Network {
                        url: format!("fake://{}/{}", project_id, file_id),
                        status: Some(503),
                        message: "HTTP 503".into(),
                    });
                }
            }
            let (content, deps) = self.files.get(&key).ok_or(DistroError::NotFound {
                project_id,
                file_id,
            })?;
            Ok(RemoteFile {
                project_id,
                file_id,
                file_name: format!("mod-{}-{}.jar", project_id, file_id),
                size: content.len() as u64,
                download_url: format!("fake://{}/{}", project_id, file_id),
                sha1: Some(hex::encode(Sha1::digest(content))),
                dependencies: deps.clone(),
            })
        }

        async fn latest_file(&self, project_id: u32, _target: &ModTarget) -> DistroResult<u32> {
            self.latest.get(&project_id).copied().ok_or(DistroError::NotFound {
                project_id,
                file_id: 0,
            })
        }

        async fn download(&self, file: &RemoteFile, dest: &Path) -> DistroResult<()> {
            self.downloads.fetch_add(1, Ordering::SeqCst);
            let (content, _) = &self.files[&(file.project_id, file.file_id)];
            tokio::fs::create_dir_all(dest.parent().unwrap()).await?;
            tokio::fs::write(dest, content).await?;
            Ok(())
        }
    }

    pub(crate) fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            timeout: Duration::from_secs(1),
        }
    }

    fn target() -> ModTarget {
        ModTarget {
            game_version: VersionToken::parse("1.16.5").unwrap(),
            loader: LoaderKind::Forge,
        }
    }

    struct Fixture {
        dir: TempDir,
        artifacts: ArtifactResolver,
        retry: RetryPolicy,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let artifacts =
                ArtifactResolver::new(dir.path(), "https://cdn.example.com/", HashCache::default());
            Self {
                dir,
                artifacts,
                retry: fast_retry(),
            }
        }

        fn resolver<'a>(&'a self, api: &'a FakeCurseForge) -> ThirdPartyModResolver<'a> {
            ThirdPartyModResolver::new(
                api,
                &self.artifacts,
                &self.retry,
                self.dir.path().join("servers/s1/curseforge"),
                target(),
            )
        }
    }

    fn ids(modules: &[Module]) -> Vec<&str> {
        modules.iter().map(|m| m.id()).collect()
    }

    #[tokio::test]
    async fn resolves_required_dependencies_transitively() {
        let api = FakeCurseForge::default()
            .with_file((1, 10), &[(2, 20, true)])
            .with_file((2, 20), &[(3, 30, true)])
            .with_file((3, 30), &[]);
        let fixture = Fixture::new();
        let mut visited = Visited::new();

        let resolution = fixture
            .resolver(&api)
            .resolve(1, 10, Presence::Required, &mut visited)
            .await
            .unwrap();
        let modules = resolution.root.into_modules(ModuleKind::ForgeHostedMod);

        assert_eq!(
            ids(&modules),
            ["curseforge:1:10", "curseforge:2:20", "curseforge:3:30"]
        );
        assert!(modules.iter().all(|m| m.required()));
        assert_eq!(
            modules[0].artifact().unwrap().path,
            "servers/s1/curseforge/1/10/mod-1-10.jar"
        );
        assert_eq!(visited.len(), 3);
    }

    #[tokio::test]
    async fn cycle_fails_the_subtree() {
        let api = FakeCurseForge::default()
            .with_file((1, 10), &[(2, 20, true)])
            .with_file((2, 20), &[(1, 10, true)]);
        let fixture = Fixture::new();

        let err = fixture
            .resolver(&api)
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap_err();
        match err {
            DistroError::CycleDetected(chain) => assert_eq!(chain, [(1, 10), (2, 20), (1, 10)]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn diamond_is_not_a_cycle() {
        let api = FakeCurseForge::default()
            .with_file((1, 10), &[(2, 20, true), (3, 30, true)])
            .with_file((2, 20), &[(4, 40, true)])
            .with_file((3, 30), &[(4, 40, true)])
            .with_file((4, 40), &[]);
        let fixture = Fixture::new();

        let resolution = fixture
            .resolver(&api)
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap();
        let modules = resolution.root.into_modules(ModuleKind::GenericMod);
        assert_eq!(
            ids(&modules),
            ["curseforge:1:10", "curseforge:2:20", "curseforge:4:40", "curseforge:3:30"]
        );
    }

    #[tokio::test]
    async fn optional_dependencies_are_not_followed() {
        let api = FakeCurseForge::default()
            .with_file((1, 10), &[(2, 20, false)])
            .with_file((2, 20), &[(3, 30, true)]);
        let fixture = Fixture::new();

        let resolution = fixture
            .resolver(&api)
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap();
        let modules = resolution.root.into_modules(ModuleKind::ForgeHostedMod);

        assert_eq!(ids(&modules), ["curseforge:1:10", "curseforge:2:20"]);
        assert!(!modules[1].required());
        assert_eq!(modules[1].default_enabled(), Some(false));
    }

    #[tokio::test]
    async fn missing_optional_dependency_is_skipped_and_recorded() {
        let api = FakeCurseForge::default().with_file((1, 10), &[(9, 90, false)]);
        let fixture = Fixture::new();

        let resolution = fixture
            .resolver(&api)
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap();
        assert!(resolution.root.dependencies.is_empty());
        assert_eq!(resolution.skipped.len(), 1);
        assert!(matches!(resolution.skipped[0].error, DistroError::NotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_file_fails_without_retrying() {
        let api = FakeCurseForge::default();
        let fixture = Fixture::new();

        let err = fixture
            .resolver(&api)
            .resolve(5, 50, Presence::Required, &mut Visited::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DistroError::NotFound { project_id: 5, file_id: 50 }));
        assert_eq!(api.info_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let api = FakeCurseForge::default().with_file((1, 10), &[]).flaky((1, 10), 2);
        let fixture = Fixture::new();

        fixture
            .resolver(&api)
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap();
        assert_eq!(api.info_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn intact_cached_file_is_not_downloaded_again() {
        let api = FakeCurseForge::default().with_file((1, 10), &[]);
        let fixture = Fixture::new();
        let resolver = fixture.resolver(&api);

        resolver
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap();
        resolver
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap();
        assert_eq!(api.downloads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn optional_file_required_later_is_expanded() {
        let api = FakeCurseForge::default()
            .with_file((1, 10), &[(2, 20, false), (3, 30, true)])
            .with_file((3, 30), &[(2, 20, true)])
            .with_file((2, 20), &[(4, 40, true)])
            .with_file((4, 40), &[]);
        let fixture = Fixture::new();

        let resolution = fixture
            .resolver(&api)
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap();
        assert!(resolution.skipped.is_empty());
        let modules = resolution.root.into_modules(ModuleKind::ForgeHostedMod);

        assert_eq!(
            ids(&modules),
            ["curseforge:1:10", "curseforge:2:20", "curseforge:3:30", "curseforge:4:40"]
        );
        assert!(modules.iter().all(|m| m.required()), "{modules:?}");
    }

    #[tokio::test]
    async fn project_only_dependencies_use_the_latest_file() {
        let api = FakeCurseForge::default()
            .with_file((1, 10), &[(2, 0, true)])
            .with_file((2, 25), &[])
            .with_latest(2, 25);
        let fixture = Fixture::new();

        let resolution = fixture
            .resolver(&api)
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap();
        let modules = resolution.root.into_modules(ModuleKind::GenericMod);
        assert_eq!(ids(&modules), ["curseforge:1:10", "curseforge:2:25"]);
    }

    #[tokio::test]
    async fn optional_project_without_a_fitting_file_is_skipped() {
        let api = FakeCurseForge::default().with_file((1, 10), &[(7, 0, false)]);
        let fixture = Fixture::new();

        let resolution = fixture
            .resolver(&api)
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap();
        assert!(resolution.root.dependencies.is_empty());
        assert_eq!(resolution.skipped.len(), 1);
        assert_eq!(resolution.skipped[0].module_id(), "curseforge:7");
        assert_eq!(resolution.skipped[0].parent, (1, 10));
    }

    #[tokio::test]
    async fn required_project_without_a_fitting_file_fails_the_request() {
        let api = FakeCurseForge::default().with_file((1, 10), &[(7, 0, true)]);
        let fixture = Fixture::new();

        let err = fixture
            .resolver(&api)
            .resolve(1, 10, Presence::Required, &mut Visited::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DistroError::NotFound { project_id: 7, file_id: 0 }));
    }

    #[test]
    fn duplicates_keep_first_position_and_strongest_presence() {
        let artifact = Artifact {
            path: "x".into(),
            hash: "00".into(),
            size: 0,
            url: "https://cdn.example.com/x".into(),
            mtime: None,
        };
        let leaf = |id: &str, presence| {
            Module::leaf(id, ModuleKind::GenericMod, artifact.clone()).with_presence(presence)
        };
        let merged = merge_duplicates(vec![
            leaf("a", Presence::OptionalOff),
            leaf("b", Presence::Required),
            leaf("a", Presence::OptionalOn),
            leaf("a", Presence::Required),
            leaf("b", Presence::OptionalOff),
        ]);
        assert_eq!(ids(&merged), ["a", "b"]);
        assert_eq!(merged[0].presence(), Presence::Required);
        assert_eq!(merged[1].presence(), Presence::Required);
    }

    #[test]
    fn remote_file_names_must_be_plain() {
        assert!(check_file_name("jei.jar").is_ok());
        for bad in ["", "..", "../evil.jar", "a/b.jar", "a\\b.jar"] {
            assert!(check_file_name(bad).is_err(), "{bad}");
        }
    }
}
