use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::model::{BuildFailure, BuildReport, Distribution, DistroMeta, DISTRO_META_FILE};
use super::walk::{assemble, file_paths, plan_directory, Planned};
use crate::core::artifact::{ArtifactResolver, HashCache};
use crate::core::config::{BuildConfig, META_DIR};
use crate::core::curseforge::{
    merge_duplicates, CurseForgeApi, CurseForgeDeclaration, ModTarget, ResolvedDependency,
    ThirdPartyModResolver, Visited, CURSEFORGE_CACHE_DIR, CURSEFORGE_FILE,
};
use crate::core::downloader::Downloader;
use crate::core::error::{DistroError, DistroResult};
use crate::core::fs::{create_dir_safe, to_json_bytes, write_if_absent};
use crate::core::http::build_http_client;
use crate::core::loaders::{LoaderInstallerResolver, LoaderKind};
use crate::core::module::{Module, ModuleKind, Presence};
use crate::core::server::{
    mods_dir_name, Server, ServerMeta, FILES_DIR, LIBRARIES_DIR, SERVER_META_FILE,
};

/// Walks `<root>/servers/` and turns it into a [`Distribution`].
///
/// The build is a function of the files under the root, the previous
/// manifest (a hash cache only) and the [`BuildConfig`]. Servers are built
/// concurrently but collected in id order, and files are visited in name
/// order, so an unchanged root always yields the same manifest bytes.
///
/// Nothing short of an unreadable `servers/` directory aborts a build. A
/// server or module that cannot be built is left out and recorded in the
/// [`BuildReport`].
pub struct DistributionStructureBuilder {
    config: BuildConfig,
    previous: Option<Distribution>,
    curseforge: Option<Arc<dyn CurseForgeApi>>,
    downloader: Option<Downloader>,
}

impl DistributionStructureBuilder {
    pub fn new(config: BuildConfig) -> DistroResult<Self> {
        let downloader = if config.fetch_loader_files {
            let client = build_http_client(&config.retry)?;
            Some(Downloader::new(client, config.retry.clone()).with_concurrency(config.concurrency))
        } else {
            None
        };
        Ok(Self {
            config,
            previous: None,
            curseforge: None,
            downloader,
        })
    }

    /// Reuse hashes from a previous manifest for files that did not change.
    pub fn with_previous(mut self, previous: Option<Distribution>) -> Self {
        self.previous = previous;
        self
    }

    pub fn with_curseforge(mut self, api: Arc<dyn CurseForgeApi>) -> Self {
        self.curseforge = Some(api);
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Scaffold an empty root. Existing files are never overwritten.
    pub async fn init(&self) -> DistroResult<()> {
        let root = &self.config.root;
        create_dir_safe(&self.config.servers_dir()).await?;

        let meta_path = root.join(META_DIR).join(DISTRO_META_FILE);
        if write_if_absent(&meta_path, &to_json_bytes(&DistroMeta::default())?).await? {
            info!("Created {}", meta_path.display());
        }

        let manifest = self.config.manifest_path();
        if write_if_absent(&manifest, &to_json_bytes(&Distribution::default())?).await? {
            info!("Created {}", manifest.display());
        } else {
            debug!("{} already exists", manifest.display());
        }
        Ok(())
    }

    /// Build the manifest model from disk without writing it.
    pub async fn get_spec_model(&self) -> DistroResult<BuildReport> {
        let cache = self
            .previous
            .as_ref()
            .map(|p| HashCache::from_artifacts(p.artifacts()))
            .unwrap_or_default();
        if !cache.is_empty() {
            debug!("Hash cache holds {} artifact(s)", cache.len());
        }
        let artifacts =
            ArtifactResolver::new(&self.config.root, self.config.base_url.clone(), cache);

        let mut failures = Vec::new();
        let meta_path = self.config.root.join(META_DIR).join(DISTRO_META_FILE);
        let meta = match DistroMeta::load(&meta_path).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Ignoring distribution metadata: {}", e);
                failures.push(BuildFailure::distribution(
                    format!("{}/{}", META_DIR, DISTRO_META_FILE),
                    &e,
                ));
                DistroMeta::default()
            }
        };
        let mut distribution = Distribution {
            rss: meta.meta.rss,
            discord: meta.meta.discord,
            ..Distribution::default()
        };

        let artifacts = &artifacts;
        let built: Vec<_> = stream::iter(self.server_dirs().await?)
            .map(|(id, dir)| async move {
                let mut server_failures = Vec::new();
                let result = self
                    .build_server(&id, &dir, artifacts, &mut server_failures)
                    .await;
                (id, result, server_failures)
            })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        for (id, result, server_failures) in built {
            failures.extend(server_failures);
            match result {
                Ok(server) => distribution.servers.push(server),
                Err(e) => {
                    warn!("Server '{}' left out of the manifest: {}", id, e);
                    failures.push(BuildFailure::new(&id, SERVER_META_FILE, &e));
                }
            }
        }

        reconcile_main_server(&mut distribution.servers, &mut failures);

        info!(
            "Built {} server(s) with {} failure(s)",
            distribution.servers.len(),
            failures.len()
        );
        Ok(BuildReport {
            distribution,
            failures,
        })
    }

    /// Build and write `distribution.json`. The file is replaced atomically
    /// and contains every server that could be built.
    pub async fn generate(&self) -> DistroResult<BuildReport> {
        let report = self.get_spec_model().await?;
        let path = self.config.manifest_path();
        report.distribution.write(&path).await?;
        info!("Wrote {}", path.display());
        Ok(report)
    }

    /// Server directories, sorted by id.
    async fn server_dirs(&self) -> DistroResult<Vec<(String, std::path::PathBuf)>> {
        let servers_dir = self.config.servers_dir();
        let mut reader = match tokio::fs::read_dir(&servers_dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DistroError::io(&servers_dir, e)),
        };

        let mut dirs = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| DistroError::io(&servers_dir, e))?
        {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(id) if !id.starts_with('.') => dirs.push((id, path)),
                Ok(_) => {}
                Err(name) => warn!("Skipping server directory with non UTF-8 name {:?}", name),
            }
        }
        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(dirs)
    }

    /// Modules are ordered: loader, mods (required, optional-on,
    /// optional-off), libraries, files, then third-party mods.
    async fn build_server(
        &self,
        id: &str,
        dir: &Path,
        artifacts: &ArtifactResolver,
        failures: &mut Vec<BuildFailure>,
    ) -> DistroResult<Server> {
        let meta = ServerMeta::load(dir).await?;
        let mut server = Server::from_meta(id, &meta)?;
        debug!("Building server '{}' ({} {})", id, server.version, server.loader_kind());

        let mut modules = Vec::new();

        if let Some(loader) = self.loader_module(&server, dir, artifacts).await {
            match loader {
                Ok(module) => modules.push(module),
                Err(e) => failures.push(BuildFailure::new(id, "loader", &e)),
            }
        }

        let mut plan = Vec::new();
        if let Some(mods_dir) = mods_dir_name(server.loader_kind()) {
            let kind = match server.loader_kind() {
                LoaderKind::Forge => ModuleKind::ForgeHostedMod,
                _ => ModuleKind::GenericMod,
            };
            for presence in Presence::ALL {
                let sub = dir.join(mods_dir).join(presence.dir_name());
                plan.extend(self.plan(id, &sub, kind, presence, false, failures).await);
            }
        }
        let libraries = dir.join(LIBRARIES_DIR);
        plan.extend(
            self.plan(id, &libraries, ModuleKind::Library, Presence::Required, false, failures)
                .await,
        );
        let files = dir.join(FILES_DIR);
        plan.extend(
            self.plan(id, &files, ModuleKind::GenericFile, Presence::Required, true, failures)
                .await,
        );

        modules.extend(self.hash_plan(id, plan, artifacts, failures).await);
        modules.extend(self.third_party_modules(&server, dir, artifacts, failures).await);

        server.modules = dedup_modules(id, modules, failures);
        Ok(server)
    }

    async fn plan(
        &self,
        server_id: &str,
        dir: &Path,
        kind: ModuleKind,
        presence: Presence,
        groups: bool,
        failures: &mut Vec<BuildFailure>,
    ) -> Vec<Planned> {
        match plan_directory(dir, kind, presence, groups).await {
            Ok(plan) => plan,
            Err(e) => {
                failures.push(BuildFailure::new(server_id, dir.display().to_string(), &e));
                Vec::new()
            }
        }
    }

    async fn hash_plan(
        &self,
        server_id: &str,
        plan: Vec<Planned>,
        artifacts: &ArtifactResolver,
        failures: &mut Vec<BuildFailure>,
    ) -> Vec<Module> {
        let mut paths = Vec::new();
        file_paths(&plan, &mut paths);
        let mut hashed: HashMap<_, _> = artifacts
            .resolve_many(paths, self.config.concurrency)
            .await
            .into_iter()
            .collect();

        assemble(plan, &mut hashed, &mut |path: &Path, e: DistroError| {
            let location = artifacts
                .relative_path(path)
                .unwrap_or_else(|_| path.display().to_string());
            warn!("Skipping {}: {}", location, e);
            failures.push(BuildFailure::new(server_id, location, &e));
        })
    }

    /// `None` for servers without a loader.
    async fn loader_module(
        &self,
        server: &Server,
        dir: &Path,
        artifacts: &ArtifactResolver,
    ) -> Option<DistroResult<Module>> {
        let selection = server.loader.as_ref()?;
        let resolver = LoaderInstallerResolver::new(&self.config.loader_table);
        let result = async {
            let Some(layout) = resolver.resolve(selection.kind, &server.version, &selection.version)?
            else {
                return Err(DistroError::InvalidConfiguration(format!(
                    "loader {} has no installer",
                    selection.kind
                )));
            };
            if let Some(downloader) = &self.downloader {
                let fetched = layout.fetch_missing(dir, downloader).await?;
                if fetched > 0 {
                    info!("Fetched {} loader file(s) for '{}'", fetched, server.id);
                }
            }
            layout.materialize(dir, artifacts).await
        }
        .await;
        Some(result)
    }

    async fn third_party_modules(
        &self,
        server: &Server,
        dir: &Path,
        artifacts: &ArtifactResolver,
        failures: &mut Vec<BuildFailure>,
    ) -> Vec<Module> {
        let declaration = match CurseForgeDeclaration::load(dir).await {
            Ok(declaration) => declaration,
            Err(e) => {
                failures.push(BuildFailure::new(&server.id, CURSEFORGE_FILE, &e));
                return Vec::new();
            }
        };
        if declaration.mods.is_empty() {
            return Vec::new();
        }
        let Some(api) = &self.curseforge else {
            failures.push(BuildFailure::new(
                &server.id,
                CURSEFORGE_FILE,
                &"CurseForge mods declared but no API key configured (CURSEFORGE_API_KEY)",
            ));
            return Vec::new();
        };

        let kind = match server.loader_kind() {
            LoaderKind::Forge => ModuleKind::ForgeHostedMod,
            _ => ModuleKind::GenericMod,
        };
        let resolver = ThirdPartyModResolver::new(
            api.as_ref(),
            artifacts,
            &self.config.retry,
            dir.join(CURSEFORGE_CACHE_DIR),
            ModTarget {
                game_version: server.version.clone(),
                loader: server.loader_kind(),
            },
        );

        // Each declared entry is an independent request with its own
        // visited set.
        let resolver = &resolver;
        let results: Vec<_> = stream::iter(declaration.mods.iter())
            .map(|entry| async move {
                let mut visited = Visited::new();
                let result = resolver
                    .resolve(entry.project_id, entry.file_id, entry.presence(), &mut visited)
                    .await;
                (entry, result)
            })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut modules = Vec::new();
        for (entry, result) in results {
            let location = ResolvedDependency::module_id(entry.project_id, entry.file_id);
            match result {
                Ok(resolution) => {
                    for skipped in resolution.skipped {
                        failures.push(BuildFailure::new(
                            &server.id,
                            skipped.module_id(),
                            &format!(
                                "optional dependency of {} skipped: {}",
                                ResolvedDependency::module_id(skipped.parent.0, skipped.parent.1),
                                skipped.error
                            ),
                        ));
                    }
                    modules.extend(resolution.root.into_modules(kind));
                }
                Err(e) => {
                    warn!("Skipping {} on '{}': {}", location, server.id, e);
                    failures.push(BuildFailure::new(&server.id, location, &e));
                }
            }
        }
        modules
    }
}

/// Keep the first module of each id. A third-party file pulled in by
/// several entries is merged into its first occurrence with the strongest
/// presence among them; any other duplicate is recorded.
fn dedup_modules(
    server_id: &str,
    modules: Vec<Module>,
    failures: &mut Vec<BuildFailure>,
) -> Vec<Module> {
    let mut seen = HashSet::new();
    let modules = modules
        .into_iter()
        .filter(|module| {
            if module.id().starts_with("curseforge:") || seen.insert(module.id().to_string()) {
                return true;
            }
            failures.push(BuildFailure::new(
                server_id,
                module.id(),
                &DistroError::DuplicateModule(module.id().to_string()),
            ));
            false
        })
        .collect();
    merge_duplicates(modules)
}

/// At most one server keeps `mainServer`: the first by id.
fn reconcile_main_server(servers: &mut [Server], failures: &mut Vec<BuildFailure>) {
    let mut main: Option<String> = None;
    for server in servers.iter_mut().filter(|s| s.main_server) {
        match &main {
            None => main = Some(server.id.clone()),
            Some(winner) => {
                server.main_server = false;
                failures.push(BuildFailure::new(
                    &server.id,
                    SERVER_META_FILE,
                    &format!("mainServer is already claimed by '{}'", winner),
                ));
            }
        }
    }
}
