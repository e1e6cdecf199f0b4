use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::api::{CurseForgeApi, ModTarget, RemoteDependency, RemoteFile};
use crate::core::config::RetryPolicy;
use crate::core::downloader::Downloader;
use crate::core::error::{DistroError, DistroResult};
use crate::core::http::check_status;
use crate::core::loaders::LoaderKind;

pub const CURSEFORGE_API_BASE: &str = "https://api.curseforge.com";
const EDGE_CDN: &str = "https://edge.forgecdn.net/files";

const RELATION_OPTIONAL: u8 = 2;
const RELATION_REQUIRED: u8 = 3;
const HASH_ALGO_SHA1: u8 = 1;

#[derive(Deserialize)]
struct CFFileResponse {
    data: CFFile,
}

#[derive(Deserialize)]
struct CFFilesResponse {
    data: Vec<CFFile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CFFile {
    id: u32,
    mod_id: u32,
    file_name: String,
    file_length: u64,
    download_url: Option<String>,
    #[serde(default)]
    hashes: Vec<CFHash>,
    #[serde(default)]
    dependencies: Vec<CFDependency>,
}

#[derive(Deserialize)]
struct CFHash {
    value: String,
    algo: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CFDependency {
    mod_id: u32,
    relation_type: u8,
}

/// CurseForge REST client (`/v1`).
///
/// Dependencies are declared by project only, so the client picks the newest
/// file of the dependency that matches the server's game version and loader.
pub struct CurseForgeClient {
    client: Client,
    base: String,
    downloader: Downloader,
}

impl CurseForgeClient {
    pub fn new(api_key: &str, retry: RetryPolicy) -> DistroResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|_| {
                DistroError::InvalidConfiguration("CurseForge API key is not a valid header".into())
            })?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(concat!("helios-distro/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(retry.timeout)
            .build()?;
        let download_client = crate::core::http::build_http_client(&retry)?;

        Ok(Self {
            client,
            base: CURSEFORGE_API_BASE.to_string(),
            downloader: Downloader::new(download_client, retry),
        })
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_file(&self, project_id: u32, file_id: u32) -> DistroResult<CFFile> {
        let url = format!("{}/v1/mods/{}/files/{}", self.base, project_id, file_id);
        let response = self.client.get(&url).send().await?;
        if is_missing(response.status()) {
            return Err(DistroError::NotFound {
                project_id,
                file_id,
            });
        }
        Ok(check_status(response)?.json::<CFFileResponse>().await?.data)
    }

    /// Newest file of `project_id` for the target, used for dependencies.
    async fn latest_file_id(&self, project_id: u32, target: &ModTarget) -> DistroResult<u32> {
        let mut url = format!(
            "{}/v1/mods/{}/files?gameVersion={}&pageSize=1",
            self.base,
            project_id,
            target.game_version.canonical()
        );
        if let Some(loader_type) = mod_loader_type(target.loader) {
            url.push_str(&format!("&modLoaderType={}", loader_type));
        }

        let response = self.client.get(&url).send().await?;
        if is_missing(response.status()) {
            return Err(DistroError::NotFound {
                project_id,
                file_id: 0,
            });
        }
        let files = check_status(response)?.json::<CFFilesResponse>().await?.data;
        files
            .first()
            .map(|f| f.id)
            .ok_or(DistroError::NotFound {
                project_id,
                file_id: 0,
            })
    }
}

#[async_trait]
impl CurseForgeApi for CurseForgeClient {
    async fn file_info(
        &self,
        project_id: u32,
        file_id: u32,
        _target: &ModTarget,
    ) -> DistroResult<RemoteFile> {
        let file = self.get_file(project_id, file_id).await?;

        let dependencies = remote_dependencies(&file.dependencies);

        let download_url = file
            .download_url
            .clone()
            .unwrap_or_else(|| edge_cdn_url(file.id, &file.file_name));
        let sha1 = file
            .hashes
            .iter()
            .find(|h| h.algo == HASH_ALGO_SHA1)
            .map(|h| h.value.to_lowercase());

        debug!(
            "CurseForge {}/{} -> {} ({} deps)",
            project_id,
            file_id,
            file.file_name,
            dependencies.len()
        );

        Ok(RemoteFile {
            project_id: file.mod_id,
            file_id: file.id,
            file_name: file.file_name,
            size: file.file_length,
            download_url,
            sha1,
            dependencies,
        })
    }

    async fn latest_file(&self, project_id: u32, target: &ModTarget) -> DistroResult<u32> {
        self.latest_file_id(project_id, target).await
    }

    async fn download(&self, file: &RemoteFile, dest: &Path) -> DistroResult<()> {
        self.downloader
            .download_file(&file.download_url, dest, file.sha1.as_deref())
            .await
    }
}

/// Dependencies only name a project; the file is picked later, per target.
/// Relations other than required and optional are ignored.
fn remote_dependencies(dependencies: &[CFDependency]) -> Vec<RemoteDependency> {
    dependencies
        .iter()
        .filter_map(|dep| {
            let required = match dep.relation_type {
                RELATION_REQUIRED => true,
                RELATION_OPTIONAL => false,
                _ => return None,
            };
            Some(RemoteDependency {
                project_id: dep.mod_id,
                file_id: None,
                required,
            })
        })
        .collect()
}

fn is_missing(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST
}

fn mod_loader_type(loader: LoaderKind) -> Option<u8> {
    match loader {
        LoaderKind::None => None,
        LoaderKind::Forge => Some(1),
        LoaderKind::Fabric => Some(4),
    }
}

/// Files with third-party distribution disabled have no `downloadUrl`;
/// the CDN path is derived from the file id.
fn edge_cdn_url(file_id: u32, file_name: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        EDGE_CDN,
        file_id / 1000,
        file_id % 1000,
        file_name.replace(' ', "%20")
    )
}
