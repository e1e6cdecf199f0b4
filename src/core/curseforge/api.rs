use std::path::Path;

use async_trait::async_trait;

use crate::core::error::DistroResult;
use crate::core::loaders::LoaderKind;
use crate::core::version::VersionToken;

/// Game version and loader a server targets; used to pick files for
/// dependencies that only name a project.
#[derive(Debug, Clone)]
pub struct ModTarget {
    pub game_version: VersionToken,
    pub loader: LoaderKind,
}

/// A declared dependency of a remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDependency {
    pub project_id: u32,
    /// `None` when only the project is named; the file is then picked with
    /// [`CurseForgeApi::latest_file`].
    pub file_id: Option<u32>,
    pub required: bool,
}

/// Metadata of one remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub project_id: u32,
    pub file_id: u32,
    pub file_name: String,
    pub size: u64,
    pub download_url: String,
    pub sha1: Option<String>,
    pub dependencies: Vec<RemoteDependency>,
}

/// The outbound contract of the third-party mod repository.
///
/// Implementations report a missing or invalid id as
/// [`DistroError::NotFound`](crate::core::error::DistroError::NotFound) and
/// transport failures as retryable errors; retries are the caller's job.
#[async_trait]
pub trait CurseForgeApi: Send + Sync {
    async fn file_info(
        &self,
        project_id: u32,
        file_id: u32,
        target: &ModTarget,
    ) -> DistroResult<RemoteFile>;

    /// Newest file of `project_id` usable by `target`. A project without
    /// such a file is `NotFound` with file id 0.
    async fn latest_file(&self, project_id: u32, target: &ModTarget) -> DistroResult<u32>;

    async fn download(&self, file: &RemoteFile, dest: &Path) -> DistroResult<()>;
}
