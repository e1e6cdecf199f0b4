use std::collections::HashMap;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use futures_util::stream::{self, StreamExt};
use sha1::{Digest, Sha1};
use tracing::debug;

use super::{artifact_url, Artifact};
use crate::core::error::{DistroError, DistroResult};

const READ_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
struct CachedHash {
    size: u64,
    mtime: u64,
    hash: String,
}

/// Hashes recorded by a previous manifest, keyed by relative path.
///
/// An entry is only reused when both the size and the modification marker
/// still match the file on disk.
#[derive(Debug, Clone, Default)]
pub struct HashCache {
    entries: HashMap<String, CachedHash>,
}

impl HashCache {
    pub fn from_artifacts<'a>(artifacts: impl IntoIterator<Item = &'a Artifact>) -> Self {
        let entries = artifacts
            .into_iter()
            .filter_map(|a| {
                let mtime = a.mtime?;
                Some((
                    a.path.clone(),
                    CachedHash {
                        size: a.size,
                        mtime,
                        hash: a.hash.clone(),
                    },
                ))
            })
            .collect();
        Self { entries }
    }

    fn lookup(&self, path: &str, size: u64, mtime: Option<u64>) -> Option<&str> {
        let entry = self.entries.get(path)?;
        (entry.size == size && Some(entry.mtime) == mtime).then_some(entry.hash.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns files under the distribution root into [`Artifact`] records.
///
/// This is the only place that reads raw file content.
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    root: PathBuf,
    base_url: String,
    cache: HashCache,
}

impl ArtifactResolver {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>, cache: HashCache) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
            cache,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `/`-separated path of `path` relative to the root.
    pub fn relative_path(&self, path: &Path) -> DistroResult<String> {
        let rel = path.strip_prefix(&self.root).map_err(|_| {
            DistroError::Other(format!(
                "{:?} is outside the distribution root {:?}",
                path, self.root
            ))
        })?;

        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => {
                    return Err(DistroError::Other(format!(
                        "Unsupported path component in {:?}",
                        rel
                    )))
                }
            }
        }
        Ok(parts.join("/"))
    }

    pub async fn resolve(&self, path: &Path) -> DistroResult<Artifact> {
        let relative = self.relative_path(path)?;

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| DistroError::io(path, e))?;
        if !metadata.is_file() {
            return Err(DistroError::Other(format!("{:?} is not a regular file", path)));
        }

        let size = metadata.len();
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64);

        let hash = match self.cache.lookup(&relative, size, mtime) {
            Some(hash) => {
                debug!("Reusing cached hash for {}", relative);
                hash.to_string()
            }
            None => sha1_file(path).await?,
        };

        Ok(Artifact {
            url: artifact_url(&self.base_url, &relative)?,
            path: relative,
            hash,
            size,
            mtime,
        })
    }

    /// Resolve many files with at most `concurrency` in flight.
    ///
    /// Results come back in input order regardless of completion order.
    pub async fn resolve_many(
        &self,
        paths: Vec<PathBuf>,
        concurrency: usize,
    ) -> Vec<(PathBuf, DistroResult<Artifact>)> {
        stream::iter(paths)
            .map(|path| async move {
                let result = self.resolve(&path).await;
                (path, result)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

/// Hex SHA-1 of a file, computed on the blocking pool.
pub async fn sha1_file(path: &Path) -> DistroResult<String> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut file = std::fs::File::open(&owned).map_err(|e| DistroError::io(&owned, e))?;
        let mut hasher = Sha1::new();
        let mut buffer = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let n = file
                .read(&mut buffer)
                .map_err(|e| DistroError::io(&owned, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(hex::encode(hasher.finalize()))
    })
    .await
    .map_err(|e| DistroError::Other(format!("Hashing task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const BASE: &str = "https://cdn.example.com/";

    fn write(dir: &TempDir, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn resolves_size_hash_and_url() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "servers/a/files/hello.txt", b"hello world");
        let resolver = ArtifactResolver::new(dir.path(), BASE, HashCache::default());

        let artifact = resolver.resolve(&path).await.unwrap();
        assert_eq!(artifact.path, "servers/a/files/hello.txt");
        assert_eq!(artifact.size, 11);
        assert_eq!(artifact.hash, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
        assert_eq!(artifact.url, "https://cdn.example.com/servers/a/files/hello.txt");
        assert!(artifact.mtime.is_some());
    }

    #[tokio::test]
    async fn one_byte_change_changes_only_that_hash() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.bin", b"aaaa");
        let b = write(&dir, "b.bin", b"bbbb");
        let resolver = ArtifactResolver::new(dir.path(), BASE, HashCache::default());

        let before_a = resolver.resolve(&a).await.unwrap();
        let before_b = resolver.resolve(&b).await.unwrap();
        std::fs::write(&a, b"aaab").unwrap();
        let after_a = resolver.resolve(&a).await.unwrap();
        let after_b = resolver.resolve(&b).await.unwrap();

        assert_ne!(before_a.hash, after_a.hash);
        assert_eq!(before_b.hash, after_b.hash);
    }

    #[tokio::test]
    async fn cache_hit_reuses_recorded_hash() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mod.jar", b"payload");
        let fresh = ArtifactResolver::new(dir.path(), BASE, HashCache::default())
            .resolve(&path)
            .await
            .unwrap();

        // A cached entry with a matching marker wins over the file content.
        let mut recorded = fresh.clone();
        recorded.hash = "cached".into();
        let cache = HashCache::from_artifacts([&recorded]);
        let cached = ArtifactResolver::new(dir.path(), BASE, cache)
            .resolve(&path)
            .await
            .unwrap();
        assert_eq!(cached.hash, "cached");

        // A size mismatch forces a re-hash.
        recorded.size += 1;
        let cache = HashCache::from_artifacts([&recorded]);
        let rehashed = ArtifactResolver::new(dir.path(), BASE, cache)
            .resolve(&path)
            .await
            .unwrap();
        assert_eq!(rehashed.hash, fresh.hash);
    }

    #[tokio::test]
    async fn vanished_file_is_file_not_found() {
        let dir = TempDir::new().unwrap();
        let resolver = ArtifactResolver::new(dir.path(), BASE, HashCache::default());
        let err = resolver
            .resolve(&dir.path().join("gone.jar"))
            .await
            .unwrap_err();
        assert!(matches!(err, DistroError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn resolve_many_keeps_input_order() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..10)
            .map(|i| write(&dir, &format!("f{i}.bin"), &vec![i as u8; 1000 * (10 - i)]))
            .collect();
        let resolver = ArtifactResolver::new(dir.path(), BASE, HashCache::default());

        let results = resolver.resolve_many(paths.clone(), 4).await;
        let order: Vec<PathBuf> = results.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(order, paths);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }
}
