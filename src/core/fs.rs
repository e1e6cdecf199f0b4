use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::core::error::{DistroError, DistroResult};

pub async fn create_dir_safe(path: &Path) -> DistroResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| DistroError::io(path, e))
}

/// Write `contents` to `path` unless something already exists there.
///
/// Returns `false` when the file was left untouched.
pub async fn write_if_absent(path: &Path, contents: &[u8]) -> DistroResult<bool> {
    if let Some(parent) = path.parent() {
        create_dir_safe(parent).await?;
    }
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(DistroError::io(path, e)),
    };
    file.write_all(contents)
        .await
        .map_err(|e| DistroError::io(path, e))?;
    file.flush().await.map_err(|e| DistroError::io(path, e))?;
    Ok(true)
}

/// Pretty JSON, two-space indent, trailing newline.
pub fn to_json_bytes<T: Serialize>(value: &T) -> DistroResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Replace `path` with `contents` through a sibling temp file and a rename,
/// so readers never observe a half-written file.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> DistroResult<()> {
    if let Some(parent) = path.parent() {
        create_dir_safe(parent).await?;
    }
    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| DistroError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| DistroError::io(path, e))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
