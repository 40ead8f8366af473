//! # Local Media Store
//!
//! A flat directory of retrieved assets keyed by base name, backed by the
//! [`FileSystemAccess`] bridge.
//!
//! Writes land in a hidden `.<name>.part` sibling and are renamed into place
//! only after the whole stream was copied and flushed, so the directory never
//! exposes a partially written asset under its real name. Concurrent writers
//! of the same name race; the last rename wins.

use crate::error::{Result, SyncError};
use bridge_traits::storage::FileSystemAccess;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};

/// A completed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Clone)]
pub struct MediaStore {
    fs: Arc<dyn FileSystemAccess>,
    root: PathBuf,
}

impl MediaStore {
    pub fn new(fs: Arc<dyn FileSystemAccess>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reduce `name` to its final component.
    ///
    /// Both `/` and `\` separate components. Names that reduce to nothing
    /// usable (`""`, `"."`, `".."`, `"dir/"`) are rejected.
    pub fn sanitize(name: &str) -> Result<&str> {
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        match base {
            "" | "." | ".." => Err(SyncError::InvalidAssetName(name.to_string())),
            base => Ok(base),
        }
    }

    /// Absolute location of `name` in the store.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        Ok(self.root.join(Self::sanitize(name)?))
    }

    /// Create the store directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<()> {
        self.fs.create_dir_all(&self.root).await.map_err(io_error)
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        self.fs.exists(&path).await.map_err(io_error)
    }

    /// Copy `reader` into the store under `name`.
    ///
    /// # Errors
    ///
    /// [`SyncError::InvalidAssetName`] for unusable names, [`SyncError::Io`]
    /// for any read or filesystem failure. On error nothing is left behind.
    pub async fn write(
        &self,
        name: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<StoredAsset> {
        let base = Self::sanitize(name)?;
        self.ensure_root().await?;

        let final_path = self.root.join(base);
        let part_path = self.root.join(format!(".{}.part", base));

        match self.copy_to(&part_path, reader).await {
            Ok(bytes) => {
                if let Err(e) = self.fs.rename(&part_path, &final_path).await {
                    self.discard(&part_path).await;
                    return Err(io_error(e));
                }
                debug!(asset = base, bytes, "Stored asset");
                Ok(StoredAsset {
                    path: final_path,
                    bytes,
                })
            }
            Err(e) => {
                self.discard(&part_path).await;
                Err(e)
            }
        }
    }

    async fn copy_to(
        &self,
        part_path: &Path,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64> {
        let mut writer = self
            .fs
            .open_write_stream(part_path)
            .await
            .map_err(io_error)?;
        let bytes = tokio::io::copy(reader, &mut writer).await?;
        writer.flush().await?;
        writer.shutdown().await?;
        Ok(bytes)
    }

    async fn discard(&self, part_path: &Path) {
        if let Err(e) = self.fs.delete_file(part_path).await {
            warn!(path = ?part_path, error = %e, "Failed to remove partial asset");
        }
    }

    /// Open a stored asset for reading.
    pub async fn read(&self, name: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        let path = self.path_for(name)?;
        self.fs.open_read_stream(&path).await.map_err(io_error)
    }

    /// Number of stored assets. Hidden entries (including in-flight
    /// `.part` files) are not counted; a missing directory counts as empty.
    pub async fn count_entries(&self) -> Result<usize> {
        if !self.fs.exists(&self.root).await.map_err(io_error)? {
            return Ok(0);
        }

        let entries = self
            .fs
            .list_directory(&self.root)
            .await
            .map_err(io_error)?;
        Ok(entries
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .filter(|name| !name.starts_with('.'))
            .count())
    }
}

fn io_error(err: bridge_traits::BridgeError) -> SyncError {
    SyncError::Io(err.to_string())
}
