use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::key::FileKey;
use super::traits::{BoxReader, FileStore};

/// Filesystem-backed file store.
///
/// Files are stored in a sharded directory layout:
/// `{base_path}/{first 2 hex chars of the key}/{rest of the key}`
pub struct FilesystemFileStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemFileStore {
    /// Create a new filesystem file store rooted at `base_path`.
    ///
    /// `max_size` is a hard per-file ceiling; callers may enforce stricter
    /// per-type limits before ever reaching the store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Compute the filesystem path for a given key.
    fn file_path(&self, key: &FileKey) -> PathBuf {
        self.base_path
            .join(key.shard_prefix())
            .join(key.shard_filename())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl FileStore for FilesystemFileStore {
    async fn put(&self, data: &[u8], extension: &str) -> Result<FileKey, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let key = FileKey::generate(extension)?;
        let file_path = self.file_path(&key);

        // Write to a temp file first so a partially written upload is never
        // visible under its final key.
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &file_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(key)
    }

    async fn get_stream(&self, key: &FileKey) -> Result<BoxReader, StorageError> {
        let file_path = self.file_path(key);
        match fs::File::open(&file_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &FileKey) -> Result<bool, StorageError> {
        let file_path = self.file_path(key);
        Ok(fs::try_exists(&file_path).await?)
    }

    async fn delete(&self, key: &FileKey) -> Result<bool, StorageError> {
        let file_path = self.file_path(key);
        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, key: &FileKey) -> Result<u64, StorageError> {
        let file_path = self.file_path(key);
        match fs::metadata(&file_path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
