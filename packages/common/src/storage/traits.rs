use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::key::FileKey;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Opaque-keyed file storage for competition entry uploads.
///
/// Callers hold only the returned [`FileKey`]; the store decides layout.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store bytes under a freshly generated key and return it.
    async fn put(&self, data: &[u8], extension: &str) -> Result<FileKey, StorageError>;

    /// Retrieve a stored file as a streaming async reader.
    async fn get_stream(&self, key: &FileKey) -> Result<BoxReader, StorageError>;

    /// Retrieve all bytes of a stored file.
    async fn get(&self, key: &FileKey) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(key).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Check whether a file exists.
    async fn exists(&self, key: &FileKey) -> Result<bool, StorageError>;

    /// Delete a file by its key.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, key: &FileKey) -> Result<bool, StorageError>;

    /// Get the size of a stored file in bytes.
    async fn size(&self, key: &FileKey) -> Result<u64, StorageError>;
}
