use std::fmt;

use super::error::StorageError;

/// Maximum extension length accepted in a key.
const MAX_EXTENSION_LEN: usize = 16;

/// An opaque, URL-safe reference to a stored file.
///
/// Keys have the form `{32 lowercase hex chars}.{extension}`. The stem is
/// random (not content-derived), so no two uploads ever share a key and
/// deleting one submission's file can never affect another's.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    stem: String,
    extension: String,
}

impl FileKey {
    /// Generate a fresh key for a file with the given extension.
    pub fn generate(extension: &str) -> Result<Self, StorageError> {
        let extension = validate_extension(extension)?;
        Ok(Self {
            stem: uuid::Uuid::new_v4().simple().to_string(),
            extension: extension.to_string(),
        })
    }

    /// Parse a key previously produced by [`FileKey::generate`].
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        let (stem, extension) = s
            .split_once('.')
            .ok_or_else(|| StorageError::InvalidKey(format!("missing extension in '{s}'")))?;

        if stem.len() != 32 || !stem.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()) {
            return Err(StorageError::InvalidKey(format!(
                "expected 32 lowercase hex characters before the extension, got '{stem}'"
            )));
        }
        let extension = validate_extension(extension)?;

        Ok(Self {
            stem: stem.to_string(),
            extension: extension.to_string(),
        })
    }

    /// First 2 hex characters (shard directory for filesystem layout).
    pub fn shard_prefix(&self) -> &str {
        &self.stem[..2]
    }

    /// Filename within the shard directory.
    pub fn shard_filename(&self) -> String {
        format!("{}.{}", &self.stem[2..], self.extension)
    }

    /// The file extension, lowercase, without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }
}

fn validate_extension(extension: &str) -> Result<&str, StorageError> {
    if extension.is_empty() || extension.len() > MAX_EXTENSION_LEN {
        return Err(StorageError::InvalidKey(format!(
            "extension must be 1-{MAX_EXTENSION_LEN} characters"
        )));
    }
    if !extension
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(StorageError::InvalidKey(
            "extension must be lowercase alphanumeric".into(),
        ));
    }
    Ok(extension)
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.stem, self.extension)
    }
}

impl fmt::Debug for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileKey({self})")
    }
}
