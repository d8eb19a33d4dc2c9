use crate::types::Result;
use async_trait::async_trait;
use std::path::Path;

/// Destination for backed up objects. `key` is the object name relative to
/// the bucket root.
#[async_trait]
pub trait FileStorage: Sync + Send {
    /// Streams the file at `path` into the object `key`.
    async fn upload_file(&self, path: &Path, key: &str) -> Result<()>;

    async fn upload_buffer(&self, bytes: &[u8], key: &str) -> Result<()>;
}
