use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

/// Where extracted entries are materialized.
#[async_trait]
pub trait Sink: Send + Sync {
    type File: AsyncWrite + Unpin + Send;

    /// Create `path` and any missing parents. An existing directory is fine.
    async fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Open `path` for writing, creating it or truncating what is there.
    async fn create_file(&self, path: &Path, mode: u32) -> io::Result<Self::File>;
}

/// The real filesystem. Mode bits are applied on Unix only.
pub struct DiskSink;

#[async_trait]
impl Sink for DiskSink {
    type File = tokio::fs::File;

    async fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(mode);
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(path).await
    }

    async fn create_file(&self, path: &Path, mode: u32) -> io::Result<Self::File> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(mode);
        #[cfg(not(unix))]
        let _ = mode;
        options.open(path).await
    }
}
