//! Staging of standard input into a seekable temporary file.
//!
//! The central directory sits at the end of a ZIP archive, so a pipe has to
//! be drained to disk before anything can be listed.

use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Fatal, RemoveTemp};

/// Number of random bytes hex-encoded into the staging file name.
const SEED_LEN: usize = 32;

const COPY_BUF_SIZE: usize = 64 * 1024;

/// A temporary copy of the input archive.
///
/// The file is deleted when this value is dropped, whichever way the caller
/// returns. [`StagedArchive::close`] deletes it eagerly and reports failures.
pub struct StagedArchive {
    file: NamedTempFile,
    len: u64,
}

impl StagedArchive {
    /// Drain `input` to EOF into a freshly created temporary file in `dir`.
    ///
    /// On error the partially written file is already removed.
    pub async fn from_reader<R: AsyncRead + Unpin>(
        dir: &Path,
        input: &mut R,
    ) -> Result<Self, Fatal> {
        let file = create_temp(dir).map_err(Fatal::CreateTemp)?;
        let mut dest = tokio::fs::File::from_std(file.as_file().try_clone().map_err(Fatal::CreateTemp)?);

        let len = drain(input, &mut dest).await?;

        debug!("staged {} bytes in {}", len, file.path().display());
        Ok(Self { file, len })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of bytes staged.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Delete the staging file now.
    pub fn close(self) -> Result<(), RemoveTemp> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .map_err(|source| RemoveTemp { path, source })
    }
}

/// Copy `input` to EOF into `dest`, returning the number of bytes copied.
async fn drain<R, W>(input: &mut R, dest: &mut W) -> Result<u64, Fatal>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut len = 0u64;
    loop {
        let n = input.read(&mut buf).await.map_err(Fatal::ReadStdin)?;
        if n == 0 {
            break;
        }
        dest.write_all(&buf[..n]).await.map_err(Fatal::WriteTemp)?;
        len += n as u64;
    }
    dest.flush().await.map_err(Fatal::WriteTemp)?;
    Ok(len)
}

fn create_temp(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut seed = [0u8; SEED_LEN];
    getrandom::fill(&mut seed).map_err(|e| std::io::Error::other(e.to_string()))?;
    tempfile::Builder::new()
        .prefix(&format!("{}-", hex::encode(seed)))
        .tempfile_in(dir)
}
