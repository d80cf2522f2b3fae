use super::ReadAt;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// Local file reader with random access support
pub struct LocalFileReader {
    file: std::fs::File,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("can't open {}", path.display()))?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file
                .read_exact_at(buf, offset)
                .with_context(|| format!("short read of {} bytes at offset {}", buf.len(), offset))?;
        }

        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;
            // seek_read may return short counts; keep going until the buffer is full
            let mut filled = 0;
            while filled < buf.len() {
                let n = self
                    .file
                    .seek_read(&mut buf[filled..], offset + filled as u64)?;
                if n == 0 {
                    anyhow::bail!(
                        "short read of {} bytes at offset {}",
                        buf.len(),
                        offset
                    );
                }
                filled += n;
            }
        }

        Ok(buf.len())
    }

    fn size(&self) -> u64 {
        self.size
    }
}
