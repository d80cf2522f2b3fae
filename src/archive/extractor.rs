use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Result, bail};

use super::parser::ZipParser;
use super::reader::EntryReader;
use super::structures::{CompressionMethod, ZipFileEntry};

/// Random-access view of a ZIP archive.
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all entries in the archive
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        self.parser.list_files().await
    }

    /// Open the decompressed contents of a file entry.
    ///
    /// Only the local header is read here; compressed bytes are fetched,
    /// decompressed and checksummed as the returned reader is consumed.
    pub async fn open(&self, entry: &ZipFileEntry) -> Result<EntryReader<R>> {
        if entry.is_encrypted() {
            bail!("encrypted entries are not supported");
        }
        if let CompressionMethod::Unknown(method) = entry.compression_method {
            bail!("unsupported compression method {}", method);
        }

        let data_offset = self.parser.get_data_offset(entry).await?;
        Ok(EntryReader::new(
            self.parser.reader().clone(),
            data_offset,
            entry,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryReader, ZipBuilder};

    fn extractor(bytes: Vec<u8>) -> ZipExtractor<MemoryReader> {
        ZipExtractor::new(Arc::new(MemoryReader::new(bytes)))
    }

    async fn read_to_end(reader: &mut EntryReader<MemoryReader>) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf).await? {
                0 => return Ok(out),
                n => out.extend_from_slice(&buf[..n]),
            }
        }
    }

    async fn read_entry(extractor: &ZipExtractor<MemoryReader>, entry: &ZipFileEntry) -> Vec<u8> {
        let mut reader = extractor.open(entry).await.unwrap();
        read_to_end(&mut reader).await.unwrap()
    }

    #[tokio::test]
    async fn reads_stored_and_deflated_entries() {
        let text = "All work and no play makes Jack a dull boy.\n".repeat(200);
        let extractor = extractor(
            ZipBuilder::new()
                .file("stored.txt", text.as_bytes())
                .deflated("deflated.txt", text.as_bytes())
                .finish(),
        );

        let entries = extractor.list_files().await.unwrap();
        assert!(entries[1].compressed_size < entries[1].uncompressed_size);
        for entry in &entries {
            assert_eq!(read_entry(&extractor, entry).await, text.as_bytes());
        }
    }

    #[tokio::test]
    async fn rejects_unknown_methods_and_encryption() {
        let extractor = extractor(ZipBuilder::new().file("a", b"a").finish());
        let entry = extractor.list_files().await.unwrap().remove(0);

        let mut bzip = entry.clone();
        bzip.compression_method = CompressionMethod::Unknown(12);
        let err = extractor.open(&bzip).await.err().unwrap();
        assert_eq!(err.to_string(), "unsupported compression method 12");

        let mut encrypted = entry;
        encrypted.flags |= 1;
        assert!(extractor.open(&encrypted).await.is_err());
    }

    #[tokio::test]
    async fn corrupt_data_fails_while_reading() {
        let mut bytes = ZipBuilder::new().file("a.txt", b"original payload").finish();
        let at = bytes
            .windows(16)
            .position(|w| w == b"original payload")
            .unwrap();
        bytes[at] = b'O';

        let extractor = extractor(bytes);
        let entry = extractor.list_files().await.unwrap().remove(0);
        let mut reader = extractor.open(&entry).await.unwrap();
        assert!(read_to_end(&mut reader).await.is_err());
    }
}
