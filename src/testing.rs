//! Fixtures shared by the unit tests.

use std::io::{Cursor, Write};

use anyhow::{Result, bail};
use async_trait::async_trait;
use zip::write::SimpleFileOptions;

use crate::io::ReadAt;

/// An archive held in memory.
pub struct MemoryReader {
    data: Vec<u8>,
}

impl MemoryReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

#[async_trait]
impl ReadAt for MemoryReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let start = offset as usize;
        let Some(src) = self.data.get(start..start + buf.len()) else {
            bail!("short read of {} bytes at offset {}", buf.len(), offset);
        };
        buf.copy_from_slice(src);
        Ok(buf.len())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Builds archive bytes with the `zip` crate's writer.
pub struct ZipBuilder {
    writer: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            writer: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn add(mut self, name: &str, data: &[u8], options: SimpleFileOptions) -> Self {
        self.writer.start_file(name, options).unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    pub fn file(self, name: &str, data: &[u8]) -> Self {
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        self.add(name, data, options)
    }

    pub fn deflated(self, name: &str, data: &[u8]) -> Self {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.add(name, data, options)
    }

    pub fn file_with_mode(self, name: &str, data: &[u8], mode: u32) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(mode);
        self.add(name, data, options)
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.writer
            .add_directory(name, SimpleFileOptions::default())
            .unwrap();
        self
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.writer.set_comment(comment);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.finish().unwrap().into_inner()
    }
}
