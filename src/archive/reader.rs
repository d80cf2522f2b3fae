//! Decompressed, checksummed byte stream of one archive entry.
//!
//! Compressed bytes are pulled from the archive in fixed-size chunks, so an
//! entry never has to fit in memory.

use std::io;
use std::sync::Arc;

use crc32fast::Hasher;
use flate2::{Decompress, FlushDecompress, Status};

use crate::io::ReadAt;

use super::structures::{CompressionMethod, ZipFileEntry};

/// Compressed bytes fetched per read from the archive.
const CHUNK_SIZE: usize = 64 * 1024;

/// Running CRC-32 and length of the bytes produced so far.
pub struct Checksum {
    hasher: Hasher,
    expected_crc: u32,
    expected_len: u64,
    len: u64,
}

impl Checksum {
    pub fn new(expected_crc: u32, expected_len: u64) -> Self {
        Self {
            hasher: Hasher::new(),
            expected_crc,
            expected_len,
            len: 0,
        }
    }

    /// Account for `data`. Fails as soon as the declared size is exceeded.
    pub fn update(&mut self, data: &[u8]) -> io::Result<()> {
        let len = self.len + data.len() as u64;
        if len > self.expected_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "size mismatch: expected {} bytes, got more",
                    self.expected_len
                ),
            ));
        }
        self.hasher.update(data);
        self.len = len;
        Ok(())
    }

    /// Verify length and CRC-32 once the stream has ended.
    pub fn finish(&self) -> io::Result<()> {
        if self.len != self.expected_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "size mismatch: expected {} bytes, got {}",
                    self.expected_len, self.len
                ),
            ));
        }
        if self.hasher.clone().finalize() != self.expected_crc {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "checksum mismatch"));
        }
        Ok(())
    }
}

enum Method {
    Stored,
    Deflate(Box<Decompress>),
}

/// The decompressed contents of a file entry.
///
/// A corrupt entry surfaces as a read error, at the latest when EOF is hit.
pub struct EntryReader<R: ReadAt> {
    source: Arc<R>,
    /// Archive offset of the next compressed chunk
    offset: u64,
    /// Compressed bytes not fetched yet
    remaining: u64,
    chunk: Vec<u8>,
    chunk_pos: usize,
    method: Method,
    ended: bool,
    checksum: Checksum,
}

impl<R: ReadAt> EntryReader<R> {
    pub(crate) fn new(source: Arc<R>, data_offset: u64, entry: &ZipFileEntry) -> Self {
        let method = match entry.compression_method {
            CompressionMethod::Deflate => Method::Deflate(Box::new(Decompress::new(false))),
            _ => Method::Stored,
        };
        Self {
            source,
            offset: data_offset,
            remaining: entry.compressed_size,
            chunk: Vec::new(),
            chunk_pos: 0,
            method,
            ended: false,
            checksum: Checksum::new(entry.crc32, entry.uncompressed_size),
        }
    }

    /// Read decompressed bytes into `buf`; `Ok(0)` means a verified end.
    pub async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let n = match self.method {
            Method::Stored => self.read_stored(buf).await?,
            Method::Deflate(_) => self.read_deflate(buf).await?,
        };
        if n == 0 {
            self.checksum.finish()?;
        } else {
            self.checksum.update(&buf[..n])?;
        }
        Ok(n)
    }

    /// Fetch the next compressed chunk once the current one is used up.
    async fn fill(&mut self) -> io::Result<()> {
        if self.chunk_pos < self.chunk.len() || self.remaining == 0 {
            return Ok(());
        }
        let len = self.remaining.min(CHUNK_SIZE as u64) as usize;
        self.chunk.resize(len, 0);
        self.source
            .read_at(self.offset, &mut self.chunk)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::UnexpectedEof, e.to_string()))?;
        self.offset += len as u64;
        self.remaining -= len as u64;
        self.chunk_pos = 0;
        Ok(())
    }

    async fn read_stored(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill().await?;
        let available = &self.chunk[self.chunk_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.chunk_pos += n;
        Ok(n)
    }

    async fn read_deflate(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.ended {
                return Ok(0);
            }
            self.fill().await?;

            let Method::Deflate(inflater) = &mut self.method else {
                return Ok(0);
            };
            let input = &self.chunk[self.chunk_pos..];
            let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
            let status = inflater
                .decompress(input, buf, FlushDecompress::None)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let consumed = (inflater.total_in() - in_before) as usize;
            let produced = (inflater.total_out() - out_before) as usize;

            self.chunk_pos += consumed;
            if status == Status::StreamEnd {
                self.ended = true;
            }
            if produced > 0 || self.ended {
                return Ok(produced);
            }
            // `fill` only leaves the chunk empty once the entry is exhausted
            if consumed == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "truncated deflate stream",
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::HostSystem;
    use crate::testing::MemoryReader;
    use flate2::Compression;
    use flate2::write::DeflateEncoder;
    use std::io::Write;

    const DATA: &[u8] = b"1234";
    const DATA_CRC: u32 = 0x9be3e0a3;

    fn entry(method: CompressionMethod, compressed: u64, crc32: u32, len: u64) -> ZipFileEntry {
        ZipFileEntry {
            file_name: "e".to_string(),
            compression_method: method,
            compressed_size: compressed,
            uncompressed_size: len,
            crc32,
            lfh_offset: 0,
            flags: 0,
            host: HostSystem::Unix,
            external_attrs: 0,
            is_directory: false,
        }
    }

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn crc(data: &[u8]) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Reads everything through a small buffer, stopping at the first error.
    async fn drain(reader: &mut EntryReader<MemoryReader>) -> (Vec<u8>, io::Result<()>) {
        let mut out = Vec::new();
        let mut buf = [0u8; 1000];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => return (out, Ok(())),
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(e) => return (out, Err(e)),
            }
        }
    }

    /// Deterministic, poorly compressible bytes.
    fn noise(len: usize) -> Vec<u8> {
        let mut state = 0x2545_f491_u32;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect()
    }

    #[test]
    fn checksum_of_empty_input() {
        assert!(Checksum::new(0, 0).finish().is_ok());
        let err = Checksum::new(1, 0).finish().unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn checksum_byte_by_byte() {
        let mut checksum = Checksum::new(DATA_CRC, 4);
        for byte in DATA.chunks(1) {
            checksum.update(byte).unwrap();
        }
        checksum.finish().unwrap();
    }

    #[test]
    fn short_length_is_checked_at_the_end() {
        let mut checksum = Checksum::new(DATA_CRC, 5);
        checksum.update(DATA).unwrap();
        let err = checksum.finish().unwrap_err();
        assert!(err.to_string().contains("size mismatch"));
    }

    #[test]
    fn excess_length_fails_immediately() {
        let mut checksum = Checksum::new(DATA_CRC, 3);
        checksum.update(&DATA[..3]).unwrap();
        let err = checksum.update(&DATA[3..]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("size mismatch"));
    }

    #[tokio::test]
    async fn stored_entries_stream_across_chunks() {
        let data = noise(3 * CHUNK_SIZE + 17);
        let mut archive = b"prefix".to_vec();
        archive.extend_from_slice(&data);
        archive.extend_from_slice(b"suffix");

        let e = entry(CompressionMethod::Stored, data.len() as u64, crc(&data), data.len() as u64);
        let mut reader = EntryReader::new(Arc::new(MemoryReader::new(archive)), 6, &e);
        let (out, result) = drain(&mut reader).await;
        result.unwrap();
        assert_eq!(out, data);
    }

    #[tokio::test]
    async fn deflate_entries_stream_across_chunks() {
        let data = noise(2 * CHUNK_SIZE + 5);
        let compressed = deflate(&data);
        assert!(compressed.len() > CHUNK_SIZE);

        let e = entry(
            CompressionMethod::Deflate,
            compressed.len() as u64,
            crc(&data),
            data.len() as u64,
        );
        let mut reader = EntryReader::new(Arc::new(MemoryReader::new(compressed)), 0, &e);
        let (out, result) = drain(&mut reader).await;
        result.unwrap();
        assert_eq!(out, data);
    }

    #[tokio::test]
    async fn oversized_deflate_output_stops_at_declared_size() {
        let data = vec![b'z'; 1 << 20];
        let compressed = deflate(&data);

        let e = entry(CompressionMethod::Deflate, compressed.len() as u64, crc(&data), 4);
        let mut reader = EntryReader::new(Arc::new(MemoryReader::new(compressed)), 0, &e);
        let (out, result) = drain(&mut reader).await;

        assert!(out.len() <= 4);
        assert!(result.unwrap_err().to_string().contains("size mismatch"));
    }

    #[tokio::test]
    async fn truncated_deflate_stream_is_an_error() {
        let data = noise(10_000);
        let mut compressed = deflate(&data);
        compressed.truncate(compressed.len() / 2);

        let e = entry(
            CompressionMethod::Deflate,
            compressed.len() as u64,
            crc(&data),
            data.len() as u64,
        );
        let mut reader = EntryReader::new(Arc::new(MemoryReader::new(compressed)), 0, &e);
        let (_, result) = drain(&mut reader).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn zero_length_read_returns_nothing() {
        let e = entry(CompressionMethod::Stored, 4, DATA_CRC, 4);
        let mut reader = EntryReader::new(Arc::new(MemoryReader::new(DATA.to_vec())), 0, &e);
        assert_eq!(reader.read(&mut []).await.unwrap(), 0);
        let (out, result) = drain(&mut reader).await;
        result.unwrap();
        assert_eq!(out, DATA);
    }
}
