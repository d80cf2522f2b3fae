//! ZIP archive parsing.
//!
//! The archive is read through [`ReadAt`](crate::io::ReadAt), so it only
//! needs random access, never a full in-memory copy.
//!
//! - [`structures`]: fixed records of the format (EOCD, ZIP64, headers)
//! - [`parser`]: locating and decoding the central directory
//! - [`reader`]: per-entry decompression with CRC-32 verification
//! - [`ZipExtractor`]: listing entries and opening their contents
//!
//! Supported: STORED and DEFLATE, ZIP64, archive comments, UTF-8 and CP437
//! names. Not supported: encryption, multi-disk archives, other methods.

mod extractor;
mod parser;
mod reader;
mod structures;

pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use reader::EntryReader;
pub use structures::*;
