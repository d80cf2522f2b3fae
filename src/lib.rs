//! # sunzip
//!
//! Extract a ZIP archive streamed on standard input.
//!
//! The archive's index lives at its end, so the input is first drained into
//! a randomly named temporary file and then read with random access. Every
//! entry is extracted below an output root and its stored name printed on
//! success; a failing entry is reported as a warning and skipped.
//!
//! ## Example
//!
//! ```no_run
//! use sunzip::{Config, DiskSink, Reporter, unzip};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), sunzip::Fatal> {
//!     let config = Config {
//!         out_dir: "extracted".into(),
//!         temp_dir: std::env::temp_dir(),
//!     };
//!     let mut reporter = Reporter::stdio();
//!     unzip(&config, &mut tokio::io::stdin(), &DiskSink, &mut reporter).await
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod io;
pub mod report;
mod unzip;

#[cfg(test)]
mod testing;

pub use archive::{ZipExtractor, ZipFileEntry};
pub use cli::Cli;
pub use config::Config;
pub use error::{EntryError, Fatal};
pub use extract::{DiskSink, EntryOutcome, Extraction, Sink};
pub use io::{LocalFileReader, ReadAt, StagedArchive};
pub use report::Reporter;
pub use unzip::unzip;
