//! Diagnostic taxonomy.
//!
//! Two tiers: [`Fatal`] stops the run with exit status 1, [`EntryError`]
//! is reported as a warning and only skips the affected entry. Both render
//! as `<what failed> (reason: "<cause>")`.

use std::fmt::Display;
use std::path::PathBuf;

use thiserror::Error;

/// Quote an underlying cause the way diagnostics embed it.
pub fn quote(cause: impl Display) -> String {
    format!("{:?}", cause.to_string())
}

/// Errors that make further progress meaningless.
#[derive(Debug, Error)]
pub enum Fatal {
    #[error("can't create output directory {:?} (reason: {})", .path, quote(.source))]
    CreateOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("can't create temporary zip file (reason: {})", quote(.0))]
    CreateTemp(#[source] std::io::Error),

    #[error("can't read from standard input (reason: {})", quote(.0))]
    ReadStdin(#[source] std::io::Error),

    #[error("can't write to temporary zip file (reason: {})", quote(.0))]
    WriteTemp(#[source] std::io::Error),

    #[error("can't read from temporary zip file (reason: {})", quote(.0))]
    OpenArchive(#[source] anyhow::Error),
}

/// The staging file could not be deleted. Reported, never fatal.
#[derive(Debug, Error)]
#[error("can't remove temporary zip file {:?} (reason: {})", .path, quote(.source))]
pub struct RemoveTemp {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Per-entry failures. The run continues with the next entry.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("can't extract {name:?} outside the output directory (reason: \"path escapes the output root\")")]
    UnsafePath { name: String },

    #[error("can't make directory {name:?} (reason: {})", quote(.source))]
    MakeDir {
        name: String,
        source: std::io::Error,
    },

    #[error("can't open file {name:?} in zip file (reason: {})", quote(.source))]
    OpenEntry {
        name: String,
        source: anyhow::Error,
    },

    #[error("can't open file {name:?} (reason: {})", quote(.source))]
    CreateFile {
        name: String,
        source: std::io::Error,
    },

    #[error("can't copy file contents: {name:?} (reason: {})", quote(.source))]
    Copy {
        name: String,
        source: std::io::Error,
    },
}
