//! Materializing archive entries under the output root.
//!
//! Every entry is folded into an [`EntryOutcome`] on its own: a failure is
//! recorded as a warning and never stops the entries after it.

mod sink;

pub use sink::{DiskSink, Sink};

use std::path::{Component, Path, PathBuf};

use log::{debug, trace};
use tokio::io::AsyncWriteExt;

use crate::archive::{EntryReader, ZipExtractor, ZipFileEntry};
use crate::error::EntryError;
use crate::io::ReadAt;

/// Permissions for parent directories that have no entry of their own.
const PARENT_DIR_MODE: u32 = 0o755;

const COPY_BUF_SIZE: usize = 64 * 1024;

/// What happened to one entry.
#[derive(Debug)]
pub struct EntryOutcome {
    /// The name stored in the archive
    pub name: String,
    /// Failures in the order they occurred
    pub warnings: Vec<EntryError>,
    /// Whether the entry was fully written
    pub extracted: bool,
}

impl EntryOutcome {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            warnings: Vec::new(),
            extracted: false,
        }
    }

    fn skipped(mut self, warning: EntryError) -> Self {
        self.warnings.push(warning);
        self
    }

    fn done(mut self) -> Self {
        self.extracted = true;
        self
    }
}

/// Extracts entries of one archive into one output root.
pub struct Extraction<'a, R: ReadAt, S: Sink> {
    archive: &'a ZipExtractor<R>,
    sink: &'a S,
    root: &'a Path,
}

impl<'a, R: ReadAt, S: Sink> Extraction<'a, R, S> {
    pub fn new(archive: &'a ZipExtractor<R>, sink: &'a S, root: &'a Path) -> Self {
        Self {
            archive,
            sink,
            root,
        }
    }

    /// Extract every entry, in archive order.
    pub async fn extract_all(&self, entries: &[ZipFileEntry]) -> Vec<EntryOutcome> {
        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in entries {
            outcomes.push(self.extract_entry(entry).await);
        }
        outcomes
    }

    pub async fn extract_entry(&self, entry: &ZipFileEntry) -> EntryOutcome {
        let outcome = EntryOutcome::new(&entry.file_name);
        let Some(target) = join_inside(self.root, &entry.file_name) else {
            return outcome.skipped(EntryError::UnsafePath {
                name: entry.file_name.clone(),
            });
        };

        if entry.is_directory {
            trace!("mkdir {} ({:o})", target.display(), entry.mode());
            return match self.sink.create_dir_all(&target, entry.mode()).await {
                Ok(()) => outcome.done(),
                Err(source) => outcome.skipped(EntryError::MakeDir {
                    name: entry.file_name.clone(),
                    source,
                }),
            };
        }

        self.extract_file(entry, &target, outcome).await
    }

    async fn extract_file(
        &self,
        entry: &ZipFileEntry,
        target: &Path,
        mut outcome: EntryOutcome,
    ) -> EntryOutcome {
        let name = &entry.file_name;

        let mut reader = match self.archive.open(entry).await {
            Ok(reader) => reader,
            Err(source) => {
                return outcome.skipped(EntryError::OpenEntry {
                    name: name.clone(),
                    source,
                });
            }
        };

        // Archives need not list a file's directories before the file
        let parent = parent_name(name);
        let parent_dir = target.parent().unwrap_or(self.root);
        if let Err(source) = self.sink.create_dir_all(parent_dir, PARENT_DIR_MODE).await {
            outcome.warnings.push(EntryError::MakeDir {
                name: parent.to_string(),
                source,
            });
        }

        trace!("write {} ({:o})", target.display(), entry.mode());
        let mut file = match self.sink.create_file(target, entry.mode()).await {
            Ok(file) => file,
            Err(source) => {
                return outcome.skipped(EntryError::CreateFile {
                    name: name.clone(),
                    source,
                });
            }
        };

        // A failed copy leaves whatever was written so far in place
        match copy(&mut reader, &mut file).await {
            Ok(written) => {
                debug!("extracted {} ({} bytes)", name, written);
                outcome.done()
            }
            Err(source) => outcome.skipped(EntryError::Copy {
                name: name.clone(),
                source,
            }),
        }
    }
}

async fn copy<R: ReadAt, W: tokio::io::AsyncWrite + Unpin>(
    reader: &mut EntryReader<R>,
    writer: &mut W,
) -> std::io::Result<u64> {
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut written = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        written += n as u64;
    }
    writer.flush().await?;
    Ok(written)
}

/// Join a stored name onto `root`, refusing names that would leave it.
///
/// A leading `/` is dropped and `..` is resolved against the name itself, so
/// `/etc/x` lands at `root/etc/x` and `a/../b` at `root/b`.
fn join_inside(root: &Path, name: &str) -> Option<PathBuf> {
    let mut parts = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir | Component::RootDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::Prefix(_) => return None,
        }
    }
    let mut target = root.to_path_buf();
    target.extend(parts);
    Some(target)
}

/// The stored name of an entry's directory, `.` for top-level entries.
fn parent_name(name: &str) -> &str {
    match name.rsplit_once('/') {
        Some(("", _)) | None => ".",
        Some((parent, _)) => parent,
    }
}
