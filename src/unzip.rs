//! One run, start to finish: stage the input, open it, extract it.

use std::io::Write;
use std::sync::Arc;

use log::info;
use tokio::io::AsyncRead;

use crate::archive::ZipExtractor;
use crate::config::Config;
use crate::error::Fatal;
use crate::extract::{Extraction, Sink};
use crate::io::{LocalFileReader, StagedArchive};
use crate::report::Reporter;

/// Extract the archive read from `input` into `config.out_dir`.
///
/// Per-entry problems are reported through `reporter` as they happen and do
/// not fail the run. The staging file is gone when this returns.
pub async fn unzip<I, S, O, E>(
    config: &Config,
    input: &mut I,
    sink: &S,
    reporter: &mut Reporter<O, E>,
) -> Result<(), Fatal>
where
    I: AsyncRead + Unpin,
    S: Sink,
    O: Write,
    E: Write,
{
    let staged = StagedArchive::from_reader(&config.temp_dir, input).await?;
    info!("staged {} bytes", staged.len());

    {
        let reader = LocalFileReader::new(staged.path()).map_err(Fatal::OpenArchive)?;
        let archive = ZipExtractor::new(Arc::new(reader));
        let entries = archive.list_files().await.map_err(Fatal::OpenArchive)?;
        info!("archive lists {} entries", entries.len());

        let extraction = Extraction::new(&archive, sink, &config.out_dir);
        let mut extracted = 0usize;
        for entry in &entries {
            let outcome = extraction.extract_entry(entry).await;
            extracted += outcome.extracted as usize;
            reporter.outcome(&outcome);
        }
        info!("extracted {} of {} entries", extracted, entries.len());
    }

    // The archive handle is closed by now, which Windows needs for removal
    if let Err(e) = staged.close() {
        reporter.warn(&e);
    }
    Ok(())
}
