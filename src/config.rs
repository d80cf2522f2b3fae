use std::path::PathBuf;

use log::debug;

use crate::cli::Cli;
use crate::error::Fatal;

const OUT_DIR_MODE: u32 = 0o755;

/// Settings fixed for the whole run.
#[derive(Debug, Clone)]
pub struct Config {
    pub out_dir: PathBuf,
    /// Where standard input is staged
    pub temp_dir: PathBuf,
}

impl Config {
    /// Resolve the output root, creating it (and its parents) if missing.
    pub fn resolve(cli: &Cli) -> Result<Self, Fatal> {
        let out_dir = cli.out_dir.clone();

        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        std::os::unix::fs::DirBuilderExt::mode(&mut builder, OUT_DIR_MODE);
        builder
            .create(&out_dir)
            .map_err(|source| Fatal::CreateOutputDir {
                path: out_dir.clone(),
                source,
            })?;

        debug!("extracting into {}", out_dir.display());
        Ok(Self {
            out_dir,
            temp_dir: std::env::temp_dir(),
        })
    }
}
