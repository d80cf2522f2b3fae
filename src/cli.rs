use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sunzip")]
#[command(version)]
#[command(about = "Extract a ZIP archive read from standard input", long_about = None)]
#[command(after_help = "Example:\n  \
  $ echo foo > bar.txt\n  \
  $ zip baz.zip bar.txt\n  \
  $ cat baz.zip | sunzip extracted\n  \
  $ ls extracted\n  \
  bar.txt\n  \
  $ cat extracted/bar.txt\n  \
  foo")]
pub struct Cli {
    /// Output root directory; every entry is extracted below it (created if missing)
    #[arg(value_name = "OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Log progress on stderr (-vv for debug, -vvv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log level implied by `-v` occurrences.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
