//! Rendering of outcomes and diagnostics.
//!
//! Extracted entry names go to the output stream, one per line. Warnings
//! and fatal errors go to the error stream as `<level>: <message>`.

use std::fmt::Display;
use std::io::{self, Write};

use log::debug;

use crate::extract::EntryOutcome;

/// The two streams a run writes to.
pub struct Reporter<O: Write, E: Write> {
    out: O,
    err: E,
}

impl Reporter<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// Print an entry's warnings, then its name if it was extracted.
    pub fn outcome(&mut self, outcome: &EntryOutcome) {
        for warning in &outcome.warnings {
            self.warn(warning);
        }
        if outcome.extracted {
            let res = writeln!(self.out, "{}", outcome.name).and_then(|()| self.out.flush());
            if let Err(e) = res {
                debug!("can't write to output stream: {}", e);
            }
        }
    }

    pub fn warn(&mut self, message: &dyn Display) {
        self.diagnostic("warning", message);
    }

    pub fn fatal(&mut self, message: &dyn Display) {
        self.diagnostic("fatal", message);
    }

    fn diagnostic(&mut self, level: &str, message: &dyn Display) {
        // Keep the manifest and diagnostics in order when both are a terminal
        if let Err(e) = self.out.flush() {
            debug!("can't flush output stream: {}", e);
        }
        if let Err(e) = writeln!(self.err, "{}: {}", level, message) {
            debug!("can't write to error stream: {}", e);
        }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}
