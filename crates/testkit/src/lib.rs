#![warn(missing_docs)]
//! Deterministic testing surfaces: tick stepping, trigger recording and fixtures.

mod doubles;
mod fixtures;
mod ticks;

use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub use doubles::*;
pub use fixtures::*;
pub use ticks::*;

/// A sink that writes recorded triggers as newline-delimited JSON.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append one record per line.
    pub fn write_all(&mut self, records: &[FiredTrigger]) -> Result<()> {
        for record in records {
            let line = serde_json::to_string(record)?;
            self.file.write_all(line.as_bytes())?;
            self.file.write_all(b"\n")?;
        }
        self.file.flush()?;
        debug!(records = records.len(), "Wrote trigger records");
        Ok(())
    }
}
