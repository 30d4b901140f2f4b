//! Report writer trait and the writers the crawler ships with
//!
//! The emitter formats records; a `ReportWriter` only appends finished
//! lines to wherever the report lives.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create report {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Sink for report lines
///
/// Implementations receive one complete line at a time, without the
/// trailing newline. The emitter is the only caller and it is always
/// behind the crawl lock, so writers need not synchronize themselves.
pub trait ReportWriter: Send {
    /// Appends one line to the report
    fn write_line(&mut self, line: &str) -> OutputResult<()>;

    /// Pushes buffered lines to the underlying sink
    fn flush(&mut self) -> OutputResult<()>;
}

/// Writes the report to a file on disk
pub struct DelimitedFileWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl DelimitedFileWriter {
    /// Creates (or truncates) the report file
    ///
    /// # Arguments
    ///
    /// * `path` - Destination of the report
    ///
    /// # Returns
    ///
    /// * `Ok(DelimitedFileWriter)` - The file is open for writing
    /// * `Err(OutputError::Create)` - The file could not be created
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path).map_err(|source| OutputError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportWriter for DelimitedFileWriter {
    fn write_line(&mut self, line: &str) -> OutputResult<()> {
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps report lines in memory
///
/// Clones share the same buffer, so a caller can hand one clone to the
/// crawler and read the lines back from another.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line written so far
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ReportWriter for MemoryWriter {
    fn write_line(&mut self, line: &str) -> OutputResult<()> {
        self.lines
            .lock()
            .map_err(|_| OutputError::Write("memory report lock poisoned".to_string()))?
            .push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
