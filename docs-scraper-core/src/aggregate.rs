//! Concatenation of matched files into a single document.
//!
//! Every file becomes a block:
//!
//! ```text
//! <!-- FILE: guide/setup.md -->
//!
//! ### guide/setup.md
//!
//! ...filtered content...
//!
//!
//! ---
//!
//!
//! ```
//!
//! The aggregator writes files in the order it is given them.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::line_filter::{classify, LineClass};
use crate::walk::FileRecord;

const SEPARATOR: &[u8] = b"\n\n---\n\n\n";

#[derive(Debug)]
pub enum AggregateError {
    /// A source file could not be opened or read.
    Read { path: PathBuf, source: io::Error },
    /// The output sink rejected a write.
    Write(io::Error),
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateError::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            AggregateError::Write(e) => write!(f, "failed to write output: {}", e),
        }
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AggregateError::Read { source, .. } => Some(source),
            AggregateError::Write(e) => Some(e),
        }
    }
}

/// Append-only writer of file blocks into `W`.
pub struct Aggregator<W: Write> {
    sink: W,
    files_written: usize,
}

impl<W: Write> Aggregator<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            files_written: 0,
        }
    }

    pub fn files_written(&self) -> usize {
        self.files_written
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Writes every record in order and returns how many were written.
    pub fn aggregate<I>(&mut self, files: I) -> Result<usize, AggregateError>
    where
        I: IntoIterator<Item = FileRecord>,
    {
        let before = self.files_written;
        for record in files {
            self.write_file(&record)?;
        }
        Ok(self.files_written - before)
    }

    /// Writes one block: header, filtered lines, separator.
    ///
    /// The file is opened before anything is written, so a file that cannot
    /// be opened leaves no header behind.
    pub fn write_file(&mut self, record: &FileRecord) -> Result<(), AggregateError> {
        let file = File::open(&record.path).map_err(|source| AggregateError::Read {
            path: record.path.clone(),
            source,
        })?;

        self.write_header(&record.relative_path)
            .map_err(AggregateError::Write)?;
        self.copy_filtered(BufReader::new(file), &record.path)?;
        self.sink.write_all(SEPARATOR).map_err(AggregateError::Write)?;

        self.files_written += 1;
        debug!(file = %record.relative_path.display(), "Aggregated file");
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), AggregateError> {
        self.sink.flush().map_err(AggregateError::Write)
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_header(&mut self, relative_path: &Path) -> io::Result<()> {
        let rel = relative_path.display();
        write!(self.sink, "<!-- FILE: {rel} -->\n\n### {rel}\n\n")
    }

    fn copy_filtered<R: BufRead>(&mut self, mut reader: R, path: &Path) -> Result<(), AggregateError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| AggregateError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                return Ok(());
            }

            let line = strip_terminator(&buf);
            if classify(&String::from_utf8_lossy(line)) == LineClass::Elide {
                continue;
            }
            self.sink.write_all(line).map_err(AggregateError::Write)?;
            self.sink.write_all(b"\n").map_err(AggregateError::Write)?;
        }
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
