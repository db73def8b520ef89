//! Streaming strategy: a one-pass checkpoint index over the object bytes, and a
//! windowed reader that resumes from the nearest checkpoint.

use super::rows::decode_line;
use crate::storage::ObjectStream;
use crate::types::{BrowseError, ObjectVersion};
use futures::StreamExt;

/// Line counts and checkpoint offsets for one version of an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIndex {
    pub version: ObjectVersion,
    pub header: String,
    total_lines: u64,
    interval: u64,
    /// `checkpoints[i]` is the byte offset where line `i * interval` starts
    checkpoints: Vec<u64>,
}

impl RowIndex {
    /// Scan a whole object body
    pub async fn build(
        mut body: ObjectStream,
        version: ObjectVersion,
        interval: u64,
    ) -> Result<Self, BrowseError> {
        let mut builder = RowIndexBuilder::new(interval);
        while let Some(chunk) = body.next().await {
            builder.feed(&chunk?)?;
        }
        builder.finish(version)
    }

    /// Number of data rows, header excluded
    pub fn total_rows(&self) -> u64 {
        self.total_lines - 1
    }

    /// Nearest checkpoint at or before `line`, as `(line, byte offset)`
    pub fn checkpoint_before(&self, line: u64) -> (u64, u64) {
        let slot = ((line / self.interval) as usize).min(self.checkpoints.len() - 1);
        (slot as u64 * self.interval, self.checkpoints[slot])
    }

    /// Byte offset of the first checkpoint at or after `line`, if there is one
    pub fn checkpoint_after(&self, line: u64) -> Option<u64> {
        let slot = line.div_ceil(self.interval) as usize;
        self.checkpoints.get(slot).copied()
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }
}

/// Incremental line scanner feeding a [`RowIndex`]
pub struct RowIndexBuilder {
    interval: u64,
    offset: u64,
    line_no: u64,
    line_started: bool,
    pending: Vec<u8>,
    header: Option<String>,
    checkpoints: Vec<u64>,
}

impl RowIndexBuilder {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            offset: 0,
            line_no: 0,
            line_started: false,
            pending: Vec::new(),
            header: None,
            checkpoints: Vec::new(),
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), BrowseError> {
        let mut pos = 0;
        while pos < chunk.len() {
            if !self.line_started {
                if self.line_no % self.interval == 0 {
                    self.checkpoints.push(self.offset + pos as u64);
                }
                self.line_started = true;
            }

            match chunk[pos..].iter().position(|&b| b == b'\n') {
                Some(len) => {
                    self.pending.extend_from_slice(&chunk[pos..pos + len]);
                    self.end_line()?;
                    pos += len + 1;
                }
                None => {
                    self.pending.extend_from_slice(&chunk[pos..]);
                    pos = chunk.len();
                }
            }
        }
        self.offset += chunk.len() as u64;
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), BrowseError> {
        let line = decode_line(&self.pending, self.line_no == 0).map_err(|e| match e {
            BrowseError::DecodeError(msg) => {
                BrowseError::DecodeError(format!("line {}: {}", self.line_no, msg))
            }
            other => other,
        })?;
        if self.line_no == 0 {
            self.header = Some(line);
        }

        self.pending.clear();
        self.line_no += 1;
        self.line_started = false;
        Ok(())
    }

    pub fn finish(mut self, version: ObjectVersion) -> Result<RowIndex, BrowseError> {
        if self.line_started {
            self.end_line()?;
        }
        if self.checkpoints.is_empty() {
            self.checkpoints.push(0);
        }

        Ok(RowIndex {
            version,
            header: self.header.unwrap_or_default(),
            total_lines: self.line_no.max(1),
            interval: self.interval,
            checkpoints: self.checkpoints,
        })
    }
}

/// Read `take` lines from a body positioned at a line start, after skipping `skip` lines
pub async fn read_lines(
    mut body: ObjectStream,
    skip: u64,
    take: u64,
) -> Result<Vec<String>, BrowseError> {
    let mut reader = LineWindow::new(skip, take);
    while let Some(chunk) = body.next().await {
        if reader.feed(&chunk?)? {
            break;
        }
    }
    reader.finish()
}

struct LineWindow {
    skip: u64,
    take: u64,
    line_no: u64,
    line_started: bool,
    pending: Vec<u8>,
    lines: Vec<String>,
}

impl LineWindow {
    fn new(skip: u64, take: u64) -> Self {
        Self {
            skip,
            take,
            line_no: 0,
            line_started: false,
            pending: Vec::new(),
            lines: Vec::with_capacity(take.min(1 << 16) as usize),
        }
    }

    fn is_full(&self) -> bool {
        self.lines.len() as u64 >= self.take
    }

    fn wanted(&self) -> bool {
        self.line_no >= self.skip
    }

    /// Returns true once the window is complete
    fn feed(&mut self, chunk: &[u8]) -> Result<bool, BrowseError> {
        let mut pos = 0;
        while pos < chunk.len() && !self.is_full() {
            self.line_started = true;
            match chunk[pos..].iter().position(|&b| b == b'\n') {
                Some(len) => {
                    if self.wanted() {
                        self.pending.extend_from_slice(&chunk[pos..pos + len]);
                        self.lines.push(decode_line(&self.pending, false)?);
                        self.pending.clear();
                    }
                    self.line_no += 1;
                    self.line_started = false;
                    pos += len + 1;
                }
                None => {
                    if self.wanted() {
                        self.pending.extend_from_slice(&chunk[pos..]);
                    }
                    pos = chunk.len();
                }
            }
        }
        Ok(self.is_full())
    }

    fn finish(mut self) -> Result<Vec<String>, BrowseError> {
        if self.line_started && self.wanted() && !self.is_full() {
            self.lines.push(decode_line(&self.pending, false)?);
        }
        Ok(self.lines)
    }
}
