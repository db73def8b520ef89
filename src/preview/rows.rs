//! Line and field model shared by both preview strategies.
//!
//! Lines end at `\n`, with an optional `\r` before it. A last line without a
//! terminator is still a line, empty lines are rows with one empty field, and an
//! empty object is a single empty header line.

use crate::types::BrowseError;
use std::ops::Range;

const UTF8_BOM: &str = "\u{feff}";

/// Decode the bytes of one line, without its `\n`
pub(crate) fn decode_line(bytes: &[u8], is_header: bool) -> Result<String, BrowseError> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let line = std::str::from_utf8(bytes).map_err(|e| {
        BrowseError::DecodeError(format!("line is not valid UTF-8: {}", e))
    })?;

    let line = if is_header {
        line.strip_prefix(UTF8_BOM).unwrap_or(line)
    } else {
        line
    };
    Ok(line.to_string())
}

/// Whole-object decode: the text plus the byte span of every line
#[derive(Debug)]
pub struct DecodedText {
    text: String,
    lines: Vec<Range<usize>>,
}

impl DecodedText {
    pub fn decode(bytes: Vec<u8>) -> Result<Self, BrowseError> {
        let mut text = String::from_utf8(bytes).map_err(|e| {
            BrowseError::DecodeError(format!(
                "object is not valid UTF-8 (first invalid byte at offset {})",
                e.utf8_error().valid_up_to()
            ))
        })?;
        if text.starts_with(UTF8_BOM) {
            text.drain(..UTF8_BOM.len());
        }

        let mut lines = Vec::new();
        let mut line_start = 0;
        for (idx, _) in text.match_indices('\n') {
            lines.push(line_start..idx);
            line_start = idx + 1;
        }
        if line_start < text.len() || lines.is_empty() {
            lines.push(line_start..text.len());
        }

        Ok(Self { text, lines })
    }

    /// Number of data rows, header excluded
    pub fn total_rows(&self) -> u64 {
        self.lines.len() as u64 - 1
    }

    pub fn line(&self, idx: usize) -> &str {
        let line = &self.text[self.lines[idx].clone()];
        line.strip_suffix('\r').unwrap_or(line)
    }

    pub fn header(&self) -> &str {
        self.line(0)
    }

    /// Data rows `start..end`, 1-indexed, clipped to the rows present
    pub fn rows(&self, start: u64, end: u64) -> impl Iterator<Item = &str> {
        let end = (end as usize).min(self.lines.len());
        let start = (start as usize).min(end);
        (start..end).map(move |idx| self.line(idx))
    }
}

/// Splits a line into fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFormat {
    pub delimiter: u8,
}

impl Default for RowFormat {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl RowFormat {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn parse(&self, line: &str) -> Result<Vec<String>, BrowseError> {
        if line.is_empty() {
            return Ok(vec![String::new()]);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_reader(line.as_bytes());

        let mut record = csv::StringRecord::new();
        match reader.read_record(&mut record) {
            Ok(true) => Ok(record.iter().map(str::to_string).collect()),
            Ok(false) => Ok(vec![String::new()]),
            Err(e) => Err(BrowseError::DecodeError(format!(
                "malformed delimited row: {}",
                e
            ))),
        }
    }
}
