//! CSV parsing with delimiter sniffing and encoding fallback.
//!
//! Import files arrive as raw bytes. Non-UTF-8 input is decoded as
//! Windows-1252 before parsing, which covers the exports most desktop
//! spreadsheet tools produce.

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;

use crate::domain::csv::{CsvField, CsvRow};
use crate::domain::error::{AppError, Result};

/// A parsed file: original headers in file order plus data rows.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
    pub delimiter: u8,
}

pub struct CsvParser {
    delimiter: Option<u8>,
    trim: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: None,
            trim: true,
        }
    }
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a delimiter instead of sniffing it.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Decode and parse an uploaded file.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParsedCsv> {
        let content = decode(bytes);
        self.parse_content(&content)
    }

    pub fn parse_content(&self, content: &str) -> Result<ParsedCsv> {
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(AppError::ParseError(
                "CSV file has an empty header row".to_string(),
            ));
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 2, e))
            })?;
            rows.push(parse_row(index, &headers, &record));
        }

        Ok(ParsedCsv {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
            delimiter,
        })
    }
}

fn parse_row(index: usize, headers: &StringRecord, record: &StringRecord) -> CsvRow {
    let fields = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            CsvField::new(
                header.to_string(),
                record.get(idx).unwrap_or("").to_string(),
            )
        })
        .collect();
    CsvRow::new(index, fields)
}

/// Decode bytes as UTF-8, falling back to Windows-1252. A leading
/// UTF-8 BOM is stripped.
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(content) => content.to_string(),
        Err(_) => {
            let (content, _, _) = WINDOWS_1252.decode(bytes);
            content.into_owned()
        }
    }
}

/// Pick the delimiter whose per-line count is high and consistent
/// across a sample of the first lines.
pub fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let sample: Vec<&str> = content.lines().take(10).collect();
    if sample.is_empty() {
        return b',';
    }

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &delimiter in &candidates {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

        let avg = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
        let variance = counts
            .iter()
            .map(|&c| (c as f32 - avg).powi(2))
            .sum::<f32>()
            / counts.len() as f32;

        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}
