//! Delimited text (CSV, TSV) reader.

use super::{FormatReader, SourceFormat, check_header, open_failed};
use crate::Result;
use crate::error::AdbLoaderError;
use crate::models::{RawValue, Record, SourceData};
use std::io::Read;
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// Reads a delimited file with a mandatory header row.
///
/// Every field is read as text; empty fields become NULL. Rows whose field
/// count differs from the header are structural errors.
#[derive(Debug, Clone)]
pub struct DelimitedReader {
    format: SourceFormat,
    delimiter: u8,
}

impl DelimitedReader {
    pub fn new(format: SourceFormat, delimiter: u8) -> Self {
        Self { format, delimiter }
    }

    /// Parses delimited content from any reader; `path` is used for messages.
    pub fn read_from<R: Read>(&self, input: R, path: &Path) -> Result<SourceData> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(input);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AdbLoaderError::parse(path, format!("invalid header row: {}", e)))?
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let name = if index == 0 {
                    name.trim_start_matches(UTF8_BOM)
                } else {
                    name
                };
                name.trim().to_string()
            })
            .collect();

        if headers.is_empty() {
            return Err(AdbLoaderError::parse(path, "missing header row"));
        }
        check_header(path, &headers)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| AdbLoaderError::parse(path, e.to_string()))?;
            let mut record = Record::new();
            for (name, field) in headers.iter().zip(row.iter()) {
                let value = if field.is_empty() {
                    RawValue::Null
                } else {
                    RawValue::Text(field.to_string())
                };
                record.insert(name.as_str(), value);
            }
            records.push(record);
        }

        Ok(SourceData {
            columns: headers,
            records,
        })
    }
}

impl FormatReader for DelimitedReader {
    fn format(&self) -> SourceFormat {
        self.format
    }

    fn read(&self, path: &Path) -> Result<SourceData> {
        let file = std::fs::File::open(path).map_err(|e| open_failed(path, e))?;
        self.read_from(std::io::BufReader::new(file), path)
    }
}
