//! Source file readers.
//!
//! Each reader parses a whole file into [`SourceData`] before returning, so
//! a structurally broken file fails with a `Parse` error and never hands a
//! partial record stream to the loader.
//!
//! # Module Structure
//! - `delimited`: CSV and TSV with a header row
//! - `json`: record- or column-oriented JSON
//! - `spreadsheet`: first worksheet of an Excel or OpenDocument workbook

mod delimited;
mod json;
mod spreadsheet;

use crate::Result;
use crate::error::AdbLoaderError;
use crate::models::SourceData;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use delimited::DelimitedReader;
pub use json::JsonReader;
pub use spreadsheet::SpreadsheetReader;

/// Supported source file kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Tsv,
    Json,
    Spreadsheet,
}

impl SourceFormat {
    /// Resolves the format from a file extension, ignoring case.
    ///
    /// # Errors
    /// Returns a `Configuration` error for a missing or unknown extension.
    ///
    /// # Example
    /// ```rust
    /// use adbloader_core::formats::SourceFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(SourceFormat::from_path(Path::new("q3.XLSX")).unwrap(), SourceFormat::Spreadsheet);
    /// assert!(SourceFormat::from_path(Path::new("notes.txt")).is_err());
    /// ```
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            "" => Err(AdbLoaderError::configuration(format!(
                "cannot tell the format of {} without an extension; pass --format",
                path.display()
            ))),
            other => Err(AdbLoaderError::configuration(format!(
                "unsupported source file type .{} for {}; expected csv, tsv, json, xls, xlsx, xlsm, xlsb or ods",
                other,
                path.display()
            ))),
        }
    }

    /// Field delimiter used when none is configured.
    pub fn default_delimiter(self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            _ => b',',
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = AdbLoaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            "excel" | "xlsx" | "xls" | "ods" | "spreadsheet" => Ok(Self::Spreadsheet),
            other => Err(AdbLoaderError::configuration(format!(
                "unknown source format '{}'; expected csv, tsv, json or excel",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Spreadsheet => "spreadsheet",
        };
        write!(f, "{}", name)
    }
}

/// Reader settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Overrides the format's default field delimiter
    pub delimiter: Option<u8>,
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Validates the reader settings.
    ///
    /// # Errors
    /// Returns a `Configuration` error for a delimiter that is not a
    /// printable ASCII character or tab, or that collides with quoting or
    /// line structure.
    pub fn validate(&self) -> Result<()> {
        if let Some(delimiter) = self.delimiter {
            let usable = delimiter == b'\t' || delimiter.is_ascii_graphic() || delimiter == b' ';
            if !usable || matches!(delimiter, b'"' | b'\r' | b'\n') {
                return Err(AdbLoaderError::configuration(format!(
                    "delimiter {:?} is not usable; pick a printable ASCII character other than '\"'",
                    char::from(delimiter)
                )));
            }
        }
        Ok(())
    }
}

/// A parser for one source file kind.
pub trait FormatReader: Send + Sync {
    /// The format this reader handles.
    fn format(&self) -> SourceFormat;

    /// Parses the whole file.
    ///
    /// # Errors
    /// Returns a `Parse` error for structurally invalid content and an `Io`
    /// error when the file cannot be opened.
    fn read(&self, path: &Path) -> Result<SourceData>;
}

/// Builds the reader for `format`.
///
/// # Errors
/// Returns a `Configuration` error if `config` is invalid.
pub fn create_reader(format: SourceFormat, config: &ReaderConfig) -> Result<Box<dyn FormatReader>> {
    config.validate()?;

    let reader: Box<dyn FormatReader> = match format {
        SourceFormat::Csv | SourceFormat::Tsv => Box::new(DelimitedReader::new(
            format,
            config.delimiter.unwrap_or(format.default_delimiter()),
        )),
        SourceFormat::Json => Box::new(JsonReader),
        SourceFormat::Spreadsheet => Box::new(SpreadsheetReader),
    };
    Ok(reader)
}

/// Reads `path` as `format`.
pub fn read_source(path: &Path, format: SourceFormat, config: &ReaderConfig) -> Result<SourceData> {
    let reader = create_reader(format, config)?;
    tracing::info!("Reading {} as {}", path.display(), format);

    let data = reader.read(path)?;
    tracing::info!(
        "Parsed {} records with {} columns from {}",
        data.len(),
        data.columns.len(),
        path.display()
    );
    Ok(data)
}

fn open_failed(path: &Path, error: std::io::Error) -> AdbLoaderError {
    AdbLoaderError::io(format!("Failed to open {}", path.display()), error)
}

/// Rejects empty and duplicate column names.
fn check_header(path: &Path, names: &[String]) -> Result<()> {
    for (index, name) in names.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(AdbLoaderError::parse(
                path,
                format!("column {} has an empty header", index + 1),
            ));
        }
        if names[..index].contains(name) {
            return Err(AdbLoaderError::parse(
                path,
                format!("duplicate column header '{}'", name),
            ));
        }
    }
    Ok(())
}
