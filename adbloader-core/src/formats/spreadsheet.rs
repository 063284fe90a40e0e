//! Spreadsheet reader for the first worksheet of a workbook.
//!
//! The first row holds the column names. Native cell types are preserved:
//! numbers stay numeric, booleans stay boolean and date cells become
//! datetimes. Cells holding a formula error load as NULL with a warning.
//! Rows with no values at all are skipped.

use super::{FormatReader, SourceFormat, check_header, open_failed};
use crate::Result;
use crate::error::AdbLoaderError;
use crate::models::{RawValue, Record, SourceData};
use calamine::{Data, Range, Reader, open_workbook_auto};
use std::path::Path;

/// Reads `.xls`, `.xlsx`, `.xlsm`, `.xlsb` and `.ods` workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetReader;

impl FormatReader for SpreadsheetReader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Spreadsheet
    }

    fn read(&self, path: &Path) -> Result<SourceData> {
        std::fs::metadata(path).map_err(|e| open_failed(path, e))?;

        let mut workbook = open_workbook_auto(path)
            .map_err(|e| AdbLoaderError::parse(path, format!("cannot open workbook: {}", e)))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| AdbLoaderError::parse(path, "workbook has no worksheets"))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AdbLoaderError::parse(path, "workbook has no worksheets"))?
            .map_err(|e| {
                AdbLoaderError::parse(path, format!("cannot read worksheet '{}': {}", sheet, e))
            })?;

        tracing::debug!("Reading worksheet '{}' of {}", sheet, path.display());
        sheet_to_source(&range, &sheet, path)
    }
}

/// Converts a worksheet range into records keyed by the header row.
pub(crate) fn sheet_to_source(range: &Range<Data>, sheet: &str, path: &Path) -> Result<SourceData> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(AdbLoaderError::parse(
            path,
            format!("worksheet '{}' is empty", sheet),
        ));
    };

    let mut columns: Vec<String> = header_row.iter().map(header_name).collect();
    let body: Vec<&[Data]> = rows.collect();

    // Formatting can stretch the used range past the last named column
    while columns.last().is_some_and(|name| name.is_empty()) {
        let index = columns.len() - 1;
        let column_empty = body
            .iter()
            .all(|row| row.get(index).is_none_or(|cell| matches!(cell, Data::Empty)));
        if !column_empty {
            break;
        }
        columns.pop();
    }
    check_header(path, &columns)?;

    let first_row = range.start().map_or(0, |(row, _)| row) + 1;
    let mut records = Vec::with_capacity(body.len());
    for (offset, row) in body.iter().enumerate() {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        // 1-based worksheet row, header included
        let row_number = first_row + 1 + offset as u32;

        let mut record = Record::new();
        for (name, cell) in columns.iter().zip(row.iter()) {
            record.insert(name.as_str(), cell_value(cell, sheet, row_number, name));
        }
        records.push(record);
    }

    Ok(SourceData { columns, records })
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_value(cell: &Data, sheet: &str, row: u32, column: &str) -> RawValue {
    match cell {
        Data::Empty => RawValue::Null,
        Data::String(s) if s.is_empty() => RawValue::Null,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Int(i) => RawValue::Integer(*i),
        Data::Float(f) => RawValue::Float(*f),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => RawValue::Float(dt.as_f64()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(RawValue::Float(dt.as_f64()), RawValue::DateTime),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(e) => {
            tracing::warn!(
                "Worksheet '{}' row {} column '{}' holds error {}; loading NULL",
                sheet,
                row,
                column,
                e
            );
            RawValue::Null
        }
    }
}
