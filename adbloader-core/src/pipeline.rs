//! One complete load run.
//!
//! ```text
//! ConnectionFactory::connect -> Session::describe -> read_source -> BulkLoader::load
//! ```
//!
//! The session is closed on every exit path once it has been opened.

use crate::Result;
use crate::adapters::{ConnectionFactory, LoadConfig, Session};
use crate::error::AdbLoaderError;
use crate::formats::{ReaderConfig, SourceFormat, read_source};
use crate::loader::{BulkLoader, LoadSummary};
use crate::models::{SourceData, TableSchema};
use crate::validation::validate_identifier;
use std::path::{Path, PathBuf};

/// Everything a load run needs besides the credentials.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Destination schema; `None` uses the session default
    pub schema: Option<String>,
    pub table: String,
    pub source: PathBuf,
    pub format: SourceFormat,
    pub reader: ReaderConfig,
    pub load: LoadConfig,
}

impl LoadRequest {
    /// Creates a request with the format taken from the file extension.
    ///
    /// # Errors
    /// Returns a `Configuration` error for an unrecognized extension.
    pub fn new(table: impl Into<String>, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let format = SourceFormat::from_path(&source)?;
        Ok(Self {
            schema: None,
            table: table.into(),
            source,
            format,
            reader: ReaderConfig::default(),
            load: LoadConfig::default(),
        })
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_reader_config(mut self, reader: ReaderConfig) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_load_config(mut self, load: LoadConfig) -> Self {
        self.load = load;
        self
    }

    /// Checks everything that can be checked without I/O.
    pub fn validate(&self) -> Result<()> {
        if let Some(schema) = &self.schema {
            validate_identifier("schema", schema)?;
        }
        validate_identifier("table", &self.table)?;
        self.reader.validate()?;
        self.load.validate()
    }
}

/// Runs a full load and returns what was appended.
///
/// # Errors
/// Any error of the stages above; a `Load` error means earlier batches
/// stayed committed.
pub async fn run_load(factory: &ConnectionFactory, request: &LoadRequest) -> Result<LoadSummary> {
    request.validate()?;

    let session = factory.connect().await?;
    let outcome = load_into(&session, request).await;
    session.close().await;

    match &outcome {
        Ok(summary) => tracing::info!(
            "Loaded {} rows into {} in {} batch(es)",
            summary.rows,
            request.table,
            summary.batches
        ),
        Err(e) => tracing::error!("Load into {} failed: {}", request.table, e),
    }
    outcome
}

/// Runs a load on an already open session. The caller closes the session.
pub async fn load_into(session: &Session, request: &LoadRequest) -> Result<LoadSummary> {
    let target = session
        .describe(request.schema.as_deref(), &request.table)
        .await?;
    let data = read_source_blocking(&request.source, request.format, &request.reader).await?;

    BulkLoader::new(request.load)
        .load(session.destination(), &target, &data)
        .await
}

/// Fetches a table definition through a short-lived session.
pub async fn describe_table(
    factory: &ConnectionFactory,
    schema: Option<&str>,
    table: &str,
) -> Result<TableSchema> {
    if let Some(schema) = schema {
        validate_identifier("schema", schema)?;
    }
    validate_identifier("table", table)?;

    let session = factory.connect().await?;
    let outcome = session.describe(schema, table).await;
    session.close().await;
    outcome
}

/// Parses the source file off the async runtime.
pub async fn read_source_blocking(
    path: &Path,
    format: SourceFormat,
    config: &ReaderConfig,
) -> Result<SourceData> {
    let owned_path = path.to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || read_source(&owned_path, format, &config))
        .await
        .map_err(|e| AdbLoaderError::parse(path, format!("reader task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_resolves_format_from_extension() {
        let request = LoadRequest::new("people", "/data/people.tsv").unwrap();
        assert_eq!(request.format, SourceFormat::Tsv);
        assert!(request.schema.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_rejects_unknown_extension() {
        let error = LoadRequest::new("people", "/data/people.parquet").unwrap_err();
        assert!(matches!(error, AdbLoaderError::Configuration { .. }));
    }

    #[test]
    fn test_request_validation() {
        let request = LoadRequest::new("people", "people.csv")
            .unwrap()
            .with_load_config(LoadConfig::default().with_batch_size(0));
        assert!(request.validate().is_err());

        let request = LoadRequest::new("", "people.csv").unwrap();
        assert!(request.validate().is_err());
    }

    #[tokio::test]
    async fn test_read_source_blocking_parses_off_runtime() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "id,name\n1,Ada\n").unwrap();

        let data = read_source_blocking(&path, SourceFormat::Csv, &ReaderConfig::default())
            .await
            .unwrap();
        assert_eq!(data.len(), 1);
    }
}
