//! End-to-end load runs against file-backed SQLite databases.
//!
//! Each test builds a complete local installation in a temporary directory:
//! a key pair and vault record, a `targets.json` naming a SQLite database,
//! and the source file to load.

#![cfg(feature = "sqlite")]

use adbloader_core::{
    AdbLoaderError, ConnectionFactory, CredentialVault, KeyConfig, KeyManager, LoadConfig,
    LoadRequest, Result, TargetDirectory, VaultPaths, adapters::TARGETS_FILE, run_load,
};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, Executor, SqliteConnection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Installation {
    root: TempDir,
    database: PathBuf,
}

impl Installation {
    /// Vault, targets file and an empty `people (id INTEGER NOT NULL, name TEXT)` table.
    async fn new() -> Self {
        let root = TempDir::new().unwrap();
        let database = root.path().join("warehouse.db");

        let mut conn = open(&database, true).await;
        conn.execute("CREATE TABLE people (id INTEGER NOT NULL, name TEXT)")
            .await
            .unwrap();
        conn.close().await.unwrap();

        let admin = root.path().join("admin");
        std::fs::create_dir_all(&admin).unwrap();
        std::fs::write(
            admin.join(TARGETS_FILE),
            format!(r#"{{ "warehouse": "sqlite://{}" }}"#, database.display()),
        )
        .unwrap();

        let installation = Self { root, database };
        let vault = installation.vault();
        vault.keys().ensure_key_pair().unwrap();
        vault.store("loader", "not-used-by-sqlite", "warehouse").unwrap();
        installation
    }

    fn vault(&self) -> CredentialVault {
        let paths = VaultPaths::new(self.root.path().join(".adb"));
        CredentialVault::new(KeyManager::new(paths, KeyConfig::default()))
    }

    fn factory(&self) -> ConnectionFactory {
        let targets = TargetDirectory::load(&self.root.path().join("admin")).unwrap();
        ConnectionFactory::new(self.vault(), targets)
    }

    fn source(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    async fn rows(&self) -> Vec<(i64, Option<String>)> {
        let mut conn = open(&self.database, false).await;
        let rows = sqlx::query_as("SELECT id, name FROM people ORDER BY rowid")
            .fetch_all(&mut conn)
            .await
            .unwrap();
        conn.close().await.unwrap();
        rows
    }
}

async fn open(path: &Path, create: bool) -> SqliteConnection {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .connect()
        .await
        .unwrap()
}

// =============================================================================
// Successful Loads
// =============================================================================

/// Source columns in a different order than the table still land by name
#[tokio::test]
async fn test_pipeline_maps_columns_by_name() -> Result<()> {
    let install = Installation::new().await;
    let source = install.source("people.csv", "name,id\nAda,1\nGrace,2\nEdsger,3\n");

    let request = LoadRequest::new("people", source)?;
    let summary = run_load(&install.factory(), &request).await?;

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.batches, 1);
    assert_eq!(
        install.rows().await,
        vec![
            (1, Some("Ada".to_string())),
            (2, Some("Grace".to_string())),
            (3, Some("Edsger".to_string())),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_pipeline_loads_json_records_in_batches() -> Result<()> {
    let install = Installation::new().await;
    let source = install.source(
        "people.json",
        r#"[{"id": 1, "name": "a"}, {"id": 2}, {"id": 3, "name": "c"}]"#,
    );

    let request = LoadRequest::new("people", source)?
        .with_schema("main")
        .with_load_config(LoadConfig::default().with_batch_size(2));
    let summary = run_load(&install.factory(), &request).await?;

    assert_eq!(summary.batches, 2);
    assert_eq!(install.rows().await[1], (2, None));
    Ok(())
}

#[tokio::test]
async fn test_pipeline_appends_without_replacing() -> Result<()> {
    let install = Installation::new().await;
    let source = install.source("people.csv", "id,name\n1,Ada\n");
    let request = LoadRequest::new("people", source)?;

    run_load(&install.factory(), &request).await?;
    run_load(&install.factory(), &request).await?;

    assert_eq!(install.rows().await.len(), 2);
    Ok(())
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_malformed_json_appends_nothing() {
    let install = Installation::new().await;
    let source = install.source("people.json", r#"[{"id": 1, "name": "a"}, {"id": "#);

    let request = LoadRequest::new("people", source).unwrap();
    let error = run_load(&install.factory(), &request).await.unwrap_err();

    assert!(matches!(error, AdbLoaderError::Parse { .. }));
    assert_eq!(error.exit_code(), 8);
    assert!(install.rows().await.is_empty());
}

/// Batch 2 of 3 fails coercion: batch 1 stays, batch 3 never runs
#[tokio::test]
async fn test_failed_batch_keeps_earlier_batches() {
    let install = Installation::new().await;
    let source = install.source(
        "people.csv",
        "id,name\n1,a\n2,b\nthree,c\n4,d\n5,e\n6,f\n",
    );

    let request = LoadRequest::new("people", source)
        .unwrap()
        .with_load_config(LoadConfig::default().with_batch_size(2));
    let error = run_load(&install.factory(), &request).await.unwrap_err();

    match &error {
        AdbLoaderError::Load {
            batch,
            rows_committed,
            context,
            ..
        } => {
            assert_eq!(*batch, 2);
            assert_eq!(*rows_committed, 2);
            assert!(context.contains("record 3"));
        }
        other => panic!("expected a load error, got {other:?}"),
    }
    let ids: Vec<i64> = install.rows().await.into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_constraint_violation_is_load_error() {
    let install = Installation::new().await;
    let source = install.source("people.csv", "id,name\n,nobody\n");

    let request = LoadRequest::new("people", source).unwrap();
    let error = run_load(&install.factory(), &request).await.unwrap_err();

    assert_eq!(error.failed_batch(), Some(1));
    assert!(install.rows().await.is_empty());
}

#[tokio::test]
async fn test_unknown_source_column_is_mapping_error() {
    let install = Installation::new().await;
    let source = install.source("people.csv", "id,email\n1,a@example.com\n");

    let request = LoadRequest::new("people", source).unwrap();
    let error = run_load(&install.factory(), &request).await.unwrap_err();

    assert!(matches!(error, AdbLoaderError::Mapping { .. }));
    assert!(install.rows().await.is_empty());
}

#[tokio::test]
async fn test_missing_table_is_schema_lookup_error() {
    let install = Installation::new().await;
    let source = install.source("people.csv", "id\n1\n");

    let request = LoadRequest::new("staff", source).unwrap();
    let error = run_load(&install.factory(), &request).await.unwrap_err();
    assert_eq!(error.exit_code(), 7);
}

#[tokio::test]
async fn test_missing_vault_record_is_setup_error() {
    let install = Installation::new().await;
    std::fs::remove_file(install.vault().keys().paths().record()).unwrap();
    let source = install.source("people.csv", "id\n1\n");

    let request = LoadRequest::new("people", source).unwrap();
    let error = run_load(&install.factory(), &request).await.unwrap_err();

    assert!(matches!(error, AdbLoaderError::Setup { .. }));
    assert!(error.to_string().contains("adbloader configure"));
}
