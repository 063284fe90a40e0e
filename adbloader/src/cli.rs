//! Command-line interface definition.

use adbloader_core::adapters::DEFAULT_BATCH_SIZE;
use adbloader_core::security::{DEFAULT_KEY_BITS, KeyFormat, Padding};
use adbloader_core::{LogFormat, SourceFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "adbloader")]
#[command(about = "Load data files into database tables using vaulted credentials")]
#[command(version)]
#[command(arg_required_else_help = true)]
#[command(long_about = "
adbloader - schema-typed bulk loads with a local credential vault

The database password is stored RSA-encrypted in ~/.adb and decrypted only
for the duration of a run. Destination column types are read from the
database catalog on every run and drive the conversion of every value.

SETUP:
  ADB_CLIENT_HOME  database client installation directory
  TNS_ADMIN        directory containing targets.json (alias -> URL)
  NLS_LANG         session locale, default AMERICAN_AMERICA.AL32UTF8

SUPPORTED SOURCES:
  .csv .tsv .json .xls .xlsx .xlsm .xlsb .ods

SUPPORTED DESTINATIONS:
  PostgreSQL (postgres://), MySQL/MariaDB (mysql://), SQLite (sqlite:)

EXAMPLES:
  adbloader configure
  adbloader load -s sales -t orders -d orders.csv
  adbloader load -t orders -d export.txt --format json --batch-size 5000
  adbloader describe -s sales -t orders
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a data file into a table
    Load(LoadArgs),
    /// Store the database username, password and target alias
    Configure(ConfigureArgs),
    /// Generate the vault key pair if it does not exist yet
    Keygen(KeygenArgs),
    /// Report the setup state without connecting
    Check,
    /// Print the column types of a destination table
    Describe(DescribeArgs),
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,

    /// Log line format
    #[arg(long, global = true, default_value_t = LogFormat::Text, help = "Log format: text or json")]
    pub log_format: LogFormat,

    /// Vault directory
    #[arg(
        long,
        global = true,
        env = "ADB_VAULT_DIR",
        value_name = "DIR",
        help = "Directory holding the key pair and vault record (default ~/.adb)"
    )]
    pub vault_dir: Option<PathBuf>,
}

/// Session settings shared by commands that connect.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session locale
    #[arg(
        long,
        env = "NLS_LANG",
        value_name = "LOCALE",
        help = "Session locale as LANGUAGE_TERRITORY.CHARSET"
    )]
    pub nls_lang: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECONDS")]
    pub connect_timeout: u64,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Destination schema (default: the session's current schema)
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Destination table
    #[arg(short, long)]
    pub table: String,

    /// Source data file
    #[arg(short, long, value_name = "FILE")]
    pub data: PathBuf,

    /// Source format, overriding the file extension
    #[arg(long, help = "Source format: csv, tsv, json or excel")]
    pub format: Option<SourceFormat>,

    /// Records per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Field delimiter for delimited files
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Match source columns to table columns by exact name only
    #[arg(long)]
    pub exact_columns: bool,

    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Debug, Args)]
pub struct ConfigureArgs {
    /// Database username (prompted when omitted)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Target alias from targets.json (prompted when omitted)
    #[arg(short, long)]
    pub alias: Option<String>,

    /// Padding used to encrypt the password
    #[arg(long, default_value_t = Padding::Pkcs1v15, help = "Encryption padding: pkcs1v15 or oaep-sha256")]
    pub padding: Padding,
}

#[derive(Debug, Args)]
pub struct KeygenArgs {
    /// RSA modulus size in bits
    #[arg(long, default_value_t = DEFAULT_KEY_BITS)]
    pub bits: usize,

    /// PEM encoding of the key files
    #[arg(long, default_value_t = KeyFormat::Pkcs1, help = "Key file format: pkcs1 or pkcs8")]
    pub key_format: KeyFormat,
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Destination schema (default: the session's current schema)
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Destination table
    #[arg(short, long)]
    pub table: String,

    #[command(flatten)]
    pub session: SessionArgs,
}
