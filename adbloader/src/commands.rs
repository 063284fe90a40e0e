//! Subcommand handlers.
//!
//! Handlers return `anyhow::Result` so each layer can add context; the
//! process exit status comes from the first [`AdbLoaderError`] found in the
//! error chain (see [`exit_code`]).

use crate::cli::{
    Cli, Command, ConfigureArgs, DescribeArgs, GlobalArgs, KeygenArgs, LoadArgs, SessionArgs,
};
use crate::prompt::{Prompt, TerminalPrompt, confirmed_secret, required_line};
use adbloader_core::adapters::{ConnectionFactory, LoadConfig, TargetDirectory};
use adbloader_core::error::redact_database_url;
use adbloader_core::pipeline::describe_table;
use adbloader_core::security::{CredentialVault, KeyConfig, KeyManager, KeyStatus, VaultPaths};
use adbloader_core::validation::validate_alias;
use adbloader_core::{
    AdbLoaderError, Environment, LoadRequest, Preflight, ReaderConfig, run_load,
};
use anyhow::Context as _;
use std::time::Duration;
use tracing::{info, warn};

/// Exit status for errors that carry no typed cause.
pub const GENERIC_EXIT_CODE: u8 = 1;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Context {
    pub vault_paths: VaultPaths,
    pub environment: Environment,
    /// Suppresses result output on stdout
    pub quiet: bool,
}

impl Context {
    /// Builds the context from global flags and the process environment.
    pub fn from_global(global: &GlobalArgs) -> adbloader_core::Result<Self> {
        let vault_paths = match &global.vault_dir {
            Some(dir) => VaultPaths::new(dir),
            None => VaultPaths::default_location()?,
        };
        Ok(Self {
            vault_paths,
            environment: Environment::from_env(),
            quiet: global.quiet,
        })
    }

    fn vault(&self) -> CredentialVault {
        CredentialVault::new(KeyManager::new(
            self.vault_paths.clone(),
            KeyConfig::default(),
        ))
    }

    fn preflight(&self, session: &SessionArgs) -> adbloader_core::Result<Preflight> {
        let mut environment = self.environment.clone();
        if let Some(nls_lang) = &session.nls_lang {
            environment = environment.with_nls_lang(nls_lang);
        }
        environment.check()
    }

    fn factory(
        &self,
        vault: CredentialVault,
        preflight: Preflight,
        session: &SessionArgs,
    ) -> adbloader_core::Result<ConnectionFactory> {
        let targets = TargetDirectory::load(&preflight.config_dir)?;
        Ok(ConnectionFactory::new(vault, targets)
            .with_locale(preflight.locale)
            .with_connect_timeout(Duration::from_secs(session.connect_timeout)))
    }

    fn say(&self, line: impl std::fmt::Display) {
        if !self.quiet {
            println!("{}", line);
        }
    }
}

/// Dispatches a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::from_global(&cli.global)?;
    let mut prompt = TerminalPrompt;
    match cli.command {
        Command::Load(args) => load(&ctx, &args, &mut prompt).await,
        Command::Configure(args) => configure(&ctx, &args, &mut prompt),
        Command::Keygen(args) => keygen(&ctx, &args),
        Command::Check => check(&ctx),
        Command::Describe(args) => describe(&ctx, &args).await,
    }
}

/// Maps an error chain to the process exit status.
pub fn exit_code(error: &anyhow::Error) -> u8 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<AdbLoaderError>())
        .map_or(GENERIC_EXIT_CODE, AdbLoaderError::exit_code)
}

/// Loads one data file.
///
/// Runs the first-time setup when no vault record exists yet.
pub async fn load(ctx: &Context, args: &LoadArgs, prompt: &mut dyn Prompt) -> anyhow::Result<()> {
    let request = build_request(args)?;
    let preflight = ctx.preflight(&args.session)?;

    let vault = ctx.vault();
    vault.keys().ensure_key_pair()?;
    if !vault.exists() {
        info!("No stored credentials yet; starting first-time configuration");
        store_credentials(&vault, None, None, prompt, Some(&preflight))?;
    }

    let factory = ctx.factory(vault, preflight, &args.session)?;
    let target = display_target(args.schema.as_deref(), &args.table);
    let summary = run_load(&factory, &request)
        .await
        .with_context(|| format!("Loading {} into {} failed", args.data.display(), target))?;

    ctx.say(format!(
        "Loaded {} rows into {} in {} batch(es)",
        summary.rows, target, summary.batches
    ));
    Ok(())
}

fn build_request(args: &LoadArgs) -> adbloader_core::Result<LoadRequest> {
    let mut request = LoadRequest::new(&args.table, &args.data)?;
    if let Some(schema) = &args.schema {
        request = request.with_schema(schema);
    }
    if let Some(format) = args.format {
        request = request.with_format(format);
    }
    if let Some(delimiter) = args.delimiter {
        let byte = u8::try_from(delimiter).ok().filter(u8::is_ascii).ok_or_else(|| {
            AdbLoaderError::configuration(format!(
                "delimiter '{}' must be a single ASCII character",
                delimiter
            ))
        })?;
        request = request.with_reader_config(ReaderConfig::new().with_delimiter(byte));
    }
    request = request.with_load_config(
        LoadConfig::default()
            .with_batch_size(args.batch_size)
            .with_case_insensitive_columns(!args.exact_columns),
    );
    request.validate()?;
    Ok(request)
}

/// Stores the username, password and target alias.
pub fn configure(
    ctx: &Context,
    args: &ConfigureArgs,
    prompt: &mut dyn Prompt,
) -> anyhow::Result<()> {
    let vault = ctx.vault().with_padding(args.padding);
    vault.keys().ensure_key_pair()?;

    // Configuration does not require a complete environment
    let preflight = ctx.environment.check().ok();
    let (user, alias) = store_credentials(
        &vault,
        args.user.as_deref(),
        args.alias.as_deref(),
        prompt,
        preflight.as_ref(),
    )?;

    ctx.say(format!(
        "Stored credentials for '{}' targeting '{}' in {}",
        user,
        alias,
        vault.keys().paths().record().display()
    ));
    Ok(())
}

fn store_credentials(
    vault: &CredentialVault,
    user: Option<&str>,
    alias: Option<&str>,
    prompt: &mut dyn Prompt,
    preflight: Option<&Preflight>,
) -> adbloader_core::Result<(String, String)> {
    let user = match user {
        Some(user) => user.to_string(),
        None => required_line(prompt, "Username: ")?,
    };
    let secret = confirmed_secret(prompt)?;
    let alias = match alias {
        Some(alias) => alias.to_string(),
        None => required_line(prompt, "Target alias: ")?,
    };
    validate_alias(&alias)?;

    if let Some(preflight) = preflight {
        match TargetDirectory::load(&preflight.config_dir) {
            Ok(targets) if targets.resolve(&alias).is_err() => warn!(
                "Alias '{}' is not defined in {}; loads will fail until it is added",
                alias,
                preflight.targets_file.display()
            ),
            Ok(_) => {}
            Err(e) => warn!("Could not read target aliases: {}", e),
        }
    }

    vault.store(&user, &secret, &alias)?;
    Ok((user, alias))
}

/// Ensures the key pair exists.
pub fn keygen(ctx: &Context, args: &KeygenArgs) -> anyhow::Result<()> {
    let keys = KeyManager::new(
        ctx.vault_paths.clone(),
        KeyConfig::default()
            .with_bits(args.bits)
            .with_format(args.key_format),
    );
    let dir = keys.paths().dir().display();
    match keys.ensure_key_pair().context("Key pair setup failed")? {
        KeyStatus::Generated => ctx.say(format!("Generated key pair in {}", dir)),
        KeyStatus::Existing => ctx.say(format!("Key pair already present in {}", dir)),
    }
    Ok(())
}

/// Reports every setup item and fails with the first problem found.
pub fn check(ctx: &Context) -> anyhow::Result<()> {
    let mut first_error: Option<AdbLoaderError> = None;
    let mut record_failure = |error: AdbLoaderError| {
        first_error.get_or_insert(error);
    };

    let preflight = match ctx.environment.check() {
        Ok(preflight) => {
            ctx.say(format!("[ok]   client home     {}", preflight.client_home.display()));
            ctx.say(format!("[ok]   config dir      {}", preflight.config_dir.display()));
            ctx.say(format!("[ok]   session locale  {}", preflight.locale));
            Some(preflight)
        }
        Err(e) => {
            ctx.say(format!("[fail] environment     {}", first_line(&e)));
            record_failure(e);
            None
        }
    };

    let vault = ctx.vault();
    let paths = vault.keys().paths();
    if vault.keys().exists() {
        ctx.say(format!("[ok]   key pair        {}", paths.dir().display()));
    } else {
        ctx.say(format!("[fail] key pair        missing in {}", paths.dir().display()));
        record_failure(AdbLoaderError::setup(
            format!("no key pair in {}", paths.dir().display()),
            "Run `adbloader keygen` to generate one.",
        ));
    }

    let record = match vault.load() {
        Ok(record) => {
            ctx.say(format!(
                "[ok]   credentials     user '{}', target '{}'",
                record.user, record.tns
            ));
            Some(record)
        }
        Err(e) => {
            ctx.say(format!("[fail] credentials     {}", first_line(&e)));
            record_failure(e);
            None
        }
    };

    if let (Some(preflight), Some(record)) = (&preflight, &record) {
        let resolved = TargetDirectory::load(&preflight.config_dir)
            .and_then(|targets| targets.resolve(&record.tns));
        match resolved {
            Ok(url) => ctx.say(format!(
                "[ok]   target          {}",
                redact_database_url(&url)
            )),
            Err(e) => {
                ctx.say(format!("[fail] target          {}", first_line(&e)));
                record_failure(e);
            }
        }
    }

    match first_error {
        Some(error) => Err(error).context("Setup check failed"),
        None => Ok(()),
    }
}

/// Prints the destination column mapping of one table.
pub async fn describe(ctx: &Context, args: &DescribeArgs) -> anyhow::Result<()> {
    let preflight = ctx.preflight(&args.session)?;
    let factory = ctx.factory(ctx.vault(), preflight, &args.session)?;
    let table = describe_table(&factory, args.schema.as_deref(), &args.table)
        .await
        .with_context(|| {
            format!(
                "Describing {} failed",
                display_target(args.schema.as_deref(), &args.table)
            )
        })?;

    ctx.say(table.qualified_name());
    for column in &table.columns {
        ctx.say(format!(
            "{:>4}  {:<30} {:<24} {:<24} {}",
            column.ordinal_position,
            column.name,
            column.native_type,
            column.data_type.to_string(),
            if column.is_nullable { "NULL" } else { "NOT NULL" }
        ));
    }
    Ok(())
}

fn display_target(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", schema, table),
        None => table.to_string(),
    }
}

fn first_line(error: &AdbLoaderError) -> String {
    error.to_string().lines().next().unwrap_or_default().to_string()
}
