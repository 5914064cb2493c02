// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

use polyglot::app_config::{Config, LogLevel};
use polyglot::database::{DatabaseConnection, Repository, StoredRecord};
use polyglot::language_utils;
use polyglot::{DeletionOutcome, Translateable};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the configuration file and the database tables
    Init,

    /// Create a record with translated attributes
    Create {
        /// Language of the values (the configured app language by default)
        #[arg(short, long)]
        language: Option<String>,

        /// Attribute value, repeatable
        #[arg(short = 's', long = "set", value_name = "ATTR=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, Value)>,
    },

    /// Show a record's attributes resolved for a language
    Show {
        /// Record id
        id: i64,

        /// Language to resolve for (the configured app language by default)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Change translated attributes of a record
    Set {
        /// Record id
        id: i64,

        /// Language of the values (the configured app language by default)
        #[arg(short, long)]
        language: Option<String>,

        /// Attribute value, repeatable
        #[arg(short = 's', long = "set", value_name = "ATTR=VALUE", value_parser = parse_assignment, required = true)]
        assignments: Vec<(String, Value)>,
    },

    /// Delete a record and its translations
    Delete {
        /// Record id
        id: i64,
    },

    /// Generate shell completions for polyglot
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Polyglot - per-record attribute translation
///
/// Stores translated attributes of records in SQLite, one row per language,
/// and reads them back through the configured fallback chain.
#[derive(Parser, Debug)]
#[command(name = "polyglot")]
#[command(version)]
#[command(about = "Per-record attribute translation with language fallback")]
#[command(long_about = "Polyglot stores translated attributes of records, one row per language, \
and resolves reads through a configurable fallback chain.

EXAMPLES:
    polyglot init                                   # Create config and tables
    polyglot create --set title=Example             # Create a record in the app language
    polyglot set 1 -l de --set title=Beispiel       # Add a German translation
    polyglot show 1 -l de-AT                        # Resolve through the fallback chain
    polyglot delete 1                               # Delete record and translations
    polyglot completions bash > polyglot.bash       # Generate bash completions

VALUES:
    Values that parse as JSON (numbers, true, false, null, quoted strings)
    are stored as such; anything else is stored as text.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "polyglot.json", global = true)]
    config: PathBuf,

    /// Database file (overrides the configuration)
    #[arg(short, long, env = "POLYGLOT_DATABASE", global = true)]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

/// Parse `ATTR=VALUE`
fn parse_assignment(input: &str) -> Result<(String, Value), String> {
    let (attribute, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("expected ATTR=VALUE, got '{}'", input))?;
    if attribute.is_empty() {
        return Err(format!("missing attribute name in '{}'", input));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::from(raw));
    Ok((attribute.to_string(), value))
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is applied once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "polyglot", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config, matches!(cli.command, Commands::Init))?;
    let log_level: LogLevel = match cli.log_level {
        Some(level) => level.into(),
        None => config.log_level.clone(),
    };
    log::set_max_level(log_level.to_level_filter());
    config.validate().context("Configuration validation failed")?;

    let repo = open_repository(&config, cli.database.as_deref())?;
    let base_table = config.database.base_table.clone();
    repo.initialize_schema(&base_table, &config.translateable)?;

    match cli.command {
        Commands::Init => {
            let stats = repo.stats(&base_table, &config.translateable)?;
            info!("Database ready at {:?}", repo.connection().path());
            println!("{}", stats);
        }
        Commands::Create { language, assignments } => {
            let mut record = StoredRecord::new();
            let mut translations = Translateable::new(config.translateable.clone(), repo.clone());
            if let Some(language) = &language {
                translations.set_language(&record, language)?;
            }
            apply_assignments(&mut translations, &record, assignments)?;

            let id = repo.insert_base(&base_table, &mut record)?;
            if !translations.after_insert(&record) {
                warn!("Some translations of record {} could not be saved", id);
            }
            println!("{}", id);
        }
        Commands::Show { id, language } => {
            let record = repo
                .find_base_with_translations(&base_table, &config.translateable, id)?
                .ok_or_else(|| anyhow!("Record {} not found", id))?;
            let mut translations = Translateable::new(config.translateable.clone(), repo.clone());
            translations.after_find(&record)?;
            if let Some(language) = &language {
                translations.set_language(&record, language)?;
            }
            show_record(&mut translations, &record)?;
        }
        Commands::Set { id, language, assignments } => {
            let mut record = find_record(&repo, &base_table, id)?;
            let mut translations = Translateable::new(config.translateable.clone(), repo.clone());
            translations.after_find(&record)?;
            if let Some(language) = &language {
                translations.set_language(&record, language)?;
            }
            apply_assignments(&mut translations, &record, assignments)?;

            repo.update_base(&base_table, &mut record)?;
            if !translations.after_update(&record) {
                bail!("Some translations of record {} could not be saved", id);
            }
        }
        Commands::Delete { id } => {
            let record = find_record(&repo, &base_table, id)?;
            let mut translations = Translateable::new(config.translateable.clone(), repo.clone());

            if let DeletionOutcome::Vetoed { translations: remaining } = translations.before_delete(&record)? {
                bail!(
                    "Record {} still has {} translations; delete all but one first",
                    id,
                    remaining
                );
            }
            repo.delete_base(&base_table, &record)?;
            translations.after_delete(&record)?;
            info!("Deleted record {}", id);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn load_config(path: &Path, create_missing: bool) -> Result<Config> {
    if path.exists() {
        return Config::from_file(path);
    }

    let config = Config::default();
    if create_missing {
        warn!("Config file not found at '{}', creating default config.", path.display());
        config.save(path)?;
    }
    Ok(config)
}

fn open_repository(config: &Config, database: Option<&Path>) -> Result<Repository> {
    match database.or(config.database.path.as_deref()) {
        Some(path) => Ok(Repository::new(DatabaseConnection::new(path)?)),
        None => Repository::new_default(),
    }
}

fn find_record(repo: &Repository, base_table: &str, id: i64) -> Result<StoredRecord> {
    repo.find_base(base_table, id)?
        .ok_or_else(|| anyhow!("Record {} not found", id))
}

fn apply_assignments(
    translations: &mut Translateable<Repository>,
    record: &StoredRecord,
    assignments: Vec<(String, Value)>,
) -> Result<()> {
    for (attribute, value) in assignments {
        if !translations.set(record, &attribute, value)? {
            bail!("'{}' is not a translatable attribute", attribute);
        }
    }
    Ok(())
}

fn show_record(translations: &mut Translateable<Repository>, record: &StoredRecord) -> Result<()> {
    let language = translations.language();
    println!("Record {} ({})", record.id.unwrap_or_default(), describe_language(&language));

    let attributes = translations.config().translation_attributes.clone();
    for attribute in attributes {
        let (value, source) = translations.resolve_attribute(record, &attribute, &language)?;
        println!("  {}: {} [{}]", attribute, value, describe_language(&source));
    }
    println!("  fallback translation: {}", translations.is_fallback_translation(record)?);
    Ok(())
}

/// Language tag with its English name when the tag is a known ISO code
fn describe_language(tag: &str) -> String {
    match language_utils::language_name(tag) {
        Some(name) => format!("{} {}", tag, name),
        None => tag.to_string(),
    }
}
