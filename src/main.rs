use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;
use cli_style::get_styles;

use vinyl_bins::change_log::{ChangeLogEntry, ChangeLogFilter, ChangeType};
use vinyl_bins::config::{AppConfig, CliConfig, FileConfig};
use vinyl_bins::inventory_store::{RebinOutcome, RecordEdit, STANDARD_MEDIA_TYPE};
use vinyl_bins::{ImportOptions, InventoryManager, NewRecord, SqliteInventoryStore};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH"));

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

fn parse_change_type(s: &str) -> Result<ChangeType> {
    ChangeType::parse(&s.to_ascii_uppercase())
        .with_context(|| format!("Unknown change type '{}', expected add, move or delete", s))
}

#[derive(Parser, Debug)]
#[command(name = "vinyl-bins", version = VERSION, styles = get_styles())]
#[command(about = "Assigns catalogued records to fixed-capacity bins and keeps an audit trail")]
struct CliArgs {
    /// Path to the SQLite inventory database file.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file; its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Number of records a bin holds.
    #[clap(long)]
    pub bin_capacity: Option<usize>,

    /// Trigger recorded for commands run without --trigger.
    #[clap(long)]
    pub default_trigger: Option<String>,

    /// Log filter directive. Defaults to the LOG_LEVEL environment variable, then info.
    #[clap(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            bin_capacity: self.bin_capacity,
            default_trigger: self.default_trigger.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct TriggerArg {
    /// Who or what caused the change, recorded in the change log.
    #[clap(long)]
    trigger: Option<String>,
}

#[derive(Args, Debug)]
struct RecordFields {
    #[clap(long)]
    artist: String,
    #[clap(long)]
    title: String,
    #[clap(long)]
    genre: Option<i64>,
    /// Media type code; 10 (standard) when omitted or 0.
    #[clap(long)]
    media_type: Option<i64>,
    #[clap(long)]
    year: Option<i32>,
    #[clap(long)]
    special: bool,
}

impl RecordFields {
    fn into_new_record(self) -> NewRecord {
        let media_type = match self.media_type {
            None | Some(0) => STANDARD_MEDIA_TYPE,
            Some(code) => code,
        };
        let mut record = NewRecord::new(self.artist, self.title)
            .with_media_type(media_type)
            .with_special(self.special);
        if let Some(genre) = self.genre {
            record = record.with_genre(genre);
        }
        if let Some(year) = self.year {
            record = record.with_year(year);
        }
        record
    }
}

/// Fields accepted by `edit`; any field left out keeps its stored value.
#[derive(Args, Debug)]
struct EditFields {
    #[clap(long)]
    artist: Option<String>,
    #[clap(long)]
    title: Option<String>,
    #[clap(long)]
    genre: Option<i64>,
    /// Media type code; 0 resets it to 10 (standard).
    #[clap(long)]
    media_type: Option<i64>,
    #[clap(long)]
    year: Option<i32>,
    #[clap(long)]
    special: Option<bool>,
}

impl From<EditFields> for RecordEdit {
    fn from(fields: EditFields) -> Self {
        RecordEdit {
            artist: fields.artist,
            title: fields.title,
            genre_code: fields.genre,
            media_type_code: fields.media_type,
            year: fields.year,
            special: fields.special,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Imports records from a CSV file with a header row, then rebins.
    Import {
        #[clap(value_parser = parse_path)]
        csv: PathBuf,
        /// Only process the first N data rows.
        #[clap(long)]
        limit: Option<usize>,
        /// Report what would happen, then roll everything back.
        #[clap(long)]
        dry_run: bool,
        #[command(flatten)]
        trigger: TriggerArg,
    },

    /// Adds a single record, then rebins.
    Add {
        #[command(flatten)]
        fields: RecordFields,
        #[clap(long)]
        dry_run: bool,
        #[command(flatten)]
        trigger: TriggerArg,
    },

    /// Updates the given details of a record, then rebins. Omitted fields are unchanged.
    Edit {
        id: String,
        #[command(flatten)]
        fields: EditFields,
        #[command(flatten)]
        trigger: TriggerArg,
    },

    /// Recomputes every bin placement and logs what changed.
    Rebin {
        #[clap(long)]
        dry_run: bool,
        #[command(flatten)]
        trigger: TriggerArg,
    },

    /// Deletes a record and logs its former placement.
    Delete {
        id: String,
        #[command(flatten)]
        trigger: TriggerArg,
    },

    /// Shows the master key the next new record would get.
    NextKey,

    /// Shows change log entries, newest first.
    Log {
        /// Only entries not yet reviewed.
        #[clap(long)]
        unreviewed: bool,
        /// Only entries of this type (add, move, delete).
        #[clap(long, value_parser = parse_change_type)]
        change_type: Option<ChangeType>,
        /// Only entries for this record.
        #[clap(long)]
        record: Option<String>,
        #[clap(long)]
        limit: Option<usize>,
        #[clap(long)]
        json: bool,
    },

    /// Marks change log entries as reviewed.
    Review {
        #[clap(required_unless_present = "all")]
        ids: Vec<i64>,
        /// Mark every unreviewed entry.
        #[clap(long, conflicts_with = "ids")]
        all: bool,
    },

    /// Shows past rebin runs, newest first.
    Runs {
        #[clap(long, default_value_t = 20)]
        limit: usize,
        #[clap(long)]
        json: bool,
    },

    /// Shows bin occupancy, group headroom and override counts.
    Report {
        #[clap(long)]
        json: bool,
    },
}

fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let filter = match log_level {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid log_level '{}'", directives))?,
        None => EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .with_env_var("LOG_LEVEL")
            .from_env_lossy(),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_entry(entry: &ChangeLogEntry) {
    println!(
        "{:>6}  {}  {:<6}  {}  {} - {}  {}{}",
        entry.id,
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.change_type.as_str(),
        entry.record_id,
        entry.artist,
        entry.title,
        entry.notes,
        if entry.reviewed { "" } else { "  *" }
    );
}

fn print_rebin(outcome: &RebinOutcome) {
    let prefix = if outcome.dry_run { "[dry run] " } else { "" };
    println!(
        "{}Rebinned {} records: {} added, {} moved",
        prefix,
        outcome.records_total,
        outcome.added(),
        outcome.moved()
    );
    if outcome.dry_run {
        outcome.entries.iter().for_each(|e| println!("  {} {}", e.record_id, e.notes));
    }
}

fn run(command: Command, manager: &InventoryManager, config: &AppConfig) -> Result<()> {
    match command {
        Command::Import {
            csv,
            limit,
            dry_run,
            trigger,
        } => {
            let options = ImportOptions {
                trigger: config.trigger_or_default(trigger.trigger),
                limit,
                dry_run,
            };
            let outcome = manager.import_file(&csv, &options)?;
            println!(
                "Rows seen: {}, imported: {}, skipped: {}",
                outcome.stats.rows_seen, outcome.stats.imported, outcome.stats.skipped
            );
            if let Some(rebin) = &outcome.rebin {
                print_rebin(rebin);
            }
        }
        Command::Add {
            fields,
            dry_run,
            trigger,
        } => {
            let trigger = config.trigger_or_default(trigger.trigger);
            let outcome = manager.add_record(fields.into_new_record(), &trigger, dry_run)?;
            for record in &outcome.records {
                println!("{}  {} - {}  {}", record.id, record.artist, record.title, record.bin_code);
            }
            print_rebin(&outcome.rebin);
        }
        Command::Edit {
            id,
            fields,
            trigger,
        } => {
            let trigger = config.trigger_or_default(trigger.trigger);
            let outcome = manager.edit_record_fields(&id, &fields.into(), &trigger)?;
            print_rebin(&outcome);
        }
        Command::Rebin { dry_run, trigger } => {
            let trigger = config.trigger_or_default(trigger.trigger);
            print_rebin(&manager.rebin(&trigger, dry_run)?);
        }
        Command::Delete { id, trigger } => {
            let trigger = config.trigger_or_default(trigger.trigger);
            let entry = manager.delete_record(&id, &trigger)?;
            println!("Deleted {}: {}", entry.record_id, entry.notes);
        }
        Command::NextKey => println!("{}", manager.next_master_key()?),
        Command::Log {
            unreviewed,
            change_type,
            record,
            limit,
            json,
        } => {
            let filter = ChangeLogFilter {
                unreviewed_only: unreviewed,
                change_type,
                record_id: record,
                limit,
            };
            let entries = manager.change_log(&filter)?;
            if json {
                print_json(&entries)?;
            } else {
                entries.iter().for_each(print_entry);
            }
        }
        Command::Review { ids, all } => {
            let updated = if all {
                manager.mark_all_reviewed()?
            } else {
                manager.mark_reviewed(&ids)?
            };
            println!("Marked {} entries as reviewed", updated);
        }
        Command::Runs { limit, json } => {
            let runs = manager.rebin_runs(limit)?;
            if json {
                print_json(&runs)?;
            } else {
                for run in &runs {
                    println!(
                        "{}  {}  {:<16}  {} records, {} added, {} moved",
                        run.id,
                        run.started_at.format("%Y-%m-%d %H:%M:%S"),
                        run.trigger,
                        run.records_total,
                        run.added,
                        run.moved
                    );
                }
            }
        }
        Command::Report { json } => {
            let report = manager.report()?;
            if json {
                print_json(&report)?;
            } else {
                println!("{} records, bin capacity {}", report.records_total, manager.capacity());
                for bin in &report.occupancy {
                    println!(
                        "Bin {:>3}  group {:>2}  {:>3} used  {:>3} free  {} .. {}",
                        bin.bin_number, bin.group_key, bin.count, bin.free_slots, bin.first_item, bin.last_item
                    );
                }
                for group in &report.headroom {
                    println!(
                        "Group {:>2}: {} bins, last bin {} holds {}, {} slots left",
                        group.group_key, group.bins_used, group.last_bin, group.items_in_last_bin, group.remaining
                    );
                }
                for code in &report.overrides {
                    println!("{}: {}", code.bin_code, code.count);
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    init_tracing(config.log_level.as_deref())?;

    let store = SqliteInventoryStore::new(&config.db_path)?;
    let manager = InventoryManager::new(Arc::new(store), config.bin_capacity);

    run(cli_args.command, &manager, &config)
}
