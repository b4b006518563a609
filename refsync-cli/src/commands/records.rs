//! `refsync records list` and `refsync records add <id>`

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{ArgGroup, Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use refsync_core::{FileRecordStore, Record, RecordId, RecordStatus, RecordStore};

use super::super::StatusArg;

/// Inspect or seed stored records.
#[derive(Subcommand, Debug)]
pub enum RecordsCommand {
    /// List stored records, newest first.
    List(ListArgs),

    /// Store a new record.
    Add(AddArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show records with this status: published | unpublished.
    #[arg(long)]
    pub status: Option<StatusArg>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("reference").required(true).args(["channel", "category"])))]
pub struct AddArgs {
    /// Record id (ASCII letters, digits, '-' and '_').
    pub id: String,

    /// Channel reference, e.g. "News (id: 3f2a-09bc)".
    #[arg(long)]
    pub channel: Option<String>,

    /// Category reference, e.g. "Music (id: 77e1)".
    #[arg(long)]
    pub category: Option<String>,

    /// Store the record as unpublished.
    #[arg(long)]
    pub unpublished: bool,
}

pub fn run(cmd: RecordsCommand) -> Result<()> {
    match cmd {
        RecordsCommand::List(args) => list(args),
        RecordsCommand::Add(args) => add(args),
    }
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "field")]
    field: String,
    #[tabled(rename = "reference")]
    reference: String,
    #[tabled(rename = "created")]
    created: String,
}

fn list(args: ListArgs) -> Result<()> {
    let store = FileRecordStore::open().context("could not locate record store")?;
    let mut records = store
        .list_all()
        .with_context(|| format!("failed to read records in {}", store.dir().display()))?;
    if let Some(filter) = args.status {
        records.retain(|r| r.status == filter.0);
    }
    records.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("failed to serialize records JSON")?
        );
        return Ok(());
    }

    if records.is_empty() {
        println!("No records stored.");
        println!("Run: refsync records add <id> --channel \"<name> (id: <identifier>)\"");
        return Ok(());
    }

    let published = records.iter().filter(|r| r.is_published()).count();
    println!(
        "{} records | {} published | {} unpublished",
        records.len(),
        published,
        records.len() - published
    );

    let rows: Vec<RecordRow> = records.iter().map(record_row).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn record_row(record: &Record) -> RecordRow {
    let (field, reference) = match record.reference() {
        Some((kind, value)) => (kind.to_string(), value.to_string()),
        None => ("-".to_string(), "-".to_string()),
    };
    RecordRow {
        id: record.id.to_string(),
        status: status_label(record.status),
        field,
        reference,
        created: record.created.format("%Y-%m-%d %H:%M").to_string(),
    }
}

fn status_label(status: RecordStatus) -> String {
    match status {
        RecordStatus::Published => "■ published".green().to_string(),
        RecordStatus::Unpublished => "■ unpublished".bright_black().to_string(),
    }
}

fn add(args: AddArgs) -> Result<()> {
    let store = FileRecordStore::open().context("could not locate record store")?;
    let id = RecordId::from(args.id);
    if store
        .load(&id)
        .with_context(|| format!("failed to read record '{id}'"))?
        .is_some()
    {
        bail!("record '{id}' already exists");
    }

    let record = Record {
        id: id.clone(),
        status: if args.unpublished {
            RecordStatus::Unpublished
        } else {
            RecordStatus::Published
        },
        created: Utc::now(),
        channel: args.channel,
        category: args.category,
    };

    if let Some((kind, value)) = record.reference() {
        if refsync_sync::parse(value).is_none() {
            println!(
                "! {kind} value does not match \"<name> (id: <identifier>)\"; the next sync will unpublish it"
            );
        }
    }

    store
        .save(&record)
        .with_context(|| format!("failed to save record '{id}'"))?;
    println!("✓ Stored record '{id}' ({})", record.status);
    Ok(())
}
