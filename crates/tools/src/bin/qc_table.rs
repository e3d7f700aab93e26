use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use dwiqc_table::{fixed_width, summarize, Cell, GroupTable, GroupTableFile, MetricRecord};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and extend a group QC table")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append one subject's metrics, creating the table if needed
    Append {
        table: PathBuf,

        /// Subject ID (Sub column)
        #[arg(long)]
        subject: String,

        /// Metric as NAME=VALUE; repeatable, kept in the given order
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Print per-metric group statistics
    Summary {
        table: PathBuf,

        /// Also write the statistics as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Parse the table and report its shape and repeated subjects
    Check { table: PathBuf },
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}

/// Numbers given on the command line are stored as numbers, anything else as text.
fn field_value(value: &str) -> Cell {
    match value.trim().parse::<f64>() {
        Ok(v) => Cell::from(v),
        Err(_) => Cell::parse(value),
    }
}

fn load_existing(path: &Path) -> Result<GroupTable> {
    let file = GroupTableFile::new(path);
    if !file.exists() {
        bail!("{} does not exist", path.display());
    }
    Ok(file.load()?)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Append { table, subject, fields } => {
            let mut record = MetricRecord::for_subject(&subject)?;
            for (name, value) in &fields {
                record.insert(name, field_value(value))?;
            }
            let outcome = GroupTableFile::new(&table).append(&record)?;
            println!("{}: {} row(s)", table.display(), outcome.rows);
        }
        Command::Summary { table, json } => {
            let summary = summarize(&load_existing(&table)?);
            print!("{}", fixed_width::render(&summary.to_table()));
            if !summary.repeated_subjects.is_empty() {
                warn!("repeated subjects: {}", summary.repeated_subjects.join(", "));
            }
            if let Some(path) = json {
                let text = serde_json::to_string_pretty(&summary)?;
                fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
                info!("summary written to {}", path.display());
            }
        }
        Command::Check { table } => {
            let loaded = load_existing(&table)?;
            let summary = summarize(&loaded);
            println!(
                "{}: {} row(s), {} column(s)",
                table.display(),
                loaded.len(),
                loaded.columns().len()
            );
            if summary.repeated_subjects.is_empty() {
                println!("no repeated subjects");
            } else {
                println!("repeated subjects: {}", summary.repeated_subjects.join(", "));
            }
        }
    }
    Ok(())
}
