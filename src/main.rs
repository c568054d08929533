//! TeleLookup — streaming lookup over large flat-file record dumps.
//!
//! Thin binary entry point. All engine logic lives in the
//! `telelookup-core` crate; this host wires a query from the command line
//! into a background scan and prints throttled progress and the final
//! result table.

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use telelookup_core::export;
use telelookup_core::model::{Query, Record};
use telelookup_core::monitor::ActivityHandle;
use telelookup_core::scanner::{start_scan, ScanUpdate, SearchConfig};

#[derive(Parser, Debug)]
#[command(name = "telelookup", version, about)]
struct Args {
    /// Path to the dump file (first line is a header and is skipped).
    file: PathBuf,

    /// Full or partial identifier to match (case-sensitive substring).
    #[arg(long, default_value = "")]
    id: String,

    /// Full or partial username to match (case-insensitive substring).
    #[arg(long, default_value = "")]
    username: String,

    /// Full or partial phone number to match (case-sensitive substring).
    #[arg(long, default_value = "")]
    phone: String,

    /// Lines per processing batch.
    #[arg(long, default_value_t = telelookup_core::scanner::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Recount the file's lines instead of using the session cache.
    #[arg(long)]
    no_line_cache: bool,

    /// Write the final result set to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the final result set as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let query = Query::new(&args.id, &args.username, &args.phone);
    let config = SearchConfig {
        chunk_size: args.chunk_size,
        cache_line_count: !args.no_line_cache,
        ..SearchConfig::default()
    };

    let activity = ActivityHandle::new();
    let handle = start_scan(args.file, query, config, Some(activity));

    let records = loop {
        let update = handle
            .updates
            .recv()
            .context("scan thread exited without a terminal update")?;
        match update {
            ScanUpdate::Progress(snapshot) => {
                eprintln!(
                    "Progress: {}%  Elapsed: {:.1}s  Found: {}",
                    snapshot.percent,
                    snapshot.elapsed.as_secs_f64(),
                    snapshot.found
                );
            }
            ScanUpdate::Completed {
                records, elapsed, ..
            } => {
                eprintln!(
                    "Done in {:.1}s — {} record(s) found",
                    elapsed.as_secs_f64(),
                    records.len()
                );
                break records;
            }
            ScanUpdate::Cancelled {
                records, elapsed, ..
            } => {
                eprintln!(
                    "Stopped after {:.1}s — {} record(s) found so far",
                    elapsed.as_secs_f64(),
                    records.len()
                );
                break records;
            }
            ScanUpdate::Failed { error, records } => {
                eprintln!(
                    "Scan failed: {error} — surfacing {} partial record(s)",
                    records.len()
                );
                break records;
            }
        }
    };

    if let Some(csv_path) = &args.csv {
        let file = File::create(csv_path)
            .with_context(|| format!("cannot create {}", csv_path.display()))?;
        export::write_csv(&records, file)
            .with_context(|| format!("cannot write {}", csv_path.display()))?;
        eprintln!("Wrote {} row(s) to {}", records.len(), csv_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_table(&records);
    }

    Ok(())
}

/// Print results as a fixed-width table on stdout.
fn print_table(records: &[Record]) {
    if records.is_empty() {
        println!("No results found");
        return;
    }
    println!("{:<14} {:<32} {}", "ID", "USERNAME", "PHONE");
    for record in records {
        println!(
            "{:<14} {:<32} {}",
            record.identifier, record.username, record.phone
        );
    }
}
