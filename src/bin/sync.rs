// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-shot sync from the command line.
//!
//! Runs a single pass (full by default, or scoped to one event/location),
//! prints the summary, and exits non-zero if the pass failed or stopped
//! partway.

use beatdown_sync::{
    config::Config,
    db::FirestoreDb,
    services::{SyncReport, SyncScope, SyncService, UpstreamClient},
};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "beatdown-sync-cli")]
#[command(about = "Sync F3 Nation events into the Firestore beatdowns collection", long_about = None)]
struct Args {
    /// Compute changes without writing them
    #[arg(long)]
    dry_run: bool,

    /// Print every changed document and its changed fields
    #[arg(short, long)]
    verbose: bool,

    /// Only sync beatdowns for this upstream event ID
    #[arg(long, conflicts_with = "location")]
    event: Option<i64>,

    /// Only sync beatdowns at this upstream location ID
    #[arg(long)]
    location: Option<i64>,
}

impl Args {
    fn scope(&self) -> SyncScope {
        match (self.event, self.location) {
            (Some(id), _) => SyncScope::Event(id),
            (None, Some(id)) => SyncScope::Location(id),
            (None, None) => SyncScope::Full,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let db = match FirestoreDb::new(&config.gcp_project_id).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = SyncService::new(db, UpstreamClient::new(&config));

    match service.run(args.scope(), args.dry_run).await {
        Ok(report) => {
            print_report(&report, args.verbose);
            if report.complete {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("error: sync failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &SyncReport, verbose: bool) {
    if verbose {
        for change in &report.changes {
            let fields = if change.fields.is_empty() {
                String::new()
            } else {
                format!(" [{}]", change.fields.join(", "))
            };
            let from = change
                .migrated_from
                .as_deref()
                .map(|id| format!(" (from {})", id))
                .unwrap_or_default();
            println!("{:?} {}{}{}", change.kind, change.id, from, fields);
        }
        for skipped in &report.skipped {
            println!("Skipped event {}: {:?}", skipped.event_id, skipped.reason);
        }
        println!();
    }

    let prefix = if report.dry_run { "Would write" } else { "Wrote" };
    println!("Scope:        {}", report.scope);
    println!("Inserted:     {}", report.inserted);
    println!("Updated:      {}", report.updated);
    println!("Migrated:     {}", report.migrated);
    println!("Soft-deleted: {}", report.soft_deleted);
    println!("Unchanged:    {}", report.unchanged);
    println!("Skipped:      {}", report.skipped.len());
    println!("{} {} document(s)", prefix, report.writes());

    if !report.complete {
        println!(
            "Stopped after {}/{} batches: {}",
            report.batches_committed,
            report.batches_total,
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
}
