use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::cli::LoadArgs;
use crate::commands::download;
use crate::model::{LoadCounts, LoadPaths, LoadReport, LoadStatus};
use crate::store::SqliteCollection;
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

mod batch;
mod guard;
mod mapper;
mod pipeline;
mod progress;
mod source;

pub use pipeline::{LoadOptions, LoadOutcome, load_file};

pub fn run(args: LoadArgs) -> Result<()> {
    let started_at = now_utc_string();

    info!(
        collection = %args.collection,
        file = %args.file.display(),
        db_path = %args.db_path.display(),
        "starting load"
    );

    if !args.offline {
        download::ensure_source_file(&args.file, &args.endpoint)?;
    }

    let collection = SqliteCollection::open(&args.db_path, &args.collection)?;
    let options = LoadOptions {
        batch_size: args.batch_size,
        max_rows: args.max_rows,
        progress_interval: Duration::from_millis(args.progress_interval_ms.max(1)),
        ..LoadOptions::default()
    };

    let outcome = load_file(&collection, &args.file, &options)?;

    let (status, counts, source_sha256) = match outcome {
        LoadOutcome::AlreadyLoaded { existing } => (
            LoadStatus::AlreadyLoaded,
            LoadCounts {
                existing_documents: existing,
                ..LoadCounts::default()
            },
            None,
        ),
        LoadOutcome::Loaded {
            rows_read,
            documents_inserted,
            batches_flushed,
        } => (
            LoadStatus::Loaded,
            LoadCounts {
                existing_documents: 0,
                rows_read,
                documents_inserted,
                batches_flushed,
            },
            Some(sha256_file(&args.file)?),
        ),
    };

    let report = LoadReport {
        report_version: 1,
        collection: args.collection.clone(),
        status,
        started_at,
        finished_at: now_utc_string(),
        source_sha256,
        paths: LoadPaths {
            source_path: args.file.display().to_string(),
            db_path: args.db_path.display().to_string(),
        },
        counts,
    };

    if let Some(report_path) = &args.report_path {
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote load report");
    }

    info!(
        collection = %report.collection,
        status = ?report.status,
        inserted = report.counts.documents_inserted,
        "load command completed"
    );

    Ok(())
}
