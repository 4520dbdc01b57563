use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use super::batch::{Batcher, DEFAULT_BATCH_SIZE};
use super::guard::{GuardDecision, check_collection};
use super::mapper::HeaderMapping;
use super::progress::{DEFAULT_PROGRESS_INTERVAL, ProgressMonitor, RowCounter};
use super::source::{DEFAULT_MAX_LINE_BYTES, LineSource};
use crate::store::DocumentCollection;

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub batch_size: usize,
    pub max_rows: Option<u64>,
    pub max_line_bytes: usize,
    pub progress_interval: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_rows: None,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    AlreadyLoaded {
        existing: u64,
    },
    Loaded {
        rows_read: u64,
        documents_inserted: u64,
        batches_flushed: u64,
    },
}

/// Loads `source_path` into `collection` unless the collection already holds
/// documents. Any read or insert failure aborts the run; batches flushed
/// before the failure stay in the store.
pub fn load_file<C>(collection: &C, source_path: &Path, options: &LoadOptions) -> Result<LoadOutcome>
where
    C: DocumentCollection + ?Sized,
{
    load_file_with_progress(collection, source_path, options, |processed| {
        info!(processed, "rows processed");
    })
}

/// Same as [`load_file`], handing every progress tick to `report`.
pub fn load_file_with_progress<C, F>(
    collection: &C,
    source_path: &Path,
    options: &LoadOptions,
    report: F,
) -> Result<LoadOutcome>
where
    C: DocumentCollection + ?Sized,
    F: FnMut(u64) + Send + 'static,
{
    if let GuardDecision::AlreadyLoaded { existing } = check_collection(collection)? {
        return Ok(LoadOutcome::AlreadyLoaded { existing });
    }

    let mut lines = LineSource::open(source_path, options.max_line_bytes)?;
    let source = source_path.display().to_string();
    info!(path = %source, "parsing source");

    let counter = RowCounter::new();
    let monitor = ProgressMonitor::spawn(counter.clone(), options.progress_interval, report)
        .context("failed to start progress monitor")?;

    let mapping = match lines.next() {
        Some(header) => {
            let header = header.with_context(|| format!("failed to read header of {source}"))?;
            let mapping = HeaderMapping::from_header_line(&header);
            info!(
                columns = ?mapping.columns(),
                recognized = mapping.recognized_count(),
                "read header"
            );
            Some(mapping)
        }
        None => None,
    };

    let mut rows_read = 0_u64;
    let mut batcher = Batcher::new(collection, options.batch_size);
    if let Some(mapping) = mapping {
        for line in lines {
            if options.max_rows.is_some_and(|max| rows_read >= max) {
                break;
            }
            let line = line.with_context(|| format!("failed to read {source}"))?;
            batcher.push(mapping.map_line(&line, &source))?;
            rows_read += 1;
            counter.publish(rows_read);
        }
    }
    let stats = batcher.finish()?;
    monitor.stop();

    info!(
        collection = %collection.name(),
        rows = rows_read,
        inserted = stats.documents_inserted,
        batches = stats.batches_flushed,
        "load finished"
    );

    Ok(LoadOutcome::Loaded {
        rows_read,
        documents_inserted: stats.documents_inserted,
        batches_flushed: stats.batches_flushed,
    })
}
