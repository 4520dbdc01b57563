use anyhow::{Context, Result};
use tracing::debug;

use crate::model::Record;
use crate::store::DocumentCollection;

pub const DEFAULT_BATCH_SIZE: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub batches_flushed: u64,
    pub documents_inserted: u64,
}

/// Accumulates mapped records and bulk-inserts them in fixed-size batches.
///
/// Batch N+1 is only started after the insert for batch N has returned, so
/// cross-batch order follows the source file.
pub struct Batcher<'a, C: ?Sized> {
    sink: &'a C,
    batch_size: usize,
    pending: Vec<Record>,
    stats: BatchStats,
}

impl<'a, C> Batcher<'a, C>
where
    C: DocumentCollection + ?Sized,
{
    pub fn new(sink: &'a C, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            sink,
            batch_size,
            pending: Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE)),
            stats: BatchStats::default(),
        }
    }

    pub fn push(&mut self, record: Record) -> Result<()> {
        self.pending.push(record);
        if self.pending.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Flushes the trailing partial batch, if any.
    pub fn finish(mut self) -> Result<BatchStats> {
        if !self.pending.is_empty() {
            self.flush()?;
        }
        Ok(self.stats)
    }

    fn flush(&mut self) -> Result<()> {
        let batch_number = self.stats.batches_flushed + 1;
        self.sink.insert_many(&self.pending).with_context(|| {
            format!(
                "failed to insert batch {batch_number} ({} records) into {}",
                self.pending.len(),
                self.sink.name()
            )
        })?;

        self.stats.batches_flushed = batch_number;
        self.stats.documents_inserted += self.pending.len() as u64;
        debug!(
            batch = batch_number,
            records = self.pending.len(),
            total = self.stats.documents_inserted,
            "flushed batch"
        );
        self.pending.clear();
        Ok(())
    }
}
