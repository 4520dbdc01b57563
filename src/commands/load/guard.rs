use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::store::DocumentCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    AlreadyLoaded { existing: u64 },
}

/// One-shot check run before the source is opened: any existing document
/// means the collection has been loaded before.
pub fn check_collection<C>(collection: &C) -> Result<GuardDecision>
where
    C: DocumentCollection + ?Sized,
{
    let existing = collection
        .count_documents()
        .with_context(|| format!("failed to check whether {} is loaded", collection.name()))?;

    if existing > 0 {
        warn!(
            collection = %collection.name(),
            existing,
            "collection already populated, skipping load"
        );
        return Ok(GuardDecision::AlreadyLoaded { existing });
    }

    info!(collection = %collection.name(), "collection empty, loading");
    Ok(GuardDecision::Proceed)
}
