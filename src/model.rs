use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One bibliographic row as persisted in the destination collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub r#pub: String,
    pub title: String,
    pub page: String,
    pub page_count: i64,
    pub author: String,
    pub creator: String,
    pub author_name: String,
    pub ordinal: String,
    pub stream: String,
    pub stream_name: String,
    pub affiliation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source: String,
}

impl Record {
    /// Blank record with a fresh id, load timestamps and the originating file.
    pub fn new(source: &str) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            r#pub: String::new(),
            title: String::new(),
            page: String::new(),
            page_count: 0,
            author: String::new(),
            creator: String::new(),
            author_name: String::new(),
            ordinal: String::new(),
            stream: String::new(),
            stream_name: String::new(),
            affiliation: String::new(),
            created_at: now,
            updated_at: now,
            source: source.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    AlreadyLoaded,
    Loaded,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadPaths {
    pub source_path: String,
    pub db_path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadCounts {
    pub existing_documents: u64,
    pub rows_read: u64,
    pub documents_inserted: u64,
    pub batches_flushed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub report_version: u32,
    pub collection: String,
    pub status: LoadStatus,
    pub started_at: String,
    pub finished_at: String,
    pub source_sha256: Option<String>,
    pub paths: LoadPaths,
    pub counts: LoadCounts,
}
