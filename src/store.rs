use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, params};

use crate::model::Record;
use crate::util::ensure_parent_directory;

/// The two store operations the loader depends on.
///
/// A collection is a capability handed to the guard and the batch sink; the
/// loader never reaches for a global connection.
pub trait DocumentCollection {
    fn name(&self) -> &str;

    fn count_documents(&self) -> Result<u64>;

    /// Writes every record or none of them.
    fn insert_many(&self, records: &[Record]) -> Result<()>;
}

pub struct SqliteCollection {
    connection: Connection,
    name: String,
}

impl SqliteCollection {
    pub fn open(db_path: &Path, name: &str) -> Result<Self> {
        ensure_parent_directory(db_path)?;
        let connection = Connection::open(db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        configure_connection(&connection)?;
        Self::from_connection(connection, name)
    }

    /// Opens an existing database without touching its journal mode or schema.
    pub fn open_read_only(db_path: &Path, name: &str) -> Result<Self> {
        let connection = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open {} read-only", db_path.display()))?;
        Ok(Self {
            connection,
            name: name.to_string(),
        })
    }

    pub fn has_documents_table(&self) -> Result<bool> {
        let tables: i64 = self
            .connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'documents'",
                [],
                |row| row.get(0),
            )
            .context("failed to inspect schema")?;
        Ok(tables > 0)
    }

    pub fn from_connection(connection: Connection, name: &str) -> Result<Self> {
        ensure_schema(&connection)?;
        Ok(Self {
            connection,
            name: name.to_string(),
        })
    }
}

impl DocumentCollection for SqliteCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn count_documents(&self) -> Result<u64> {
        let count: i64 = self
            .connection
            .query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                [&self.name],
                |row| row.get(0),
            )
            .with_context(|| format!("failed to count documents in {}", self.name))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn insert_many(&self, records: &[Record]) -> Result<()> {
        let tx = self
            .connection
            .unchecked_transaction()
            .context("failed to begin bulk insert")?;

        {
            let mut statement = tx.prepare_cached(
                "INSERT INTO documents(collection, id, body, created_at) VALUES(?1, ?2, ?3, ?4)",
            )?;
            for record in records {
                let body = serde_json::to_string(record)
                    .with_context(|| format!("failed to serialize record {}", record.id))?;
                statement
                    .execute(params![&self.name, &record.id, body, record.created_at])
                    .with_context(|| format!("failed to insert record {}", record.id))?;
            }
        }

        tx.commit().context("failed to commit bulk insert")?;
        Ok(())
    }
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS documents (
              collection TEXT NOT NULL,
              id TEXT NOT NULL,
              body TEXT NOT NULL,
              created_at TEXT NOT NULL,
              PRIMARY KEY (collection, id)
            );
            ",
        )
        .context("failed to initialize documents table")?;
    Ok(())
}
