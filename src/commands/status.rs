use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::store::{DocumentCollection, SqliteCollection};

pub fn run(args: StatusArgs) -> Result<()> {
    info!(db_path = %args.db_path.display(), "status requested");

    match collection_size(&args)? {
        None => {}
        Some(0) => warn!(collection = %args.collection, "collection is empty"),
        Some(documents) => info!(
            collection = %args.collection,
            documents,
            "collection status"
        ),
    }

    Ok(())
}

/// Document count of the collection, or `None` when there is no store yet.
fn collection_size(args: &StatusArgs) -> Result<Option<u64>> {
    if !args.db_path.exists() {
        warn!(path = %args.db_path.display(), "database file missing");
        return Ok(None);
    }

    let collection = SqliteCollection::open_read_only(&args.db_path, &args.collection)?;
    if !collection.has_documents_table()? {
        warn!(path = %args.db_path.display(), "documents table missing");
        return Ok(None);
    }

    Ok(Some(collection.count_documents()?))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rusqlite::Connection;

    use super::*;
    use crate::model::Record;

    fn args(db_path: &Path) -> StatusArgs {
        StatusArgs {
            collection: "dblp_hci_records".to_string(),
            db_path: db_path.to_path_buf(),
        }
    }

    fn journal_mode(db_path: &Path) -> String {
        Connection::open(db_path)
            .unwrap()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn status_leaves_an_unloaded_database_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("store.sqlite");
        Connection::open(&db_path)
            .unwrap()
            .execute_batch("CREATE TABLE unrelated (x INTEGER);")
            .unwrap();

        run(args(&db_path)).unwrap();

        assert_eq!(collection_size(&args(&db_path)).unwrap(), None);
        let tables: i64 = Connection::open(&db_path)
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'documents'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);
        assert_eq!(journal_mode(&db_path), "delete");
    }

    #[test]
    fn status_counts_loaded_documents() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("store.sqlite");
        {
            let collection = SqliteCollection::open(&db_path, "dblp_hci_records").unwrap();
            collection
                .insert_many(&[Record::new("src"), Record::new("src")])
                .unwrap();
        }

        assert_eq!(collection_size(&args(&db_path)).unwrap(), Some(2));
    }

    #[test]
    fn missing_database_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("absent.sqlite");

        run(args(&db_path)).unwrap();

        assert!(!db_path.exists());
    }
}
