//! SQLite corpus loader.
//!
//! Reads the disaster message table from a SQLite database into a
//! [`MessageCorpus`]. The table layout follows the upstream dataset: four
//! identifier/metadata columns (the second of which is the message text),
//! then one binary column per category. The store is never mutated.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::corpus::MessageCorpus;
use crate::error::{Result, TriageError};

/// Name of the message table in the database.
pub const MESSAGE_TABLE: &str = "disaster_data";

/// Name of the message-text column.
pub const MESSAGE_COLUMN: &str = "message";

/// Leading identifier/metadata columns preceding the category columns.
const METADATA_COLUMNS: usize = 4;

/// Load the message corpus from a SQLite database file.
///
/// Fails if the file, the table, the message column, or the category columns
/// are absent, or if the table holds no rows.
pub fn load_corpus(db_path: &Path) -> Result<MessageCorpus> {
    if !db_path.is_file() {
        return Err(TriageError::corpus(format!(
            "Database not found: {}",
            db_path.display()
        )));
    }

    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let columns = table_columns(&conn)?;

    if columns.is_empty() {
        return Err(TriageError::corpus(format!(
            "Table '{MESSAGE_TABLE}' not found in {}",
            db_path.display()
        )));
    }
    if !columns.iter().any(|c| c == MESSAGE_COLUMN) {
        return Err(TriageError::corpus(format!(
            "Table '{MESSAGE_TABLE}' has no '{MESSAGE_COLUMN}' column"
        )));
    }
    if columns.len() <= METADATA_COLUMNS {
        return Err(TriageError::corpus(format!(
            "Table '{MESSAGE_TABLE}' has {} columns; expected metadata columns followed by at least one category column",
            columns.len()
        )));
    }

    let categories: Vec<String> = columns[METADATA_COLUMNS..].to_vec();
    let select_list: Vec<String> = std::iter::once(MESSAGE_COLUMN.to_string())
        .chain(categories.iter().cloned())
        .map(|c| format!("\"{c}\""))
        .collect();
    let sql = format!(
        "SELECT {} FROM {MESSAGE_TABLE}",
        select_list.join(", ")
    );

    let mut messages = Vec::new();
    let mut labels = Vec::new();

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        let mut label_row = Vec::with_capacity(categories.len());
        for idx in 0..categories.len() {
            // The source data carries occasional stray values above 1;
            // any non-zero value counts as a positive label.
            let value: i64 = row.get(idx + 1)?;
            label_row.push(u8::from(value != 0));
        }
        messages.push(text);
        labels.push(label_row);
    }

    if messages.is_empty() {
        return Err(TriageError::corpus(format!(
            "Table '{MESSAGE_TABLE}' holds no rows"
        )));
    }

    MessageCorpus::new(messages, labels, categories)
}

/// Column names of the message table, in declared order.
fn table_columns(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({MESSAGE_TABLE})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE disaster_data (
                 id INTEGER PRIMARY KEY,
                 message TEXT NOT NULL,
                 original TEXT,
                 genre TEXT,
                 water INTEGER NOT NULL,
                 food INTEGER NOT NULL,
                 shelter INTEGER NOT NULL
             );
             INSERT INTO disaster_data VALUES
                 (1, 'We need water urgently', 'orig', 'direct', 1, 0, 0),
                 (2, 'Food and shelter required', 'orig', 'news', 0, 1, 1),
                 (3, 'Everything is fine here', 'orig', 'social', 0, 0, 0);",
        )
        .unwrap();
    }

    #[test]
    fn test_load_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("messages.db");
        create_test_db(&db_path);

        let corpus = load_corpus(&db_path).unwrap();

        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.categories, vec!["water", "food", "shelter"]);
        assert_eq!(corpus.messages[0], "We need water urgently");
        assert_eq!(corpus.labels[0], vec![1, 0, 0]);
        assert_eq!(corpus.labels[1], vec![0, 1, 1]);
        assert_eq!(corpus.labels[2], vec![0, 0, 0]);
    }

    #[test]
    fn test_category_order_matches_columns() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("messages.db");
        create_test_db(&db_path);

        let corpus = load_corpus(&db_path).unwrap();
        assert_eq!(corpus.category_count(), corpus.labels[0].len());
    }

    #[test]
    fn test_nonzero_labels_coerced_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("messages.db");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE disaster_data (
                 id INTEGER, message TEXT, original TEXT, genre TEXT, related INTEGER
             );
             INSERT INTO disaster_data VALUES (1, 'help', NULL, 'direct', 2);",
        )
        .unwrap();
        drop(conn);

        let corpus = load_corpus(&db_path).unwrap();
        assert_eq!(corpus.labels[0], vec![1]);
    }

    #[test]
    fn test_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_corpus(&dir.path().join("absent.db"));
        assert!(matches!(result, Err(TriageError::Corpus(_))));
    }

    #[test]
    fn test_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("empty.db");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch("CREATE TABLE other (id INTEGER);").unwrap();
        drop(conn);

        let result = load_corpus(&db_path);
        assert!(matches!(result, Err(TriageError::Corpus(_))));
    }

    #[test]
    fn test_too_few_columns() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("narrow.db");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE disaster_data (id INTEGER, message TEXT, original TEXT, genre TEXT);
             INSERT INTO disaster_data VALUES (1, 'hi', NULL, 'direct');",
        )
        .unwrap();
        drop(conn);

        let result = load_corpus(&db_path);
        assert!(matches!(result, Err(TriageError::Corpus(_))));
    }
}
