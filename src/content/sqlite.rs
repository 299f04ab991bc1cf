use rusqlite::types::Type;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::{parse_timestamp, ContentRecord, ContentService};
use crate::db::Db;
use crate::error::Result;

/// SQLite's default bound-parameter ceiling is 999; stay well below it.
const MAX_IDS_PER_QUERY: usize = 500;

const SELECT_CONTENT: &str =
    "SELECT id, unique_id, name, content_type_alias, path, published, update_date FROM content";

/// [`ContentService`] over the `content` table.
pub struct SqliteContentService {
    conn: Mutex<Connection>,
}

impl SqliteContentService {
    /// Wrap an already migrated connection
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open a dedicated connection to `db`
    ///
    /// # Errors
    ///
    /// Returns `NexuError::Database` if the connection or its pragmas fail
    pub fn open(db: &Db) -> Result<Self> {
        Ok(Self::new(db.open_connection()?))
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn row_to_content(row: &Row<'_>) -> rusqlite::Result<ContentRecord> {
    let key: String = row.get(1)?;
    let key = Uuid::parse_str(&key)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let updated: Option<String> = row.get(6)?;

    Ok(ContentRecord {
        id: row.get(0)?,
        key,
        name: row.get(2)?,
        content_type_alias: row.get(3)?,
        path: row.get(4)?,
        published: row.get::<_, i64>(5)? != 0,
        updated_at: updated.as_deref().and_then(parse_timestamp),
    })
}

impl ContentService for SqliteContentService {
    fn get_by_id(&self, id: i32) -> Result<Option<ContentRecord>> {
        let conn = self.conn();
        let record = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_CONTENT), [id], row_to_content)
            .optional()?;
        Ok(record)
    }

    fn get_by_key(&self, key: Uuid) -> Result<Option<ContentRecord>> {
        log::debug!("Looking up content by key {}", key);
        let conn = self.conn();
        // unique_key is the normalised form of unique_id (see migration 002)
        let record = conn
            .query_row(
                &format!("{} WHERE unique_key = ?1", SELECT_CONTENT),
                [key.simple().to_string()],
                row_to_content,
            )
            .optional()?;
        Ok(record)
    }

    fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<ContentRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn();
        let mut records = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let placeholders = chunk.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let query = format!("{} WHERE id IN ({}) ORDER BY id", SELECT_CONTENT, placeholders);
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), row_to_content)?;
            for row in rows {
                records.push(row?);
            }
        }

        log::debug!("Batch content lookup: {} ids, {} found", ids.len(), records.len());
        Ok(records)
    }
}
