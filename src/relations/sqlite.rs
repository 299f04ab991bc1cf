use rusqlite::{params, Connection, Row};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{RelationRecord, RelationService};
use crate::content::parse_timestamp;
use crate::db::Db;
use crate::error::{NexuError, Result};

/// Read-only [`RelationService`] over the `relations` table.
pub struct SqliteRelationService {
    conn: Mutex<Connection>,
}

impl SqliteRelationService {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(db: &Db) -> Result<Self> {
        Ok(Self::new(db.open_connection()?))
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Relations where `column = id`, optionally filtered by type, oldest first
    fn query_by(&self, column: &str, id: i32, relation_type_alias: Option<&str>) -> Result<Vec<RelationRecord>> {
        let conn = self.conn();
        let query = format!(
            "SELECT id, parent_id, child_id, relation_type_alias, comment, create_date \
             FROM relations \
             WHERE {} = ?1 AND (?2 IS NULL OR relation_type_alias = ?2) \
             ORDER BY id",
            column
        );
        let mut stmt = conn.prepare(&query).map_err(NexuError::Database)?;
        let rows = stmt
            .query_map(params![id, relation_type_alias], row_to_relation)
            .map_err(NexuError::Database)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(NexuError::Database)?);
        }
        Ok(out)
    }
}

fn row_to_relation(row: &Row<'_>) -> rusqlite::Result<RelationRecord> {
    let created: Option<String> = row.get(5)?;
    Ok(RelationRecord {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        child_id: row.get(2)?,
        relation_type_alias: row.get(3)?,
        comment: row.get(4)?,
        created_at: created.as_deref().and_then(parse_timestamp),
    })
}

impl RelationService for SqliteRelationService {
    fn get_by_child_id(&self, child_id: i32, relation_type_alias: Option<&str>) -> Result<Vec<RelationRecord>> {
        self.query_by("child_id", child_id, relation_type_alias)
    }

    fn get_by_parent_id(&self, parent_id: i32, relation_type_alias: Option<&str>) -> Result<Vec<RelationRecord>> {
        self.query_by("parent_id", parent_id, relation_type_alias)
    }
}
