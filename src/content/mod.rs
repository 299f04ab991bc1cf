//! Content lookup: the narrow read interface onto the host's content store.

mod sqlite;

pub use sqlite::SqliteContentService;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// A content item as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: i32,
    /// Stable unique identifier, the key inside `umb://document/<key>` tokens.
    pub key: Uuid,
    pub name: String,
    pub content_type_alias: String,
    /// Comma-separated ancestor path, e.g. `-1,1051,1060`.
    pub path: String,
    pub published: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Resolves content ids and unique ids to content records.
///
/// Misses are `Ok(None)` / omitted from batches. `Err` means the store
/// itself failed.
pub trait ContentService: Send + Sync {
    /// Look up a content item by its integer id
    ///
    /// # Arguments
    ///
    /// * `id` - Content id
    ///
    /// # Returns
    ///
    /// Some(record) if the item exists, None otherwise
    fn get_by_id(&self, id: i32) -> Result<Option<ContentRecord>>;

    /// Look up a content item by its unique key
    ///
    /// # Arguments
    ///
    /// * `key` - Unique id, compared by value regardless of how it is stored
    ///
    /// # Returns
    ///
    /// Some(record) if the item exists, None otherwise
    fn get_by_key(&self, key: Uuid) -> Result<Option<ContentRecord>>;

    /// Batch lookup in a single round trip
    ///
    /// # Arguments
    ///
    /// * `ids` - Content ids; may contain ids that do not exist
    ///
    /// # Returns
    ///
    /// Records for the ids that exist. Ids that do not exist are skipped.
    fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<ContentRecord>>;
}

/// Parse a stored timestamp: RFC 3339, or SQLite's `CURRENT_TIMESTAMP` format.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
