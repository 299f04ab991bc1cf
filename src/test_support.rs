//! In-memory collaborators shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

use crate::content::{ContentRecord, ContentService};
use crate::error::{NexuError, Result};

/// Content record with a random key.
pub fn content(id: i32, name: &str) -> ContentRecord {
    ContentRecord {
        id,
        key: Uuid::new_v4(),
        name: name.to_string(),
        content_type_alias: "textPage".to_string(),
        path: format!("-1,{}", id),
        published: true,
        updated_at: None,
    }
}

/// Content record with a fixed key (any format `Uuid::parse_str` accepts).
pub fn content_with_key(id: i32, key: &str) -> ContentRecord {
    ContentRecord {
        key: Uuid::parse_str(key).expect("test key must be a valid uuid"),
        ..content(id, &format!("Page {}", id))
    }
}

/// Content service over a fixed list that counts every call.
///
/// Batch lookups return matches in reverse store order so callers cannot rely
/// on input order.
pub struct MockContentService {
    records: Vec<ContentRecord>,
    failing: AtomicBool,
    id_lookups: AtomicUsize,
    key_lookups: AtomicUsize,
    batch_lookups: AtomicUsize,
}

impl MockContentService {
    pub fn new(records: Vec<ContentRecord>) -> Self {
        Self {
            records,
            failing: AtomicBool::new(false),
            id_lookups: AtomicUsize::new(0),
            key_lookups: AtomicUsize::new(0),
            batch_lookups: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn key_lookups(&self) -> usize {
        self.key_lookups.load(Ordering::SeqCst)
    }

    pub fn batch_lookups(&self) -> usize {
        self.batch_lookups.load(Ordering::SeqCst)
    }

    pub fn total_lookups(&self) -> usize {
        self.id_lookups.load(Ordering::SeqCst) + self.key_lookups() + self.batch_lookups()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NexuError::Lookup("content store unavailable".to_string()));
        }
        Ok(())
    }
}

impl ContentService for MockContentService {
    fn get_by_id(&self, id: i32) -> Result<Option<ContentRecord>> {
        self.id_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn get_by_key(&self, key: Uuid) -> Result<Option<ContentRecord>> {
        self.key_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.records.iter().find(|r| r.key == key).cloned())
    }

    fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<ContentRecord>> {
        self.batch_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .records
            .iter()
            .rev()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }
}
