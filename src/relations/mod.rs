//! Relation records and their resolution into related documents.
//!
//! A relation is a directed edge `parent -> child` recorded when a parser
//! finds a link from the parent's properties to the child. Resolution walks
//! the edges back to the parents that reference a given item.

mod mapper;
mod resolver;
mod sqlite;

pub use mapper::{DefaultDocumentMapper, RelatedDocumentMapper};
pub use resolver::RelatedDocumentResolver;
pub use sqlite::SqliteRelationService;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A persisted relation edge (read-only here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub id: i32,
    pub parent_id: i32,
    pub child_id: i32,
    pub relation_type_alias: String,
    /// Free text captured when the relation was created, e.g. the property
    /// the link was found in.
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Summary of a content item referencing the item being inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedDocument {
    pub id: i32,
    pub name: String,
    pub content_type_alias: String,
    pub path: String,
    pub published: bool,
    pub updated_at: Option<DateTime<Utc>>,
    /// Comment of the originating relation.
    pub properties: Option<String>,
}

/// Read access to stored relations.
pub trait RelationService: Send + Sync {
    /// Relations pointing at `child_id`, optionally limited to one relation type.
    fn get_by_child_id(&self, child_id: i32, relation_type_alias: Option<&str>) -> Result<Vec<RelationRecord>>;

    /// Relations leaving `parent_id`, optionally limited to one relation type.
    fn get_by_parent_id(&self, parent_id: i32, relation_type_alias: Option<&str>) -> Result<Vec<RelationRecord>>;
}
