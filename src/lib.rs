pub mod config;
pub mod error;
pub mod db;
pub mod cache;
pub mod content;
pub mod parsers;
pub mod relations;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{NexuError, Result};
pub use parsers::{LinkedEntity, ParserRegistry, PropertyParser};
pub use relations::{RelatedDocument, RelatedDocumentResolver, RelationRecord};
