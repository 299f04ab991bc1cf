//! Property parsers: extract linked entities from stored property values.
//!
//! Each parser knows a set of property-editor aliases. A scanning driver
//! walks content properties, asks the [`ParserRegistry`] which parsers accept
//! the property's editor alias, and feeds them the raw stored value.

pub mod content_picker;
pub mod multi_node_tree_picker;
pub mod udi;

pub use content_picker::ContentPickerParser;
pub use multi_node_tree_picker::MultiNodeTreePickerParser;
pub use udi::DocumentUdiResolver;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::cache::CacheProvider;
use crate::content::ContentService;
use crate::error::Result;

/// A reference to another content item found inside a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedEntity {
    id: i32,
}

impl LinkedEntity {
    pub fn new(id: i32) -> Self {
        Self { id }
    }

    pub fn id(&self) -> i32 {
        self.id
    }
}

/// Trait for property parsers
pub trait PropertyParser: Send + Sync {
    /// Check if this parser understands values produced by the given
    /// property-editor alias. Never matches a missing alias.
    fn is_parser_for(&self, editor_alias: Option<&str>) -> bool;

    /// Extract the linked entities from a raw property value, in value order.
    ///
    /// Missing, null, malformed or unresolvable values yield an empty list.
    /// `Err` only carries failures of the content service.
    fn get_linked_entities(&self, value: Option<&Value>) -> Result<Vec<LinkedEntity>>;
}

/// Explicitly composed set of parsers.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn PropertyParser>>,
}

impl ParserRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Create a registry with the built-in document pickers sharing one
    /// content service and identifier cache
    pub fn with_core_parsers(
        content: Arc<dyn ContentService>,
        cache: Arc<dyn CacheProvider<Option<i32>>>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ContentPickerParser::new(content.clone(), cache.clone())));
        registry.register(Box::new(MultiNodeTreePickerParser::new(content, cache)));
        registry
    }

    /// Add a parser to the registry
    ///
    /// # Arguments
    ///
    /// * `parser` - Parser to consult after those already registered
    pub fn register(&mut self, parser: Box<dyn PropertyParser>) {
        self.parsers.push(parser);
    }

    /// All parsers accepting the given editor alias, in registration order
    pub fn parsers_for<'a>(
        &'a self,
        editor_alias: Option<&'a str>,
    ) -> impl Iterator<Item = &'a dyn PropertyParser> + 'a {
        self.parsers
            .iter()
            .filter(move |p| p.is_parser_for(editor_alias))
            .map(|p| p.as_ref())
    }

    /// Check whether any registered parser accepts the editor alias
    pub fn has_parser_for(&self, editor_alias: Option<&str>) -> bool {
        self.parsers_for(editor_alias).next().is_some()
    }

    /// Run every matching parser over the value and concatenate their output
    ///
    /// # Arguments
    ///
    /// * `editor_alias` - Property-editor alias the value was stored by
    /// * `value` - Raw stored property value
    ///
    /// # Returns
    ///
    /// Linked entities in parser registration order, then value order.
    /// An alias no parser accepts yields an empty list.
    pub fn linked_entities(
        &self,
        editor_alias: Option<&str>,
        value: Option<&Value>,
    ) -> Result<Vec<LinkedEntity>> {
        let mut entities = Vec::new();
        for parser in self.parsers_for(editor_alias) {
            entities.extend(parser.get_linked_entities(value)?);
        }
        Ok(entities)
    }

    /// Get the number of registered parsers
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
