use serde_json::Value;
use std::sync::Arc;

use super::{DocumentUdiResolver, LinkedEntity, PropertyParser};
use crate::cache::CacheProvider;
use crate::content::ContentService;
use crate::error::Result;

pub const MULTI_NODE_TREE_PICKER_ALIAS: &str = "Umbraco.MultiNodeTreePicker";
pub const MULTI_NODE_TREE_PICKER2_ALIAS: &str = "Umbraco.MultiNodeTreePicker2";

/// Parser for multi-item document pickers.
///
/// Values are a comma-separated list (`"1051,1060"` or
/// `"umb://document/...,umb://document/..."`), a JSON array of such items, or
/// a single integer. Items resolve independently; duplicates are kept.
pub struct MultiNodeTreePickerParser {
    documents: DocumentUdiResolver,
}

impl MultiNodeTreePickerParser {
    pub fn new(content: Arc<dyn ContentService>, cache: Arc<dyn CacheProvider<Option<i32>>>) -> Self {
        Self {
            documents: DocumentUdiResolver::new(content, cache),
        }
    }

    fn collect_items(&self, items: impl IntoIterator<Item = Value>) -> Result<Vec<LinkedEntity>> {
        let mut entities = Vec::new();
        for item in items {
            if let Some(entity) = self.documents.linked_entity(&item)? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }
}

impl PropertyParser for MultiNodeTreePickerParser {
    fn is_parser_for(&self, editor_alias: Option<&str>) -> bool {
        matches!(
            editor_alias,
            Some(MULTI_NODE_TREE_PICKER_ALIAS | MULTI_NODE_TREE_PICKER2_ALIAS)
        )
    }

    fn get_linked_entities(&self, value: Option<&Value>) -> Result<Vec<LinkedEntity>> {
        match value {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(raw)) => self.collect_items(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string())),
            ),
            // Nested arrays and objects inside the list are not picker items
            Some(Value::Array(items)) => self.collect_items(
                items.iter().filter(|item| item.is_string() || item.is_number()).cloned(),
            ),
            Some(other) => Ok(self.documents.linked_entity(other)?.into_iter().collect()),
        }
    }
}
