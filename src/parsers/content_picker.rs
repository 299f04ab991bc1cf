use serde_json::Value;
use std::sync::Arc;

use super::{DocumentUdiResolver, LinkedEntity, PropertyParser};
use crate::cache::CacheProvider;
use crate::content::ContentService;
use crate::error::Result;

/// Legacy content picker alias (stores a bare integer id).
pub const CONTENT_PICKER_ALIAS: &str = "Umbraco.ContentPickerAlias";
/// Newer content picker alias (stores a document UDI).
pub const CONTENT_PICKER2_ALIAS: &str = "Umbraco.ContentPicker2";

/// Parser for single-item content pickers
pub struct ContentPickerParser {
    documents: DocumentUdiResolver,
}

impl ContentPickerParser {
    pub fn new(content: Arc<dyn ContentService>, cache: Arc<dyn CacheProvider<Option<i32>>>) -> Self {
        Self {
            documents: DocumentUdiResolver::new(content, cache),
        }
    }
}

impl PropertyParser for ContentPickerParser {
    fn is_parser_for(&self, editor_alias: Option<&str>) -> bool {
        matches!(editor_alias, Some(CONTENT_PICKER_ALIAS | CONTENT_PICKER2_ALIAS))
    }

    fn get_linked_entities(&self, value: Option<&Value>) -> Result<Vec<LinkedEntity>> {
        let Some(value) = value else {
            return Ok(Vec::new());
        };

        // Null, arrays and objects fall through as "no link"
        Ok(self.documents.linked_entity(value)?.into_iter().collect())
    }
}
