//! Document references as stored by picker editors.
//!
//! Two storage formats exist: the legacy bare integer id (`1051`, or `"1051"`)
//! and the document UDI `umb://document/<32 hex key>`. UDI keys are translated
//! to integer ids through the content service, memoized in the identifier
//! cache including negative results.

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::LinkedEntity;
use crate::cache::{CacheKey, CacheProvider};
use crate::content::ContentService;
use crate::error::Result;

pub const DOCUMENT_UDI_SCHEME: &str = "umb://document";
pub const DOCUMENT_UDI_PREFIX: &str = "umb://document/";

/// Cache namespace for UDI key -> content id resolutions.
pub const DOCUMENT_UDI_CACHE_NAMESPACE: &str = "Nexu_Document_Udi_Cache";

/// Legacy format: a JSON number or a string holding one, within `i32` range.
///
/// Decimals are accepted only when integral (`1051.0`); fractional values and
/// exponent or special-value strings (`1e3`, `NaN`) are not ids.
pub fn parse_content_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(id) => i32::try_from(id).ok(),
            None => n.as_f64().and_then(integral_id),
        },
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i32>().ok().or_else(|| parse_decimal_id(s))
        }
        _ => None,
    }
}

fn parse_decimal_id(s: &str) -> Option<i32> {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    s.parse::<f64>().ok().and_then(integral_id)
}

fn integral_id(n: f64) -> Option<i32> {
    let in_range = n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX);
    (n.fract() == 0.0 && in_range).then_some(n as i32)
}

/// The key part of a document UDI, or `None` when `raw` is not a document UDI.
///
/// Anything starting with the scheme counts as a UDI; the key is what remains
/// after stripping the prefix and may still be malformed.
pub fn document_key(raw: &str) -> Option<&str> {
    if raw.starts_with(DOCUMENT_UDI_SCHEME) {
        Some(raw.trim_start_matches(DOCUMENT_UDI_PREFIX))
    } else {
        None
    }
}

/// Resolves single picker values to linked documents.
pub struct DocumentUdiResolver {
    content: Arc<dyn ContentService>,
    cache: Arc<dyn CacheProvider<Option<i32>>>,
}

impl DocumentUdiResolver {
    pub fn new(content: Arc<dyn ContentService>, cache: Arc<dyn CacheProvider<Option<i32>>>) -> Self {
        Self { content, cache }
    }

    /// Content id for a UDI key, `None` when the key is malformed or unknown.
    pub fn resolve_key(&self, key: &str) -> Result<Option<i32>> {
        let cache_key = CacheKey::new(DOCUMENT_UDI_CACHE_NAMESPACE, key);
        let id = self.cache.get_or_compute(&cache_key, &mut || {
            let Ok(guid) = Uuid::parse_str(key) else {
                log::debug!("Document UDI key {:?} is not a valid identifier", key);
                return Ok(None);
            };
            Ok(self.content.get_by_key(guid)?.map(|content| content.id))
        })?;

        Ok(id.filter(|id| *id > -1))
    }

    /// Interpret one stored value as a document reference.
    pub fn linked_entity(&self, value: &Value) -> Result<Option<LinkedEntity>> {
        if let Some(id) = parse_content_id(value) {
            return Ok(Some(LinkedEntity::new(id)));
        }

        let Value::String(raw) = value else {
            return Ok(None);
        };

        match document_key(raw) {
            Some(key) => Ok(self.resolve_key(key)?.map(LinkedEntity::new)),
            None => Ok(None),
        }
    }
}
