use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{DefaultDocumentMapper, RelatedDocument, RelatedDocumentMapper, RelationRecord};
use crate::content::ContentService;
use crate::error::Result;

/// Resolves relation records to the documents on their parent side.
pub struct RelatedDocumentResolver {
    content: Arc<dyn ContentService>,
    mapper: Arc<dyn RelatedDocumentMapper>,
}

impl RelatedDocumentResolver {
    /// Create a resolver using the default content-to-document mapping
    ///
    /// # Arguments
    ///
    /// * `content` - Service the parent documents are fetched from
    pub fn new(content: Arc<dyn ContentService>) -> Self {
        Self::with_mapper(content, Arc::new(DefaultDocumentMapper))
    }

    pub fn with_mapper(content: Arc<dyn ContentService>, mapper: Arc<dyn RelatedDocumentMapper>) -> Self {
        Self { content, mapper }
    }

    /// Resolve relations to one related document per parent that still exists.
    ///
    /// All parents are fetched with a single batch lookup. The output follows
    /// the order of that lookup, not the order of `relations`. Parents missing
    /// from the store are dropped without error. When several relations share
    /// a parent, the first one's comment is attached.
    ///
    /// # Arguments
    ///
    /// * `relations` - Relation records; None or empty skips the lookup
    ///
    /// # Returns
    ///
    /// The related documents, or the content service's error
    pub fn resolve(&self, relations: Option<&[RelationRecord]>) -> Result<Vec<RelatedDocument>> {
        let relations = match relations {
            Some(relations) if !relations.is_empty() => relations,
            _ => return Ok(Vec::new()),
        };

        let mut seen = HashSet::new();
        let parent_ids: Vec<i32> = relations
            .iter()
            .map(|relation| relation.parent_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let records = self.content.get_by_ids(&parent_ids)?;
        let mut documents = self.mapper.map(&records);

        let mut first_by_parent: HashMap<i32, &RelationRecord> = HashMap::with_capacity(parent_ids.len());
        for relation in relations {
            first_by_parent.entry(relation.parent_id).or_insert(relation);
        }

        for document in &mut documents {
            if let Some(relation) = first_by_parent.get(&document.id) {
                document.properties = relation.comment.clone();
            }
        }

        if documents.len() < parent_ids.len() {
            log::debug!(
                "Resolved {} of {} relation parents",
                documents.len(),
                parent_ids.len()
            );
        }

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentRecord;
    use crate::test_support::{content, MockContentService};

    fn relation(parent_id: i32, comment: &str) -> RelationRecord {
        RelationRecord {
            id: parent_id * 10,
            parent_id,
            child_id: 999,
            relation_type_alias: "nexuDocumentToDocument".to_string(),
            comment: Some(comment.to_string()),
            created_at: None,
        }
    }

    fn setup() -> (RelatedDocumentResolver, Arc<MockContentService>) {
        let service = Arc::new(MockContentService::new(vec![
            content(1, "One"),
            content(2, "Two"),
            content(3, "Three"),
        ]));
        (RelatedDocumentResolver::new(service.clone()), service)
    }

    #[test]
    fn test_empty_and_absent_input_skip_lookup() {
        let (resolver, service) = setup();
        assert!(resolver.resolve(None).unwrap().is_empty());
        assert!(resolver.resolve(Some(&[][..])).unwrap().is_empty());
        assert_eq!(service.total_lookups(), 0);
    }

    #[test]
    fn test_comments_matched_by_id() {
        let (resolver, service) = setup();
        let relations = vec![relation(1, "a"), relation(2, "b")];

        let docs = resolver.resolve(Some(relations.as_slice())).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(service.batch_lookups(), 1);

        // The mock returns batches in reverse order
        assert_eq!(docs[0].id, 2);
        for doc in &docs {
            let expected = if doc.id == 1 { "a" } else { "b" };
            assert_eq!(doc.properties.as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_missing_parent_dropped() {
        let (resolver, _) = setup();
        let relations = vec![relation(1, "a"), relation(404, "gone"), relation(3, "c")];

        let docs = resolver.resolve(Some(relations.as_slice())).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.id != 404));
    }

    #[test]
    fn test_first_relation_wins_for_shared_parent() {
        let (resolver, service) = setup();
        let relations = vec![relation(2, "first"), relation(1, "a"), relation(2, "second")];

        let docs = resolver.resolve(Some(relations.as_slice())).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(service.batch_lookups(), 1);
        let two = docs.iter().find(|d| d.id == 2).unwrap();
        assert_eq!(two.properties.as_deref(), Some("first"));
    }

    #[test]
    fn test_relation_without_comment() {
        let (resolver, _) = setup();
        let mut bare = relation(3, "");
        bare.comment = None;

        let docs = resolver.resolve(Some(std::slice::from_ref(&bare))).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].properties, None);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (resolver, _) = setup();
        let relations = vec![relation(3, "c"), relation(1, "a"), relation(5, "none")];

        let first = resolver.resolve(Some(relations.as_slice())).unwrap();
        let second = resolver.resolve(Some(relations.as_slice())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_lookup_failure_propagates() {
        let (resolver, service) = setup();
        service.set_failing(true);
        assert!(resolver.resolve(Some(&[relation(1, "a")][..])).is_err());
    }

    struct StampingMapper;

    impl RelatedDocumentMapper for StampingMapper {
        fn map(&self, records: &[ContentRecord]) -> Vec<RelatedDocument> {
            let mut docs = DefaultDocumentMapper.map(records);
            for doc in &mut docs {
                doc.properties = Some("mapped".to_string());
                // Simulates a mapper producing an id no relation refers to
                doc.id += 100;
            }
            docs
        }
    }

    #[test]
    fn test_unmatched_document_keeps_mapped_comment() {
        let service = Arc::new(MockContentService::new(vec![content(1, "One")]));
        let resolver = RelatedDocumentResolver::with_mapper(service, Arc::new(StampingMapper));

        let docs = resolver.resolve(Some(&[relation(1, "a")][..])).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, 101);
        assert_eq!(docs[0].properties.as_deref(), Some("mapped"));
    }
}
