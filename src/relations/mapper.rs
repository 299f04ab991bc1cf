use super::RelatedDocument;
use crate::content::ContentRecord;

/// Content-to-view mapping used by the resolver.
///
/// Implementations must return one document per record, in record order.
pub trait RelatedDocumentMapper: Send + Sync {
    fn map(&self, records: &[ContentRecord]) -> Vec<RelatedDocument>;
}

/// Copies the core content fields; `properties` starts out empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDocumentMapper;

impl RelatedDocumentMapper for DefaultDocumentMapper {
    fn map(&self, records: &[ContentRecord]) -> Vec<RelatedDocument> {
        records
            .iter()
            .map(|record| RelatedDocument {
                id: record.id,
                name: record.name.clone(),
                content_type_alias: record.content_type_alias.clone(),
                path: record.path.clone(),
                published: record.published,
                updated_at: record.updated_at,
                properties: None,
            })
            .collect()
    }
}
