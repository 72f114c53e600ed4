pub mod bulk;
pub mod config;

pub use bulk::{
    BulkBuilder, BulkError, BulkObject, BulkOperation, BulkResult, DeleteEntry, Document,
    DocumentComposer, IndexEntry, JoinDescriptor, ParentInfo, PartialDocument, RawId, Record,
    StoreError, StoreQueryClient, StoredDocument, TypeDescriptor, UpdateEntry,
};
pub use config::{BulkConfig, BulkConfigBuilder};

/// Compile one batch with the default configuration
///
/// Shorthand for `BulkBuilder::new(..).index(..).delete(..).bulk_body()`.
pub fn bulk_body<R, C, S>(
    descriptor: &TypeDescriptor<R>,
    composer: &C,
    store: &S,
    index: Vec<BulkObject<R>>,
    delete: Vec<BulkObject<R>>,
) -> BulkResult<Vec<BulkOperation>>
where
    R: Record,
    C: DocumentComposer<R>,
    S: StoreQueryClient,
{
    BulkBuilder::new(descriptor, composer, store)
        .index(index)
        .delete(delete)
        .bulk_body()
}
