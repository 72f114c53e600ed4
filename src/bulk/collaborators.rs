//! Seams to the outside world: document composition and store lookups

use super::errors::StoreError;
use super::object::BulkObject;
use super::types::{Document, StoredDocument};

/// Turns objects into field-value documents
pub trait DocumentComposer<R> {
    /// Batch-scoped lookup tables shared by every composition in one compile
    type Crutches;

    /// Precompute crutches for the objects about to be indexed
    fn crutches(&self, objects: &[BulkObject<R>]) -> anyhow::Result<Self::Crutches>;

    /// Compose the document for `object`, restricted to `fields` when given
    fn compose(
        &self,
        object: &BulkObject<R>,
        crutches: &Self::Crutches,
        fields: Option<&[String]>,
    ) -> anyhow::Result<Document>;
}

/// Read access to documents already persisted in the store
pub trait StoreQueryClient {
    /// Fetch id, routing and join value for every stored document in `ids`,
    /// in internal document order. Missing ids are simply absent.
    fn fetch_by_ids(
        &self,
        ids: &[String],
        join_field: &str,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Stored routing of exactly one document
    fn fetch_routing_by_id(&self, id: &str) -> Result<Option<String>, StoreError>;
}
