//! Bulk body compilation for join-aware document stores
//!
//! Turns a list of objects to index and a list of objects (or bare ids) to
//! delete into an ordered list of `index` / `update` / `delete` operations.
//! When the indexed type declares a join field, routing and parent linkage
//! are reconciled with what the store already holds: children route to their
//! parent's shard, and a document that changed parent is deleted from its old
//! location before being reindexed under the new one.

pub mod builder;
mod classifier;
pub mod collaborators;
mod context;
pub mod descriptor;
pub mod errors;
pub mod object;
pub mod types;

pub use builder::BulkBuilder;
pub use collaborators::{DocumentComposer, StoreQueryClient};
pub use descriptor::{IdDerivation, JoinDescriptor, TypeDescriptor};
pub use errors::{BulkError, BulkResult, StoreError};
pub use object::{BulkObject, RawId, Record, id_from_value};
pub use types::{
    BulkOperation, DeleteEntry, Document, IndexEntry, ParentInfo, PartialDocument, StoredDocument,
    UpdateEntry,
};
