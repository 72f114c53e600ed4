//! Common types used across the bulk module
//!
//! Operation descriptors serialize to the generic bulk shape
//! `{"index": {"_id": .., "_routing": .., "data": ..}}`. Absent options are
//! omitted: no `_id` means the store assigns one, no `_routing` means the
//! document routes by its own id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field-value document produced by a document composer
pub type Document = Map<String, Value>;

/// One unit of work within a bulk write request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOperation {
    Index(IndexEntry),
    Update(UpdateEntry),
    Delete(DeleteEntry),
}

impl BulkOperation {
    /// Document id targeted by this operation, if any
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            BulkOperation::Index(entry) => entry.id.as_deref(),
            BulkOperation::Update(entry) => Some(&entry.id),
            BulkOperation::Delete(entry) => Some(&entry.id),
        }
    }

    /// Routing token carried by this operation, if any
    #[must_use]
    pub fn routing(&self) -> Option<&str> {
        match self {
            BulkOperation::Index(entry) => entry.routing.as_deref(),
            BulkOperation::Update(entry) => entry.routing.as_deref(),
            BulkOperation::Delete(entry) => entry.routing.as_deref(),
        }
    }

    /// Operation kind as it appears on the wire
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            BulkOperation::Index(_) => "index",
            BulkOperation::Update(_) => "update",
            BulkOperation::Delete(_) => "delete",
        }
    }
}

/// Full document (re)index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_routing", default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
    pub data: Document,
}

/// Partial document update restricted to the requested fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_routing", default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
    pub data: PartialDocument,
}

/// Update payload wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialDocument {
    pub doc: Document,
}

/// Document removal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteEntry {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_routing", default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Routing and parent linkage of a document already persisted in the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentInfo {
    pub routing: Option<String>,
    pub parent_id: Option<String>,
}

/// Row returned by a batched id lookup against the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub routing: Option<String>,
    /// Stored value of the join field: a relation name for roots, or
    /// `{"name": .., "parent": ..}` for children
    pub join: Option<Value>,
}
