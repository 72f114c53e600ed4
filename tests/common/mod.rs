//! Test utilities and fixtures for the bulk builder test suite

use anyhow::{Result, anyhow};
use kodegen_bulk_builder::{
    BulkObject, Document, DocumentComposer, RawId, Record, StoreError, StoreQueryClient,
    StoredDocument,
};
use serde_json::{Map, Value, json};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Route `log` output through the test harness
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Turn a `json!` object into a document
#[allow(dead_code)]
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Wrap a `json!` value as a map or scalar bulk object
#[allow(dead_code)]
pub fn raw<R>(value: Value) -> BulkObject<R> {
    match value {
        Value::Object(map) => BulkObject::Map(map),
        other => BulkObject::Scalar(other),
    }
}

// ---------------------------------------------------------------------------
// Plain records
// ---------------------------------------------------------------------------

/// Record with an optional id and free-form attributes
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: Option<RawId>,
    pub attrs: Map<String, Value>,
}

#[allow(dead_code)]
impl Item {
    pub fn new(id: impl Into<RawId>, attrs: Value) -> Self {
        Self {
            id: Some(id.into()),
            attrs: doc(attrs),
        }
    }

    pub fn without_id(attrs: Value) -> Self {
        Self {
            id: None,
            attrs: doc(attrs),
        }
    }

    pub fn city(id: i64, name: &str, rating: i64) -> BulkObject<Item> {
        BulkObject::Record(Self::new(id, json!({"name": name, "rating": rating})))
    }
}

impl Record for Item {
    fn id(&self) -> Option<RawId> {
        self.id.clone()
    }
}

/// Composes the declared fields out of records and maps
#[allow(dead_code)]
pub struct FieldComposer {
    pub fields: Vec<String>,
}

#[allow(dead_code)]
impl FieldComposer {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl DocumentComposer<Item> for FieldComposer {
    type Crutches = ();

    fn crutches(&self, _objects: &[BulkObject<Item>]) -> Result<()> {
        Ok(())
    }

    fn compose(
        &self,
        object: &BulkObject<Item>,
        _crutches: &(),
        fields: Option<&[String]>,
    ) -> Result<Document> {
        let source = match object {
            BulkObject::Record(item) => &item.attrs,
            BulkObject::Map(map) => map,
            BulkObject::Scalar(value) => return Err(anyhow!("cannot compose scalar {value}")),
        };
        Ok(self
            .fields
            .iter()
            .filter(|field| fields.is_none_or(|only| only.contains(*field)))
            .map(|field| {
                (
                    field.clone(),
                    source.get(field).cloned().unwrap_or(Value::Null),
                )
            })
            .collect())
    }
}

/// Composes `name` from a batch-wide lookup table
#[allow(dead_code)]
#[derive(Default)]
pub struct CrutchComposer {
    pub builds: Cell<usize>,
}

impl DocumentComposer<Item> for CrutchComposer {
    type Crutches = HashMap<String, String>;

    fn crutches(&self, objects: &[BulkObject<Item>]) -> Result<Self::Crutches> {
        self.builds.set(self.builds.get() + 1);
        Ok(objects
            .iter()
            .filter_map(|object| match object {
                BulkObject::Record(item) => item.id.as_ref().map(ToString::to_string),
                _ => None,
            })
            .map(|id| (id.clone(), format!("Name{id}")))
            .collect())
    }

    fn compose(
        &self,
        object: &BulkObject<Item>,
        crutches: &Self::Crutches,
        _fields: Option<&[String]>,
    ) -> Result<Document> {
        let BulkObject::Record(item) = object else {
            return Err(anyhow!("records only"));
        };
        let id = item.id.as_ref().map(ToString::to_string).unwrap_or_default();
        Ok(doc(json!({"name": crutches.get(&id)})))
    }
}

// ---------------------------------------------------------------------------
// Comments with a join relation
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub const JOIN_FIELD: &str = "comment_type";

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: i64,
    /// Whether the record reports its id
    pub has_id: bool,
    pub content: String,
    pub comment_type: Option<String>,
    pub parent: Option<i64>,
    /// Whether composed documents carry the join field
    pub emit_join: bool,
}

#[allow(dead_code)]
impl Comment {
    pub fn new(id: i64, content: &str, comment_type: &str, parent: Option<i64>) -> Self {
        Self {
            id,
            has_id: true,
            content: content.to_string(),
            comment_type: Some(comment_type.to_string()),
            parent,
            emit_join: true,
        }
    }

    pub fn with_parent(mut self, parent: Option<i64>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_type(mut self, comment_type: Option<&str>) -> Self {
        self.comment_type = comment_type.map(str::to_string);
        self
    }

    pub fn without_id(mut self) -> Self {
        self.has_id = false;
        self
    }

    pub fn without_join(mut self) -> Self {
        self.emit_join = false;
        self
    }

    /// Join value as the composer writes it
    pub fn join_value(&self) -> Value {
        match (self.parent, &self.comment_type) {
            (Some(parent), name) => json!({"name": name, "parent": parent}),
            (None, Some(name)) => json!(name),
            (None, None) => Value::Null,
        }
    }

    /// Stored form, routed by parent (or own id for roots)
    pub fn stored(&self) -> StoredDocument {
        StoredDocument {
            id: self.id.to_string(),
            routing: Some(self.parent.unwrap_or(self.id).to_string()),
            join: Some(self.join_value()),
        }
    }

    pub fn object(&self) -> BulkObject<Comment> {
        BulkObject::Record(self.clone())
    }
}

impl Record for Comment {
    fn id(&self) -> Option<RawId> {
        self.has_id.then_some(RawId::Int(self.id))
    }
}

#[allow(dead_code)]
pub struct CommentComposer;

impl DocumentComposer<Comment> for CommentComposer {
    type Crutches = ();

    fn crutches(&self, _objects: &[BulkObject<Comment>]) -> Result<()> {
        Ok(())
    }

    fn compose(
        &self,
        object: &BulkObject<Comment>,
        _crutches: &(),
        fields: Option<&[String]>,
    ) -> Result<Document> {
        let BulkObject::Record(comment) = object else {
            return Err(anyhow!("comments only"));
        };
        let wanted = |field: &str| fields.is_none_or(|only| only.iter().any(|f| f == field));
        let mut document = Document::new();
        if wanted("content") {
            document.insert("content".to_string(), json!(comment.content));
        }
        if comment.emit_join && wanted(JOIN_FIELD) {
            document.insert(JOIN_FIELD.to_string(), comment.join_value());
        }
        Ok(document)
    }
}

/// Question/answer/vote thread used across the join tests
#[allow(dead_code)]
pub fn comments() -> Vec<Comment> {
    vec![
        Comment::new(3, "There!", "answer", Some(1)),
        Comment::new(4, "Yes, he is here.", "vote", Some(2)),
        Comment::new(11, "What is the sense of the universe?", "question", None),
        Comment::new(12, "I don't know.", "answer", Some(11)),
        Comment::new(13, "42", "answer", Some(11)),
        Comment::new(14, "I think that 42 is a correct answer", "vote", Some(13)),
        Comment::new(21, "How are you?", "question", None),
        Comment::new(32, "Ruby", "answer", Some(31)),
    ]
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// In-memory store that records every query it answers
#[allow(dead_code)]
#[derive(Default)]
pub struct InMemoryStore {
    pub documents: Vec<StoredDocument>,
    pub fetch_calls: RefCell<Vec<Vec<String>>>,
    pub routing_calls: RefCell<Vec<String>>,
    pub fail_with: Option<fn() -> StoreError>,
}

#[allow(dead_code)]
impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<StoredDocument>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    pub fn with_comments(comments: &[Comment]) -> Self {
        Self::with_documents(comments.iter().map(Comment::stored).collect())
    }

    pub fn failing(fail_with: fn() -> StoreError) -> Self {
        Self {
            fail_with: Some(fail_with),
            ..Self::default()
        }
    }

    pub fn query_count(&self) -> usize {
        self.fetch_calls.borrow().len() + self.routing_calls.borrow().len()
    }
}

impl StoreQueryClient for InMemoryStore {
    fn fetch_by_ids(
        &self,
        ids: &[String],
        _join_field: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.fetch_calls.borrow_mut().push(ids.to_vec());
        if let Some(fail) = self.fail_with {
            return Err(fail());
        }
        Ok(self
            .documents
            .iter()
            .filter(|doc| ids.contains(&doc.id))
            .cloned()
            .collect())
    }

    fn fetch_routing_by_id(&self, id: &str) -> Result<Option<String>, StoreError> {
        self.routing_calls.borrow_mut().push(id.to_string());
        if let Some(fail) = self.fail_with {
            return Err(fail());
        }
        Ok(self
            .documents
            .iter()
            .find(|doc| doc.id == id)
            .and_then(|doc| doc.routing.clone()))
    }
}
