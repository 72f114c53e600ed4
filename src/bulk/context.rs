//! Per-call batch context
//!
//! Holds the index and delete lists of one compile call together with every
//! cache filled while compiling them: ids, persisted parent linkage, composer
//! crutches, composed documents, single-id routing lookups and routings
//! resolved through in-batch parents. Each cache is populated at most once;
//! the context is dropped when the call returns.

use super::collaborators::{DocumentComposer, StoreQueryClient};
use super::descriptor::TypeDescriptor;
use super::errors::{BulkError, BulkResult};
use super::object::{BulkObject, Record, id_from_value};
use super::types::{Document, ParentInfo};
use crate::config::BulkConfig;
use ahash::{AHashMap, AHashSet};
use log::{debug, trace, warn};
use once_cell::unsync::OnceCell;
use serde_json::Value;
use std::cell::RefCell;

/// Join value subfield naming the parent document
const PARENT_KEY: &str = "parent";

/// Parent linkage stated by a freshly composed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ComposedParent {
    /// Document does not carry the join field at all
    Unknown,
    /// Root document (relation name only, or explicitly null)
    Root,
    Child(String),
}

impl ComposedParent {
    pub(crate) fn from_document(document: &Document, join_field: &str) -> Self {
        match document.get(join_field) {
            None => Self::Unknown,
            Some(Value::Object(join)) => join
                .get(PARENT_KEY)
                .and_then(id_from_value)
                .map_or(Self::Root, Self::Child),
            Some(_) => Self::Root,
        }
    }

    pub(crate) fn parent_id(&self) -> Option<&str> {
        match self {
            Self::Child(id) => Some(id),
            Self::Unknown | Self::Root => None,
        }
    }
}

/// Where the routing walk goes next from one indexed object
enum Link {
    /// Routing is settled at this object
    Routed(Option<String>),
    /// Follow the parent, indexed at this position of the same batch
    InBatch(usize, String),
}

/// Ids of both lists, computed together on first use
struct BatchIds {
    index: Vec<Option<String>>,
    delete: Vec<Option<String>>,
    /// Reverse of `index`; later duplicates win
    index_positions: AHashMap<String, usize>,
}

pub(crate) struct BatchContext<'a, R, C: DocumentComposer<R>, S> {
    descriptor: &'a TypeDescriptor<R>,
    composer: &'a C,
    store: &'a S,
    config: &'a BulkConfig,
    index: &'a [BulkObject<R>],
    delete: &'a [BulkObject<R>],
    ids: OnceCell<BatchIds>,
    parents: OnceCell<AHashMap<String, ParentInfo>>,
    crutches: OnceCell<C::Crutches>,
    documents: Vec<OnceCell<Document>>,
    stored_routings: RefCell<AHashMap<String, Option<String>>>,
    chained_routings: RefCell<AHashMap<usize, Option<String>>>,
}

impl<'a, R, C, S> BatchContext<'a, R, C, S>
where
    R: Record,
    C: DocumentComposer<R>,
    S: StoreQueryClient,
{
    pub(crate) fn new(
        descriptor: &'a TypeDescriptor<R>,
        composer: &'a C,
        store: &'a S,
        config: &'a BulkConfig,
        index: &'a [BulkObject<R>],
        delete: &'a [BulkObject<R>],
    ) -> Self {
        Self {
            descriptor,
            composer,
            store,
            config,
            index,
            delete,
            ids: OnceCell::new(),
            parents: OnceCell::new(),
            crutches: OnceCell::new(),
            documents: (0..index.len()).map(|_| OnceCell::new()).collect(),
            stored_routings: RefCell::new(AHashMap::new()),
            chained_routings: RefCell::new(AHashMap::new()),
        }
    }

    pub(crate) fn config(&self) -> &BulkConfig {
        self.config
    }

    pub(crate) fn join_field(&self) -> Option<&'a str> {
        self.descriptor.join().map(|join| join.field())
    }

    // ---------------------------------------------------------------
    // Ids
    // ---------------------------------------------------------------

    fn id_of(&self, object: &BulkObject<R>) -> Option<String> {
        let raw = if self.descriptor.has_custom_id() {
            self.descriptor.derive_id(object)
        } else {
            object.accessor_id(self.config.id_keys())
        };
        raw.and_then(|raw| raw.normalize())
    }

    fn ids(&self) -> &BatchIds {
        self.ids.get_or_init(|| {
            let index: Vec<_> = self.index.iter().map(|object| self.id_of(object)).collect();
            let delete = self.delete.iter().map(|object| self.id_of(object)).collect();
            let index_positions = index
                .iter()
                .enumerate()
                .filter_map(|(pos, id)| id.clone().map(|id| (id, pos)))
                .collect();
            BatchIds {
                index,
                delete,
                index_positions,
            }
        })
    }

    pub(crate) fn index_id(&self, pos: usize) -> Option<&str> {
        self.ids().index[pos].as_deref()
    }

    pub(crate) fn delete_id(&self, pos: usize) -> Option<&str> {
        self.ids().delete[pos].as_deref()
    }

    /// Position of the indexed object with this id
    pub(crate) fn index_position(&self, id: &str) -> Option<usize> {
        self.ids().index_positions.get(id).copied()
    }

    pub(crate) fn index_positions(&self) -> impl Iterator<Item = (&str, usize)> {
        self.ids()
            .index_positions
            .iter()
            .map(|(id, pos)| (id.as_str(), *pos))
    }

    // ---------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------

    fn crutches(&self) -> BulkResult<&C::Crutches> {
        self.crutches.get_or_try_init(|| {
            self.composer
                .crutches(self.index)
                .map_err(|e| BulkError::Crutches(e.to_string()))
        })
    }

    fn compose_error(&self, pos: usize, error: &anyhow::Error) -> BulkError {
        BulkError::Compose {
            id: self.index_id(pos).map(str::to_string),
            message: error.to_string(),
        }
    }

    /// Full document of the indexed object at `pos`
    pub(crate) fn document(&self, pos: usize) -> BulkResult<&Document> {
        self.documents[pos].get_or_try_init(|| {
            let crutches = self.crutches()?;
            self.composer
                .compose(&self.index[pos], crutches, None)
                .map_err(|e| self.compose_error(pos, &e))
        })
    }

    /// Document of the indexed object at `pos` restricted to `fields`
    pub(crate) fn partial_document(&self, pos: usize, fields: &[String]) -> BulkResult<Document> {
        let crutches = self.crutches()?;
        self.composer
            .compose(&self.index[pos], crutches, Some(fields))
            .map_err(|e| self.compose_error(pos, &e))
    }

    pub(crate) fn composed_parent(&self, pos: usize) -> BulkResult<ComposedParent> {
        let Some(join_field) = self.join_field() else {
            return Ok(ComposedParent::Unknown);
        };
        Ok(ComposedParent::from_document(self.document(pos)?, join_field))
    }

    // ---------------------------------------------------------------
    // Parent resolver
    // ---------------------------------------------------------------

    /// Id the delete entry at `pos` goes out under: its derived id, else its
    /// literal form when that fallback is enabled
    pub(crate) fn delete_key(&self, pos: usize) -> Option<String> {
        match self.delete_id(pos) {
            Some(id) => Some(id.to_string()),
            None if self.config.serialize_unidentified_deletes() => {
                self.delete[pos].literal_id(self.config.id_keys())
            }
            None => None,
        }
    }

    fn fetch_parents(&self, join_field: &str) -> BulkResult<AHashMap<String, ParentInfo>> {
        let ids = self.ids();
        let mut seen = AHashSet::with_capacity(self.index.len() + self.delete.len());
        let keys: Vec<String> = ids
            .index
            .iter()
            .flatten()
            .cloned()
            .chain((0..self.delete.len()).filter_map(|pos| self.delete_key(pos)))
            .filter(|key| seen.insert(key.clone()))
            .collect();

        if keys.is_empty() {
            return Ok(AHashMap::new());
        }

        let stored = self
            .store
            .fetch_by_ids(&keys, join_field)
            .map_err(|source| BulkError::ParentLookup {
                count: keys.len(),
                source,
            })?;

        debug!(
            "Parent lookup on '{}': {} ids requested, {} stored",
            self.descriptor.name(),
            keys.len(),
            stored.len()
        );

        Ok(stored
            .into_iter()
            .map(|doc| {
                let parent_id = doc
                    .join
                    .as_ref()
                    .and_then(|join| join.get(PARENT_KEY))
                    .and_then(id_from_value);
                let info = ParentInfo {
                    routing: doc.routing,
                    parent_id,
                };
                (doc.id, info)
            })
            .collect())
    }

    /// Persisted routing and parent of `id`; always `None` without a join
    pub(crate) fn parent_info(&self, id: &str) -> BulkResult<Option<&ParentInfo>> {
        let Some(join_field) = self.join_field() else {
            return Ok(None);
        };
        let parents = self
            .parents
            .get_or_try_init(|| self.fetch_parents(join_field))?;
        Ok(parents.get(id))
    }

    /// Parent the indexed object at `pos` should have
    ///
    /// The composed document wins; persisted linkage is only used when the
    /// document does not carry the join field.
    pub(crate) fn find_parent(&self, pos: usize) -> BulkResult<Option<String>> {
        match self.composed_parent(pos)? {
            ComposedParent::Child(parent) => Ok(Some(parent)),
            ComposedParent::Root => Ok(None),
            ComposedParent::Unknown => match self.index_id(pos) {
                Some(id) => Ok(self
                    .parent_info(id)?
                    .and_then(|info| info.parent_id.clone())),
                None => Ok(None),
            },
        }
    }

    // ---------------------------------------------------------------
    // Routing calculator
    // ---------------------------------------------------------------

    /// Routing currently stored for `id`, asked of the store at most once
    pub(crate) fn existing_routing(&self, id: &str) -> BulkResult<Option<String>> {
        if let Some(routing) = self.stored_routings.borrow().get(id) {
            return Ok(routing.clone());
        }

        trace!("Routing lookup for document {id}");
        let routing = self
            .store
            .fetch_routing_by_id(id)
            .map_err(|source| BulkError::RoutingLookup {
                id: id.to_string(),
                source,
            })?;
        self.stored_routings
            .borrow_mut()
            .insert(id.to_string(), routing.clone());
        Ok(routing)
    }

    /// Routing for the indexed object at `pos`
    ///
    /// An explicit parent in the composed join value wins. Otherwise children
    /// route like their parent and roots by their own id; objects without an
    /// id have no routing. Parents indexed in the same batch are followed
    /// link by link until a document with known routing is reached.
    pub(crate) fn entry_routing(&self, pos: usize) -> BulkResult<Option<String>> {
        let mut path = Vec::new();
        let mut visited = AHashSet::new();
        let mut cycle_cut = false;
        let mut current = pos;

        let routing = loop {
            if let Some(routing) = self.chained_routings.borrow().get(&current) {
                break routing.clone();
            }
            visited.insert(current);
            path.push(current);

            match self.link(current)? {
                Link::Routed(routing) => break routing,
                Link::InBatch(parent_pos, parent) => {
                    if visited.contains(&parent_pos) {
                        warn!(
                            "Parent cycle through document {parent} in one batch, using stored routing"
                        );
                        cycle_cut = true;
                        break Some(self.stored_parent_routing(&parent)?);
                    }
                    current = parent_pos;
                }
            }
        };

        // A cut cycle resolves differently depending on where the walk started
        if !cycle_cut {
            let mut memo = self.chained_routings.borrow_mut();
            for step in path {
                memo.insert(step, routing.clone());
            }
        }
        Ok(routing)
    }

    /// One step of the routing walk for the indexed object at `pos`
    fn link(&self, pos: usize) -> BulkResult<Link> {
        if let ComposedParent::Child(parent) = self.composed_parent(pos)? {
            return Ok(Link::Routed(Some(parent)));
        }
        let Some(id) = self.index_id(pos) else {
            return Ok(Link::Routed(None));
        };
        match self.find_parent(pos)? {
            None => Ok(Link::Routed(Some(id.to_string()))),
            Some(parent) => match self.index_position(&parent) {
                Some(parent_pos) => Ok(Link::InBatch(parent_pos, parent)),
                None => Ok(Link::Routed(Some(self.stored_parent_routing(&parent)?))),
            },
        }
    }

    /// Routing of a parent outside the walk: persisted Parent Info, else a
    /// single-id lookup, else the parent id itself
    fn stored_parent_routing(&self, parent: &str) -> BulkResult<String> {
        if let Some(info) = self.parent_info(parent)? {
            return Ok(info.routing.clone().unwrap_or_else(|| parent.to_string()));
        }

        Ok(self
            .existing_routing(parent)?
            .unwrap_or_else(|| parent.to_string()))
    }
}
