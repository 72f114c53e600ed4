//! Per-object classification into bulk operations

use super::collaborators::{DocumentComposer, StoreQueryClient};
use super::context::{BatchContext, ComposedParent};
use super::errors::BulkResult;
use super::object::Record;
use super::types::{BulkOperation, DeleteEntry, IndexEntry, ParentInfo, PartialDocument, UpdateEntry};
use log::trace;
use smallvec::{SmallVec, smallvec};

/// Operations emitted for one object: none, one, or a delete+index pair
pub(crate) type Entries = SmallVec<[BulkOperation; 2]>;

impl<R, C, S> BatchContext<'_, R, C, S>
where
    R: Record,
    C: DocumentComposer<R>,
    S: StoreQueryClient,
{
    /// Operations for the indexed object at `pos`
    pub(crate) fn index_entries(&self, pos: usize) -> BulkResult<Entries> {
        let id = self.index_id(pos).map(str::to_string);
        let fields = self.config().field_restriction();

        if self.join_field().is_none() {
            return match (fields, id) {
                (None, id) => Ok(smallvec![BulkOperation::Index(IndexEntry {
                    id,
                    routing: None,
                    data: self.document(pos)?.clone(),
                })]),
                (Some(fields), Some(id)) => Ok(smallvec![BulkOperation::Update(UpdateEntry {
                    id,
                    routing: None,
                    data: PartialDocument {
                        doc: self.partial_document(pos, fields)?,
                    },
                })]),
                (Some(_), None) => Ok(Entries::new()),
            };
        }

        let composed = self.composed_parent(pos)?;
        if let (Some(id), false) = (id.as_deref(), composed == ComposedParent::Unknown) {
            if let Some(old) = self.parent_info(id)? {
                if composed.parent_id() != old.parent_id.as_deref() {
                    return self.reassignment_entries(pos, id, old, &composed);
                }
            }
        }

        match (fields, id) {
            (None, id) => Ok(smallvec![BulkOperation::Index(IndexEntry {
                id,
                routing: self.entry_routing(pos)?,
                data: self.document(pos)?.clone(),
            })]),
            (Some(fields), Some(id)) => Ok(smallvec![BulkOperation::Update(UpdateEntry {
                id,
                routing: self.entry_routing(pos)?,
                data: PartialDocument {
                    doc: self.partial_document(pos, fields)?,
                },
            })]),
            (Some(_), None) => Ok(Entries::new()),
        }
    }

    /// Document moved to another parent: drop it where it lives now and
    /// reindex it in full under the new parent
    fn reassignment_entries(
        &self,
        pos: usize,
        id: &str,
        old: &ParentInfo,
        composed: &ComposedParent,
    ) -> BulkResult<Entries> {
        trace!(
            "Document {id} moves from parent {:?} to {:?}",
            old.parent_id,
            composed.parent_id()
        );

        let old_routing = match old.routing.as_ref().or(old.parent_id.as_ref()) {
            Some(routing) => Some(routing.clone()),
            None => self.existing_routing(id)?,
        };

        let delete = BulkOperation::Delete(DeleteEntry {
            id: id.to_string(),
            routing: old_routing,
            parent: old.parent_id.clone(),
        });
        let index = BulkOperation::Index(IndexEntry {
            id: Some(id.to_string()),
            routing: composed.parent_id().map(str::to_string),
            data: self.document(pos)?.clone(),
        });
        Ok(smallvec![delete, index])
    }

    /// Operation for the object at `pos` of the delete list, `None` when it
    /// has no usable id
    pub(crate) fn delete_entry(&self, pos: usize) -> BulkResult<Option<BulkOperation>> {
        let Some(id) = self.delete_key(pos) else {
            return Ok(None);
        };

        if self.join_field().is_none() {
            return Ok(Some(BulkOperation::Delete(DeleteEntry {
                id,
                routing: None,
                parent: None,
            })));
        }

        let (routing, parent) = match self.parent_info(&id)? {
            Some(info) => (
                info.routing.clone().or_else(|| info.parent_id.clone()),
                info.parent_id.clone(),
            ),
            None => (self.existing_routing(&id)?, None),
        };

        Ok(Some(BulkOperation::Delete(DeleteEntry {
            id,
            routing,
            parent,
        })))
    }
}
