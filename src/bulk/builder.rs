//! Bulk body assembly

use super::collaborators::{DocumentComposer, StoreQueryClient};
use super::context::BatchContext;
use super::descriptor::TypeDescriptor;
use super::errors::BulkResult;
use super::object::{BulkObject, Record};
use super::types::BulkOperation;
use crate::config::BulkConfig;
use log::debug;
use std::collections::HashMap;

/// Compiles objects to index and objects (or ids) to delete into a bulk body
///
/// Index-derived operations come first, in input order, followed by the
/// delete-derived ones. Every call to [`bulk_body`](Self::bulk_body) works
/// from a fresh batch context, so nothing is cached across calls.
///
/// ```ignore
/// let body = BulkBuilder::new(&descriptor, &composer, &store)
///     .index(updated)
///     .delete(removed)
///     .bulk_body()?;
/// ```
pub struct BulkBuilder<'a, R, C, S> {
    descriptor: &'a TypeDescriptor<R>,
    composer: &'a C,
    store: &'a S,
    index: Vec<BulkObject<R>>,
    delete: Vec<BulkObject<R>>,
    config: BulkConfig,
}

impl<'a, R, C, S> BulkBuilder<'a, R, C, S>
where
    R: Record,
    C: DocumentComposer<R>,
    S: StoreQueryClient,
{
    #[must_use]
    pub fn new(descriptor: &'a TypeDescriptor<R>, composer: &'a C, store: &'a S) -> Self {
        Self {
            descriptor,
            composer,
            store,
            index: Vec::new(),
            delete: Vec::new(),
            config: BulkConfig::default(),
        }
    }

    /// Objects to index
    #[must_use]
    pub fn index<I>(mut self, objects: I) -> Self
    where
        I: IntoIterator<Item = BulkObject<R>>,
    {
        self.index = objects.into_iter().collect();
        self
    }

    /// Objects or bare ids to delete
    #[must_use]
    pub fn delete<I>(mut self, objects: I) -> Self
    where
        I: IntoIterator<Item = BulkObject<R>>,
    {
        self.delete = objects.into_iter().collect();
        self
    }

    #[must_use]
    pub fn config(mut self, config: BulkConfig) -> Self {
        self.config = config;
        self
    }

    fn context(&self) -> BatchContext<'_, R, C, S> {
        BatchContext::new(
            self.descriptor,
            self.composer,
            self.store,
            &self.config,
            &self.index,
            &self.delete,
        )
    }

    /// Compile the bulk body
    ///
    /// # Errors
    ///
    /// Store lookups and document composition failures abort the compile and
    /// are returned as is.
    pub fn bulk_body(&self) -> BulkResult<Vec<BulkOperation>> {
        debug!(
            "Compiling bulk body for '{}': {} to index, {} to delete",
            self.descriptor.name(),
            self.index.len(),
            self.delete.len()
        );

        let context = self.context();
        let mut body = Vec::with_capacity(self.index.len() + self.delete.len());
        for pos in 0..self.index.len() {
            body.extend(context.index_entries(pos)?);
        }
        for pos in 0..self.delete.len() {
            body.extend(context.delete_entry(pos)?);
        }

        debug!(
            "Compiled {} bulk operations for '{}'",
            body.len(),
            self.descriptor.name()
        );
        Ok(body)
    }

    /// Objects to index keyed by their document id
    ///
    /// Objects without a resolvable id are left out.
    #[must_use]
    pub fn index_objects_by_id(&self) -> HashMap<String, &BulkObject<R>> {
        self.context()
            .index_positions()
            .map(|(id, pos)| (id.to_string(), &self.index[pos]))
            .collect()
    }
}
