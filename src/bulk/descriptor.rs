//! Type descriptors: join relation and id derivation for an indexed type

use super::errors::{BulkError, BulkResult};
use super::object::{BulkObject, RawId};
use serde_json::Value;
use std::fmt;

/// Mapping field type that declares parent/child relations
const JOIN_FIELD_TYPE: &str = "join";

/// Custom id derivation declared on a type root
pub type IdDerivation<R> = Box<dyn Fn(&BulkObject<R>) -> Option<RawId> + Send + Sync>;

/// Join relation declared by a type's schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinDescriptor {
    field: String,
}

impl JoinDescriptor {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Name of the join-typed field
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}

/// What the builder needs to know about the indexed type
pub struct TypeDescriptor<R> {
    name: String,
    join: Option<JoinDescriptor>,
    custom_id: Option<IdDerivation<R>>,
}

impl<R> TypeDescriptor<R> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            join: None,
            custom_id: None,
        }
    }

    /// Declare the join field of this type
    #[must_use]
    pub fn with_join(mut self, join: JoinDescriptor) -> Self {
        self.join = Some(join);
        self
    }

    /// Derive document ids with `derive` instead of the object's own id
    #[must_use]
    pub fn with_custom_id<F>(mut self, derive: F) -> Self
    where
        F: Fn(&BulkObject<R>) -> Option<RawId> + Send + Sync + 'static,
    {
        self.custom_id = Some(Box::new(derive));
        self
    }

    /// Build a descriptor from a mapping document
    ///
    /// Accepts `{"properties": {..}}` or the same wrapped under the type name
    /// (`{"<name>": {"properties": {..}}}`). The first property whose `type` is
    /// `join` becomes the join field.
    pub fn from_mapping(name: impl Into<String>, mapping: &Value) -> BulkResult<Self> {
        let name = name.into();
        let root = mapping.get(&name).unwrap_or(mapping);
        let properties = match root.get("properties") {
            Some(Value::Object(properties)) => properties,
            Some(_) => {
                return Err(BulkError::Mapping(format!(
                    "`properties` of type '{name}' is not an object"
                )));
            }
            None => {
                return Err(BulkError::Mapping(format!(
                    "type '{name}' has no `properties`"
                )));
            }
        };

        let join = properties
            .iter()
            .find(|(_, options)| {
                options.get("type").and_then(Value::as_str) == Some(JOIN_FIELD_TYPE)
            })
            .map(|(field, _)| JoinDescriptor::new(field.as_str()));

        Ok(Self {
            name,
            join,
            custom_id: None,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn join(&self) -> Option<&JoinDescriptor> {
        self.join.as_ref()
    }

    /// Whether the type root defines its own id
    #[must_use]
    pub fn has_custom_id(&self) -> bool {
        self.custom_id.is_some()
    }

    /// Apply the custom id derivation, `None` when none is declared
    #[must_use]
    pub fn derive_id(&self, object: &BulkObject<R>) -> Option<RawId> {
        self.custom_id.as_ref().and_then(|derive| derive(object))
    }
}

impl<R> fmt::Debug for TypeDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("join", &self.join)
            .field("custom_id", &self.custom_id.is_some())
            .finish()
    }
}
