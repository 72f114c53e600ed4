//! Input objects and id extraction
//!
//! Objects handed to the builder come in three shapes: application records
//! exposing an id accessor, keyed maps, and bare scalars (mostly ids passed
//! for deletion).

use serde_json::{Map, Value};
use std::fmt;

/// Extended JSON key carrying an object id inside a map
const OBJECT_ID_KEY: &str = "$oid";

/// Application record that can report its own id
pub trait Record {
    /// Raw id of the record, `None` when it has none
    fn id(&self) -> Option<RawId>;
}

/// Id value before normalization to its string form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawId {
    Str(String),
    Int(i64),
    UInt(u64),
    /// 12-byte opaque object id
    ObjectId([u8; 12]),
}

impl RawId {
    /// Canonical string form, `None` when blank
    #[must_use]
    pub fn normalize(&self) -> Option<String> {
        let id = match self {
            RawId::Str(s) => s.clone(),
            RawId::Int(n) => n.to_string(),
            RawId::UInt(n) => n.to_string(),
            RawId::ObjectId(bytes) => hex::encode(bytes),
        };
        if id.trim().is_empty() { None } else { Some(id) }
    }

    /// Parse a 24-character hex object id
    #[must_use]
    pub fn object_id(hex_id: &str) -> Option<Self> {
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(hex_id, &mut bytes).ok()?;
        Some(RawId::ObjectId(bytes))
    }

    /// Interpret a JSON value as an id
    ///
    /// Strings and integers map directly, `{"$oid": ".."}` maps to an object
    /// id. Anything else is not an id.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RawId::Str(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(RawId::Int)
                .or_else(|| n.as_u64().map(RawId::UInt))
                .or_else(|| Some(RawId::Str(n.to_string()))),
            Value::Object(map) => map
                .get(OBJECT_ID_KEY)
                .and_then(Value::as_str)
                .and_then(Self::object_id),
            _ => None,
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Str(s) => f.write_str(s),
            RawId::Int(n) => write!(f, "{n}"),
            RawId::UInt(n) => write!(f, "{n}"),
            RawId::ObjectId(bytes) => f.write_str(&hex::encode(bytes)),
        }
    }
}

macro_rules! raw_id_from {
    ($($ty:ty => $variant:ident as $cast:ty),* $(,)?) => {
        $(
            impl From<$ty> for RawId {
                fn from(value: $ty) -> Self {
                    RawId::$variant(<$cast>::from(value))
                }
            }
        )*
    };
}

raw_id_from! {
    i64 => Int as i64,
    i32 => Int as i64,
    u64 => UInt as u64,
    u32 => UInt as u64,
    String => Str as String,
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        RawId::Str(value.to_string())
    }
}

/// Normalized string form of a JSON id value
#[must_use]
pub fn id_from_value(value: &Value) -> Option<String> {
    RawId::from_value(value).and_then(|raw| raw.normalize())
}

/// Object handed to the builder for indexing or deletion
#[derive(Debug, Clone, PartialEq)]
pub enum BulkObject<R> {
    Record(R),
    Map(Map<String, Value>),
    Scalar(Value),
}

impl<R: Record> BulkObject<R> {
    /// Id reported by the object itself, ignoring any custom derivation
    #[must_use]
    pub fn accessor_id(&self, id_keys: &[String]) -> Option<RawId> {
        match self {
            BulkObject::Record(record) => record.id(),
            BulkObject::Map(map) => id_keys
                .iter()
                .find_map(|key| map.get(key))
                .and_then(RawId::from_value),
            BulkObject::Scalar(_) => None,
        }
    }

    /// Literal identifier used when nothing better is known
    ///
    /// Maps serialize to their JSON text, scalars to their plain text.
    /// Records have none, and neither do maps whose id key holds a blank
    /// string.
    #[must_use]
    pub fn literal_id(&self, id_keys: &[String]) -> Option<String> {
        let literal = match self {
            BulkObject::Record(_) => return None,
            BulkObject::Map(map) => {
                let blank_id = id_keys.iter().any(|key| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .is_some_and(|id| id.trim().is_empty())
                });
                if blank_id {
                    return None;
                }
                serde_json::to_string(map).ok()?
            }
            BulkObject::Scalar(Value::Null) => return None,
            BulkObject::Scalar(Value::String(s)) => s.clone(),
            BulkObject::Scalar(value) => value.to_string(),
        };
        if literal.trim().is_empty() { None } else { Some(literal) }
    }
}

impl<R> From<Map<String, Value>> for BulkObject<R> {
    fn from(map: Map<String, Value>) -> Self {
        BulkObject::Map(map)
    }
}
