//! Core configuration types for bulk body compilation

use serde::{Deserialize, Serialize};

use super::builder::BulkConfigBuilder;

/// Map key probed for an id when none is configured
pub const DEFAULT_ID_KEY: &str = "id";

/// Main configuration struct for bulk body compilation
///
/// Deserialization goes through [`BulkConfigBuilder`],
/// so missing keys take their defaults and invalid values are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BulkConfigBuilder")]
pub struct BulkConfig {
    /// Field restriction for partial updates.
    ///
    /// When non-empty, index entries become `update` operations carrying only
    /// these fields (except for parent reassignments, which always reindex the
    /// full document).
    pub(crate) fields: Vec<String>,

    /// Keys probed, in order, for the id of a map object.
    ///
    /// **INVARIANT:** Never empty (enforced by the builder, also on
    /// deserialization).
    pub(crate) id_keys: Vec<String>,

    /// Delete unidentifiable maps and scalars by their literal form
    ///
    /// Default: true
    pub(crate) serialize_unidentified_deletes: bool,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            id_keys: vec![DEFAULT_ID_KEY.to_string()],
            serialize_unidentified_deletes: true,
        }
    }
}
