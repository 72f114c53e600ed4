//! Getter methods for `BulkConfig`

use super::types::BulkConfig;

impl BulkConfig {
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field restriction, `None` when full documents are indexed
    #[must_use]
    pub fn field_restriction(&self) -> Option<&[String]> {
        if self.fields.is_empty() {
            None
        } else {
            Some(&self.fields)
        }
    }

    #[must_use]
    pub fn id_keys(&self) -> &[String] {
        &self.id_keys
    }

    #[must_use]
    pub fn serialize_unidentified_deletes(&self) -> bool {
        self.serialize_unidentified_deletes
    }
}
