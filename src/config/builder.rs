//! Builder for `BulkConfig`
//!
//! Validation happens once in `build()`, so a `BulkConfig` in hand is always
//! usable as-is.

use anyhow::{Result, bail};
use serde::Deserialize;

use super::types::{BulkConfig, DEFAULT_ID_KEY};

/// Drop duplicates while keeping first-seen order
fn dedup_in_order(values: Vec<String>) -> Vec<String> {
    let mut seen = ahash::AHashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BulkConfigBuilder {
    pub(crate) fields: Vec<String>,
    pub(crate) id_keys: Vec<String>,
    pub(crate) serialize_unidentified_deletes: bool,
}

impl Default for BulkConfigBuilder {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            id_keys: vec![DEFAULT_ID_KEY.to_string()],
            serialize_unidentified_deletes: true,
        }
    }
}

impl BulkConfig {
    #[must_use]
    pub fn builder() -> BulkConfigBuilder {
        BulkConfigBuilder::default()
    }
}

impl BulkConfigBuilder {
    /// Restrict index entries to partial updates of these fields
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Map keys probed for an id, in order
    #[must_use]
    pub fn id_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn serialize_unidentified_deletes(mut self, enabled: bool) -> Self {
        self.serialize_unidentified_deletes = enabled;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a field name or id key is blank, or if no id key
    /// is left.
    pub fn build(self) -> Result<BulkConfig> {
        if let Some(blank) = self.fields.iter().position(|f| f.trim().is_empty()) {
            bail!("Field name at position {blank} is blank");
        }
        if self.id_keys.is_empty() {
            bail!("At least one id key is required");
        }
        if self.id_keys.iter().any(|k| k.trim().is_empty()) {
            bail!("Id keys must not be blank");
        }

        Ok(BulkConfig {
            fields: dedup_in_order(self.fields),
            id_keys: dedup_in_order(self.id_keys),
            serialize_unidentified_deletes: self.serialize_unidentified_deletes,
        })
    }
}

impl TryFrom<BulkConfigBuilder> for BulkConfig {
    type Error = anyhow::Error;

    fn try_from(builder: BulkConfigBuilder) -> Result<Self> {
        builder.build()
    }
}
