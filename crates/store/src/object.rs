//! The stored object resource.
//!
//! Objects in the backing store are config-map shaped: a name unique
//! within a namespace, a label map used by list queries, a binary-data
//! map for raw payloads and a string-data map for textual fields. This
//! module is pure data; all I/O goes through the
//! [`ObjectStore`](crate::ObjectStore) trait.

use std::collections::BTreeMap;

/// A config-map shaped object in the backing store.
///
/// Sector objects keep their payload in `binary_data` under the
/// `"sector"` key; lock objects keep their level in `data` under the
/// `"lock"` key. Every object carries the raw filename in `data` under
/// `"filename"` for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredObject {
    /// Object name, unique within a namespace.
    pub name: String,
    /// Labels used by list selectors.
    pub labels: BTreeMap<String, String>,
    /// Binary payload fields.
    pub binary_data: BTreeMap<String, Vec<u8>>,
    /// String payload fields.
    pub data: BTreeMap<String, String>,
}

impl StoredObject {
    /// Create an empty object with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Attach a single label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Attach a full label map, replacing any existing labels.
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Attach a binary payload field.
    pub fn with_binary_field(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.binary_data.insert(key.into(), value);
        self
    }

    /// Attach a string payload field.
    pub fn with_string_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Look up a binary payload field.
    pub fn binary_field(&self, key: &str) -> Option<&[u8]> {
        self.binary_data.get(key).map(|v| v.as_slice())
    }

    /// Look up a string payload field.
    pub fn string_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|v| v.as_str())
    }
}
