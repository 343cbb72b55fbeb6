//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during object store operations.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// Object not found in the namespace.
    #[error("Object not found: {namespace}/{name}")]
    NotFound {
        /// Namespace that was queried.
        namespace: String,
        /// Object name that was queried.
        name: String,
    },

    /// Object already exists (returned by create).
    #[error("Object already exists: {namespace}/{name}")]
    AlreadyExists {
        /// Namespace of the conflicting object.
        namespace: String,
        /// Name of the conflicting object.
        name: String,
    },

    /// Transport-level failure (network, auth, quota).
    #[error("Store transport error: {message}")]
    Transport {
        /// Error message from the underlying client.
        message: String,
    },

    /// Object rejected by the store (bad name, oversized payload).
    #[error("Invalid object: {message}")]
    InvalidObject {
        /// Reason the object was rejected.
        message: String,
    },
}

impl StoreError {
    /// Create a NotFound error.
    pub fn not_found(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// True for absent-object errors; callers use this to materialize
    /// missing sectors and to treat delete-of-absent as success.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// True for create conflicts; callers convert these into updates.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}
