//! Store traits/interfaces for object operations.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::object::StoredObject;
use crate::selector::LabelSelector;

/// Low-level object store operations, namespaced config-map style.
///
/// The VFS is written against this trait; the embedding harness supplies
/// a cluster-backed implementation, tests and local development use
/// [`MemoryObjectStore`](crate::MemoryObjectStore). Implementations must
/// provide strong read-after-write for a single key within one client.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Cheap reachability check (a server-version style request).
    /// Used before opening a file so a dead store fails fast.
    async fn probe(&self) -> Result<(), StoreError>;

    /// Fetch an object by name.
    ///
    /// # Errors
    /// `NotFound` when the object does not exist.
    async fn get(&self, namespace: &str, name: &str) -> Result<StoredObject, StoreError>;

    /// Create a new object.
    ///
    /// # Errors
    /// `AlreadyExists` when an object with the same name is present.
    async fn create(&self, namespace: &str, object: &StoredObject) -> Result<(), StoreError>;

    /// Replace an existing object.
    ///
    /// # Errors
    /// `NotFound` when no object with that name exists.
    async fn update(&self, namespace: &str, object: &StoredObject) -> Result<(), StoreError>;

    /// Delete an object by name.
    ///
    /// # Errors
    /// `NotFound` when the object does not exist; callers that treat
    /// absence as success check `is_not_found`.
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError>;

    /// List objects whose labels satisfy the selector.
    async fn list(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<StoredObject>, StoreError>;
}
