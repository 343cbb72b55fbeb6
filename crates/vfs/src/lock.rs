//! The advisory lock: persisted state plus the transition rules.
//!
//! Each file has one lock object holding the current level as a string.
//! The lock is cooperative: levels are read and written without any
//! compare-and-swap, so two processes can race each other to the same
//! level. Single-writer deployments are the supported shape; a real
//! multi-writer story would hang the update on the store's
//! resource-version token.
//!
//! Transition checking is pure and lives apart from the I/O so the whole
//! state machine can be tested without a store:
//!
//! ```text
//!     none -> shared
//!     shared -> reserved
//!     shared -> (pending) -> exclusive
//!     reserved -> (pending) -> exclusive
//!     pending -> exclusive
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use sectormap_common::{
    encode_name, FIELD_FILENAME, FIELD_LOCK, LABEL_DATA, LABEL_DATA_LOCKFILE,
    LABEL_RELEVANT_FILE,
};
use sectormap_store::{ObjectStore, StoreError, StoredObject};

use crate::api::LockLevel;
use crate::error::VfsError;
use crate::sector::lock_object_name;

/// Decide what a lock escalation request should do.
///
/// # Returns
/// `Ok(Some(level))` when `requested` must be persisted, `Ok(None)` when
/// the request is already satisfied, `Err` when the transition is not
/// permitted. Rejected requests leave the current level untouched.
pub fn validate_lock(
    current: LockLevel,
    requested: LockLevel,
) -> Result<Option<LockLevel>, VfsError> {
    if requested <= current {
        return Ok(None);
    }
    let rejected = Err(VfsError::InvalidLockTransition {
        from: current,
        requested,
    });
    // Never from unlocked to anything above shared.
    if current == LockLevel::None && requested > LockLevel::Shared {
        return rejected;
    }
    // The engine never explicitly requests pending.
    if requested == LockLevel::Pending {
        return rejected;
    }
    // A shared lock is always held when reserved is requested.
    if requested == LockLevel::Reserved && current != LockLevel::Shared {
        return rejected;
    }
    Ok(Some(requested))
}

/// Decide what an unlock request should do.
///
/// # Returns
/// `Some(level)` when `target` must be persisted, `None` when already at
/// `target`.
///
/// # Panics
/// On a target above shared, or a target above the current level. Those
/// can only come from an engine or implementation bug, so the process
/// aborts rather than limping on with a corrupt lock state.
pub fn validate_unlock(current: LockLevel, target: LockLevel) -> Option<LockLevel> {
    if target > LockLevel::Shared {
        panic!("invalid unlock request to level {}", target);
    }
    if target > current {
        panic!(
            "cannot unlock to level {} above current level {}",
            target, current
        );
    }
    if target == current {
        None
    } else {
        Some(target)
    }
}

/// The persisted lock state of one file.
pub struct LockStore {
    store: Arc<dyn ObjectStore>,
    namespace: String,
    raw_name: String,
    object_name: String,
    labels: BTreeMap<String, String>,
}

impl LockStore {
    /// Bind a lock store to `raw_name` in `namespace`.
    pub fn new(store: Arc<dyn ObjectStore>, namespace: impl Into<String>, raw_name: &str) -> Self {
        let encoded_name = encode_name(raw_name);
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_DATA.to_string(), LABEL_DATA_LOCKFILE.to_string());
        labels.insert(LABEL_RELEVANT_FILE.to_string(), encoded_name.clone());
        Self {
            store,
            namespace: namespace.into(),
            raw_name: raw_name.to_string(),
            object_name: lock_object_name(&encoded_name),
            labels,
        }
    }

    /// Object name of the lock object.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Whether the lock object exists at all.
    pub async fn exists(&self) -> Result<bool, StoreError> {
        match self.store.get(&self.namespace, &self.object_name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Load the current lock level.
    ///
    /// An absent lock object is level none; a present object with a
    /// string outside the five levels fails the call.
    pub async fn current_level(&self) -> Result<LockLevel, VfsError> {
        let object = match self.store.get(&self.namespace, &self.object_name).await {
            Ok(object) => object,
            Err(e) if e.is_not_found() => return Ok(LockLevel::None),
            Err(e) => {
                log::error!("fetching lock object {} failed: {}", self.object_name, e);
                return Err(VfsError::Io(e));
            }
        };
        object
            .string_field(FIELD_LOCK)
            .unwrap_or_default()
            .parse::<LockLevel>()
    }

    /// Persist `level`, creating the lock object if it does not exist.
    pub async fn set_level(&self, level: LockLevel) -> Result<(), StoreError> {
        let object = StoredObject::new(&self.object_name)
            .with_labels(self.labels.clone())
            .with_string_field(FIELD_LOCK, level.to_string())
            .with_string_field(FIELD_FILENAME, self.raw_name.clone());
        match self.store.update(&self.namespace, &object).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => self.store.create(&self.namespace, &object).await,
            Err(e) => {
                log::error!("persisting lock level {} failed: {}", level, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectormap_store::MemoryObjectStore;

    // ------------------------------------------------------------------
    // Transition rules
    // ------------------------------------------------------------------

    #[test]
    fn test_lock_from_none_to_shared() {
        assert_eq!(
            validate_lock(LockLevel::None, LockLevel::Shared).unwrap(),
            Some(LockLevel::Shared)
        );
    }

    #[test]
    fn test_lock_from_none_above_shared_rejected() {
        for requested in [LockLevel::Reserved, LockLevel::Pending, LockLevel::Exclusive] {
            let err = validate_lock(LockLevel::None, requested).unwrap_err();
            assert!(matches!(err, VfsError::InvalidLockTransition { .. }));
        }
    }

    #[test]
    fn test_lock_explicit_pending_rejected() {
        let err = validate_lock(LockLevel::Shared, LockLevel::Pending).unwrap_err();
        assert!(matches!(err, VfsError::InvalidLockTransition { .. }));
    }

    #[test]
    fn test_lock_reserved_only_from_shared() {
        assert_eq!(
            validate_lock(LockLevel::Shared, LockLevel::Reserved).unwrap(),
            Some(LockLevel::Reserved)
        );
        // Pending holders cannot go "back" through reserved
        assert!(validate_lock(LockLevel::Pending, LockLevel::Reserved).is_err());
    }

    #[test]
    fn test_lock_escalation_to_exclusive() {
        for current in [LockLevel::Shared, LockLevel::Reserved, LockLevel::Pending] {
            assert_eq!(
                validate_lock(current, LockLevel::Exclusive).unwrap(),
                Some(LockLevel::Exclusive)
            );
        }
    }

    #[test]
    fn test_lock_at_or_below_current_is_noop() {
        assert_eq!(validate_lock(LockLevel::Shared, LockLevel::Shared).unwrap(), None);
        assert_eq!(validate_lock(LockLevel::Exclusive, LockLevel::Shared).unwrap(), None);
    }

    #[test]
    fn test_unlock_to_none_and_shared() {
        assert_eq!(
            validate_unlock(LockLevel::Exclusive, LockLevel::None),
            Some(LockLevel::None)
        );
        assert_eq!(
            validate_unlock(LockLevel::Exclusive, LockLevel::Shared),
            Some(LockLevel::Shared)
        );
        assert_eq!(validate_unlock(LockLevel::Shared, LockLevel::Shared), None);
    }

    #[test]
    #[should_panic(expected = "invalid unlock request")]
    fn test_unlock_above_shared_panics() {
        validate_unlock(LockLevel::Exclusive, LockLevel::Reserved);
    }

    #[test]
    #[should_panic(expected = "cannot unlock to level")]
    fn test_unlock_above_current_panics() {
        validate_unlock(LockLevel::None, LockLevel::Shared);
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_absent_lock_object_is_level_none() {
        let store = Arc::new(MemoryObjectStore::new());
        let lock = LockStore::new(store, "dbs", "file0.db");
        assert!(!lock.exists().await.unwrap());
        assert_eq!(lock.current_level().await.unwrap(), LockLevel::None);
    }

    #[tokio::test]
    async fn test_set_level_creates_then_updates() {
        let store = Arc::new(MemoryObjectStore::new());
        let lock = LockStore::new(store.clone(), "dbs", "file0.db");

        lock.set_level(LockLevel::Shared).await.unwrap();
        assert!(lock.exists().await.unwrap());
        assert_eq!(lock.current_level().await.unwrap(), LockLevel::Shared);

        lock.set_level(LockLevel::Exclusive).await.unwrap();
        assert_eq!(lock.current_level().await.unwrap(), LockLevel::Exclusive);
        assert_eq!(store.object_count("dbs"), 1);
    }

    #[tokio::test]
    async fn test_lock_object_shape() {
        let store = Arc::new(MemoryObjectStore::new());
        let lock = LockStore::new(store.clone(), "dbs", "file0.db");
        lock.set_level(LockLevel::None).await.unwrap();

        let object = store.get("dbs", lock.object_name()).await.unwrap();
        assert_eq!(
            object.labels.get(LABEL_DATA).map(String::as_str),
            Some(LABEL_DATA_LOCKFILE)
        );
        assert!(object.labels.contains_key(LABEL_RELEVANT_FILE));
        assert_eq!(object.string_field(FIELD_LOCK), Some("none"));
        assert_eq!(object.string_field(FIELD_FILENAME), Some("file0.db"));
    }

    #[tokio::test]
    async fn test_garbage_lock_state_is_an_error() {
        let store = Arc::new(MemoryObjectStore::new());
        let lock = LockStore::new(store.clone(), "dbs", "file0.db");

        let object = StoredObject::new(lock.object_name())
            .with_string_field(FIELD_LOCK, "held-by-bob");
        store.create("dbs", &object).await.unwrap();

        let err = lock.current_level().await.unwrap_err();
        assert!(matches!(err, VfsError::UnknownLockState { value } if value == "held-by-bob"));
    }
}
