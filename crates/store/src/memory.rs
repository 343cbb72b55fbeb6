//! In-memory object store backend.
//!
//! A namespace -> name -> object map behind a `RwLock`. Used by tests and
//! local development; semantics (create conflicts, update-of-absent,
//! strong read-after-write) match what the cluster-backed client
//! provides for a single key.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::object::StoredObject;
use crate::selector::LabelSelector;
use crate::traits::ObjectStore;

/// In-memory [`ObjectStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    namespaces: RwLock<HashMap<String, BTreeMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored in `namespace`.
    pub fn object_count(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .unwrap()
            .get(namespace)
            .map(|ns| ns.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn probe(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, namespace: &str, name: &str) -> Result<StoredObject, StoreError> {
        self.namespaces
            .read()
            .unwrap()
            .get(namespace)
            .and_then(|ns| ns.get(name))
            .cloned()
            .ok_or_else(|| StoreError::not_found(namespace, name))
    }

    async fn create(&self, namespace: &str, object: &StoredObject) -> Result<(), StoreError> {
        let mut namespaces = self.namespaces.write().unwrap();
        let ns = namespaces.entry(namespace.to_string()).or_default();
        if ns.contains_key(&object.name) {
            return Err(StoreError::already_exists(namespace, &object.name));
        }
        ns.insert(object.name.clone(), object.clone());
        Ok(())
    }

    async fn update(&self, namespace: &str, object: &StoredObject) -> Result<(), StoreError> {
        let mut namespaces = self.namespaces.write().unwrap();
        let ns = namespaces
            .get_mut(namespace)
            .ok_or_else(|| StoreError::not_found(namespace, &object.name))?;
        if !ns.contains_key(&object.name) {
            return Err(StoreError::not_found(namespace, &object.name));
        }
        ns.insert(object.name.clone(), object.clone());
        Ok(())
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        let mut namespaces = self.namespaces.write().unwrap();
        let removed = namespaces
            .get_mut(namespace)
            .and_then(|ns| ns.remove(name));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(namespace, name)),
        }
    }

    async fn list(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<StoredObject>, StoreError> {
        let namespaces = self.namespaces.read().unwrap();
        let objects = namespaces
            .get(namespace)
            .map(|ns| {
                ns.values()
                    .filter(|o| selector.matches(&o.labels))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector_object(name: &str, file: &str) -> StoredObject {
        StoredObject::new(name)
            .with_label("data", "sector")
            .with_label("relevant-file", file)
            .with_binary_field("sector", vec![0xAB; 4])
    }

    #[tokio::test]
    async fn test_create_get_round_trip() {
        let store = MemoryObjectStore::new();
        let obj = sector_object("enc-0", "enc");

        store.create("dbs", &obj).await.unwrap();
        let got = store.get("dbs", "enc-0").await.unwrap();
        assert_eq!(got, obj);
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let store = MemoryObjectStore::new();
        let obj = sector_object("enc-0", "enc");

        store.create("dbs", &obj).await.unwrap();
        let err = store.create("dbs", &obj).await.unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_update_requires_existing() {
        let store = MemoryObjectStore::new();
        let obj = sector_object("enc-0", "enc");

        let err = store.update("dbs", &obj).await.unwrap_err();
        assert!(err.is_not_found());

        store.create("dbs", &obj).await.unwrap();
        let changed = obj.clone().with_binary_field("sector", vec![1, 2]);
        store.update("dbs", &changed).await.unwrap();
        assert_eq!(
            store.get("dbs", "enc-0").await.unwrap().binary_field("sector"),
            Some(&[1u8, 2][..])
        );
    }

    #[tokio::test]
    async fn test_delete_absent_is_not_found() {
        let store = MemoryObjectStore::new();
        let err = store.delete("dbs", "enc-0").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_filters_by_selector() {
        let store = MemoryObjectStore::new();
        store.create("dbs", &sector_object("a-0", "a")).await.unwrap();
        store.create("dbs", &sector_object("a-1", "a")).await.unwrap();
        store.create("dbs", &sector_object("b-0", "b")).await.unwrap();

        let sel = LabelSelector::default()
            .with_requirement("data", "sector")
            .with_requirement("relevant-file", "a");
        let items = store.list("dbs", &sel).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|o| o.labels["relevant-file"] == "a"));
    }

    #[tokio::test]
    async fn test_namespaces_are_disjoint() {
        let store = MemoryObjectStore::new();
        store.create("one", &sector_object("a-0", "a")).await.unwrap();

        assert!(store.get("two", "a-0").await.unwrap_err().is_not_found());
        assert_eq!(store.object_count("one"), 1);
        assert_eq!(store.object_count("two"), 0);
    }
}
