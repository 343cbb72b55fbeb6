//! Per-file sector CRUD against the object store.
//!
//! A [`SectorStore`] is bound to one file: it knows the file's encoded
//! name, its label set, and the namespace, and turns sector-level
//! operations into object-store calls. There is no bulk endpoint;
//! ranges are fetched one object at a time, in index order.

use std::collections::BTreeMap;
use std::sync::Arc;

use sectormap_common::{
    encode_name, FIELD_FILENAME, FIELD_SECTOR, LABEL_DATA, LABEL_DATA_SECTOR,
    LABEL_RELEVANT_FILE,
};
use sectormap_store::{LabelSelector, ObjectStore, StoreError, StoredObject};

use crate::error::VfsError;
use crate::sector::{sector_object_name, Sector};

/// Sector operations for a single file.
pub struct SectorStore {
    store: Arc<dyn ObjectStore>,
    namespace: String,
    raw_name: String,
    encoded_name: String,
    labels: BTreeMap<String, String>,
}

impl SectorStore {
    /// Bind a sector store to `raw_name` in `namespace`.
    pub fn new(store: Arc<dyn ObjectStore>, namespace: impl Into<String>, raw_name: &str) -> Self {
        let encoded_name = encode_name(raw_name);
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_DATA.to_string(), LABEL_DATA_SECTOR.to_string());
        labels.insert(LABEL_RELEVANT_FILE.to_string(), encoded_name.clone());
        Self {
            store,
            namespace: namespace.into(),
            raw_name: raw_name.to_string(),
            encoded_name,
            labels,
        }
    }

    /// The file's encoded name.
    pub fn encoded_name(&self) -> &str {
        &self.encoded_name
    }

    /// Selector matching every sector object of this file.
    pub fn selector(&self) -> LabelSelector {
        LabelSelector::from_labels(&self.labels)
    }

    fn object_for(&self, sector: &Sector) -> StoredObject {
        StoredObject::new(sector_object_name(&self.encoded_name, sector.index))
            .with_labels(self.labels.clone())
            .with_binary_field(FIELD_SECTOR, sector.data.clone())
            .with_string_field(FIELD_FILENAME, self.raw_name.clone())
    }

    /// Idempotent upsert of one sector object.
    ///
    /// Create first; a create that loses to an existing object becomes an
    /// update. No retry loop here - callers re-invoke on transient
    /// failure.
    pub async fn write_sector(&self, sector: &Sector) -> Result<(), StoreError> {
        let object = self.object_for(sector);
        match self.store.create(&self.namespace, &object).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_already_exists() => self.store.update(&self.namespace, &object).await,
            Err(e) => {
                log::error!("writing sector {} failed: {}", object.name, e);
                Err(e)
            }
        }
    }

    /// Fetch sector `index`.
    ///
    /// A sector that does not exist yet is materialized empty (and
    /// persisted), which keeps read-modify-write uniform for the first
    /// touch of a sector. Any other fetch failure is a short read.
    pub async fn sector(&self, index: u64) -> Result<Sector, VfsError> {
        let name = sector_object_name(&self.encoded_name, index);
        match self.store.get(&self.namespace, &name).await {
            Ok(object) => {
                let data = object
                    .binary_field(FIELD_SECTOR)
                    .map(|b| b.to_vec())
                    .unwrap_or_default();
                Ok(Sector { index, data })
            }
            Err(e) if e.is_not_found() => {
                let sector = Sector::empty(index);
                self.write_sector(&sector).await?;
                Ok(sector)
            }
            Err(e) => {
                log::error!("fetching sector {} failed: {}", name, e);
                Err(VfsError::ShortRead {
                    name,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Fetch sectors `first..=last` in index order.
    ///
    /// The result always holds `last - first + 1` sectors; missing ones
    /// come back empty via [`SectorStore::sector`]. Any failure is
    /// reported as a read error.
    pub async fn sector_range(&self, first: u64, last: u64) -> Result<Vec<Sector>, VfsError> {
        let mut sectors = Vec::with_capacity((last - first + 1) as usize);
        for index in first..=last {
            let sector = self.sector(index).await.map_err(|e| VfsError::Read {
                message: e.to_string(),
            })?;
            sectors.push(sector);
        }
        Ok(sectors)
    }

    /// Fetch the last sector of the file.
    ///
    /// The store gives strong read-after-write per key within one
    /// client, so the list count is trusted: `count` sectors means the
    /// last one has index `count - 1`.
    pub async fn last_sector(&self) -> Result<Sector, VfsError> {
        let count = self.sector_count().await?;
        if count == 0 {
            return Err(VfsError::Empty {
                name: self.raw_name.clone(),
            });
        }
        self.sector(count - 1).await
    }

    /// Number of sector objects carrying this file's label set.
    pub async fn sector_count(&self) -> Result<u64, StoreError> {
        let items = self.store.list(&self.namespace, &self.selector()).await?;
        Ok(items.len() as u64)
    }

    /// Every sector object of this file, as stored.
    pub async fn list_sectors(&self) -> Result<Vec<StoredObject>, StoreError> {
        self.store.list(&self.namespace, &self.selector()).await
    }

    /// Delete sector `index`. Absence is a no-op.
    pub async fn delete_sector(&self, index: u64) -> Result<(), StoreError> {
        let name = sector_object_name(&self.encoded_name, index);
        match self.store.delete(&self.namespace, &name).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => {
                log::error!("deleting sector {} failed: {}", name, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectormap_store::MemoryObjectStore;

    fn sector_store(store: Arc<MemoryObjectStore>) -> SectorStore {
        SectorStore::new(store, "dbs", "file0.db")
    }

    #[tokio::test]
    async fn test_write_then_read_back() {
        let store = Arc::new(MemoryObjectStore::new());
        let sectors = sector_store(store.clone());

        let sect = Sector {
            index: 0,
            data: vec![1, 2, 3, 4],
        };
        sectors.write_sector(&sect).await.unwrap();
        assert_eq!(sectors.sector(0).await.unwrap(), sect);
    }

    #[tokio::test]
    async fn test_write_sector_is_an_upsert() {
        let store = Arc::new(MemoryObjectStore::new());
        let sectors = sector_store(store.clone());

        sectors
            .write_sector(&Sector {
                index: 0,
                data: vec![1],
            })
            .await
            .unwrap();
        sectors
            .write_sector(&Sector {
                index: 0,
                data: vec![2, 2],
            })
            .await
            .unwrap();

        assert_eq!(sectors.sector(0).await.unwrap().data, vec![2, 2]);
        assert_eq!(store.object_count("dbs"), 1);
    }

    #[tokio::test]
    async fn test_missing_sector_is_materialized_empty() {
        let store = Arc::new(MemoryObjectStore::new());
        let sectors = sector_store(store.clone());

        let sect = sectors.sector(5).await.unwrap();
        assert_eq!(sect.index, 5);
        assert!(sect.data.is_empty());
        // The materialized sector was persisted
        assert_eq!(store.object_count("dbs"), 1);
    }

    #[tokio::test]
    async fn test_sector_objects_carry_labels_and_filename() {
        let store = Arc::new(MemoryObjectStore::new());
        let sectors = sector_store(store.clone());
        sectors.write_sector(&Sector::empty(0)).await.unwrap();

        let name = sector_object_name(sectors.encoded_name(), 0);
        let object = store.get("dbs", &name).await.unwrap();
        assert_eq!(object.labels.get(LABEL_DATA).map(String::as_str), Some("sector"));
        assert_eq!(
            object.labels.get(LABEL_RELEVANT_FILE).map(String::as_str),
            Some(sectors.encoded_name())
        );
        assert_eq!(object.string_field(FIELD_FILENAME), Some("file0.db"));
    }

    #[tokio::test]
    async fn test_sector_range_is_inclusive_and_ordered() {
        let store = Arc::new(MemoryObjectStore::new());
        let sectors = sector_store(store.clone());
        for index in 0..4 {
            sectors
                .write_sector(&Sector {
                    index,
                    data: vec![index as u8],
                })
                .await
                .unwrap();
        }

        let range = sectors.sector_range(1, 3).await.unwrap();
        assert_eq!(range.len(), 3);
        assert_eq!(
            range.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_last_sector_trusts_list_count() {
        let store = Arc::new(MemoryObjectStore::new());
        let sectors = sector_store(store.clone());

        assert!(matches!(
            sectors.last_sector().await.unwrap_err(),
            VfsError::Empty { .. }
        ));

        for index in 0..3 {
            sectors
                .write_sector(&Sector {
                    index,
                    data: vec![0; 8],
                })
                .await
                .unwrap();
        }
        assert_eq!(sectors.last_sector().await.unwrap().index, 2);
    }

    #[tokio::test]
    async fn test_delete_sector_absent_is_noop() {
        let store = Arc::new(MemoryObjectStore::new());
        let sectors = sector_store(store.clone());
        sectors.delete_sector(7).await.unwrap();
    }

    #[tokio::test]
    async fn test_files_do_not_see_each_others_sectors() {
        let store = Arc::new(MemoryObjectStore::new());
        let a = SectorStore::new(store.clone(), "dbs", "a.db");
        let b = SectorStore::new(store.clone(), "dbs", "b.db");

        a.write_sector(&Sector::empty(0)).await.unwrap();
        a.write_sector(&Sector::empty(1)).await.unwrap();
        b.write_sector(&Sector::empty(0)).await.unwrap();

        assert_eq!(a.sector_count().await.unwrap(), 2);
        assert_eq!(b.sector_count().await.unwrap(), 1);
    }
}
