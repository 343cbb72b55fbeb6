//! The per-open-file object.
//!
//! A [`SectorFile`] maps byte-range reads and writes onto whole-sector
//! object operations: reads assemble the covering sector run, writes
//! read-modify-write each affected sector (sectors are opaque blobs, so
//! a partial overwrite has to fetch, merge and rewrite). The engine-facing
//! methods are synchronous; store I/O runs on the tokio runtime the file
//! was created under, bridged with `block_on`.

use std::sync::Arc;

use tokio::runtime::Handle;

use sectormap_common::SECTOR_SIZE;
use sectormap_store::ObjectStore;

use crate::api::{DeviceCharacteristics, LockLevel, VfsFile};
use crate::error::VfsError;
use crate::lock::{validate_lock, validate_unlock, LockStore};
use crate::sector::sector_index_for;
use crate::sectors::SectorStore;

/// An open file backed by sector objects.
pub struct SectorFile {
    sectors: SectorStore,
    locks: LockStore,
    runtime: Handle,
}

impl std::fmt::Debug for SectorFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectorFile").finish_non_exhaustive()
    }
}

impl SectorFile {
    /// Create a handle for `raw_name` in `namespace`.
    ///
    /// Cheap: no store calls are made until an operation runs.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        namespace: &str,
        raw_name: &str,
        runtime: Handle,
    ) -> Self {
        Self {
            sectors: SectorStore::new(store.clone(), namespace, raw_name),
            locks: LockStore::new(store, namespace, raw_name),
            runtime,
        }
    }

    pub(crate) fn sectors(&self) -> &SectorStore {
        &self.sectors
    }

    pub(crate) fn locks(&self) -> &LockStore {
        &self.locks
    }

    /// Current size: index of the last sector times the sector size,
    /// plus whatever the last sector holds. A file with no sectors at
    /// all is empty.
    async fn size(&self) -> Result<u64, VfsError> {
        match self.sectors.last_sector().await {
            Ok(last) => Ok(last.index * SECTOR_SIZE + last.data.len() as u64),
            Err(VfsError::Empty { .. }) => Ok(0),
            Err(e) => Err(e),
        }
    }

    async fn read_range(&self, buf: &mut [u8], offset: u64) -> Result<usize, VfsError> {
        if buf.is_empty() {
            return Ok(0);
        }

        let first_sector = sector_index_for(offset);
        let file_size = self.size().await?;
        if offset >= file_size {
            return Err(VfsError::EndOfFile { read: 0 });
        }

        // Clamp the range to the file so we never fetch past the last
        // sector.
        let mut last_byte = offset + buf.len() as u64 - 1;
        if last_byte > file_size - 1 {
            last_byte = file_size - 1;
        }
        let last_sector = sector_index_for(last_byte);

        let sectors = self.sectors.sector_range(first_sector, last_sector).await?;

        let mut read = 0usize;
        for (i, sector) in sectors.iter().enumerate() {
            if i == 0 {
                let start = (offset % SECTOR_SIZE) as usize;
                let available = sector.data.len().saturating_sub(start);
                let count = available.min(buf.len());
                if count > 0 {
                    buf[..count].copy_from_slice(&sector.data[start..start + count]);
                }
                read = count;
            } else {
                let count = sector.data.len().min(buf.len() - read);
                buf[read..read + count].copy_from_slice(&sector.data[..count]);
                read += count;
            }
        }

        if last_byte >= file_size - 1 {
            return Err(VfsError::EndOfFile { read });
        }
        if read < buf.len() {
            log::error!(
                "read at offset {} produced {} of {} bytes",
                offset,
                read,
                buf.len()
            );
            return Err(VfsError::EndOfFile { read });
        }
        Ok(read)
    }

    async fn write_range(&self, buf: &[u8], offset: u64) -> Result<usize, VfsError> {
        if buf.is_empty() {
            return Ok(0);
        }

        let first_sector = sector_index_for(offset);
        let last_byte = offset + buf.len() as u64 - 1;
        let last_sector = sector_index_for(last_byte);

        // Missing sectors come back empty, so a write past the current
        // end of file extends it.
        let sectors = self.sectors.sector_range(first_sector, last_sector).await?;

        let mut written = 0usize;
        for mut sector in sectors {
            let start_byte = sector.start_byte();
            let current_offset = offset + written as u64;

            // Interior sectors of the range are brought to full size;
            // the final sector grows to cover the write but never
            // shrinks below its existing data.
            let target_len = if last_byte > sector.last_possible_byte() {
                SECTOR_SIZE as usize
            } else {
                let required = (last_byte - start_byte + 1) as usize;
                required.max(sector.data.len())
            };

            let mut data = vec![0u8; target_len];
            let keep = sector.data.len().min(target_len);
            data[..keep].copy_from_slice(&sector.data[..keep]);

            let at = (current_offset - start_byte) as usize;
            let count = (target_len - at).min(buf.len() - written);
            data[at..at + count].copy_from_slice(&buf[written..written + count]);
            sector.data = data;

            if let Err(e) = self.sectors.write_sector(&sector).await {
                log::error!("write at offset {} failed on sector {}: {}", offset, sector.index, e);
                return Err(VfsError::Write {
                    written,
                    message: e.to_string(),
                });
            }
            written += count;
        }

        Ok(written)
    }

    async fn shrink(&self, size: u64) -> Result<(), VfsError> {
        let file_size = self.size().await?;
        if size >= file_size {
            return Ok(());
        }

        // Trim the sector the new end falls into, then drop everything
        // after it. The kept sector is excluded from the delete range.
        let keep = sector_index_for(size);
        let mut sector = self.sectors.sector(keep).await?;
        sector.data.truncate((size % SECTOR_SIZE) as usize);
        self.sectors.write_sector(&sector).await.map_err(VfsError::Io)?;

        let old_last = sector_index_for(file_size - 1);
        for index in (keep + 1)..=old_last {
            self.sectors.delete_sector(index).await.map_err(VfsError::Io)?;
        }
        Ok(())
    }
}

impl VfsFile for SectorFile {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, VfsError> {
        log::debug!(
            "read_at file={} offset={} len={}",
            self.sectors.encoded_name(),
            offset,
            buf.len()
        );
        self.runtime.clone().block_on(self.read_range(buf, offset))
    }

    fn write_at(&mut self, buf: &[u8], offset: u64) -> Result<usize, VfsError> {
        log::debug!(
            "write_at file={} offset={} len={}",
            self.sectors.encoded_name(),
            offset,
            buf.len()
        );
        self.runtime.clone().block_on(self.write_range(buf, offset))
    }

    fn truncate(&mut self, size: u64) -> Result<(), VfsError> {
        log::debug!("truncate file={} size={}", self.sectors.encoded_name(), size);
        self.runtime.clone().block_on(self.shrink(size))
    }

    fn file_size(&mut self) -> Result<u64, VfsError> {
        self.runtime.clone().block_on(self.size())
    }

    fn sync(&mut self) -> Result<(), VfsError> {
        // Writes go straight to the store; there is nothing buffered.
        Ok(())
    }

    fn sector_size(&self) -> u64 {
        SECTOR_SIZE
    }

    fn device_characteristics(&self) -> DeviceCharacteristics {
        DeviceCharacteristics::ATOMIC_64K
    }

    fn lock(&mut self, level: LockLevel) -> Result<(), VfsError> {
        log::debug!("lock file={} level={}", self.sectors.encoded_name(), level);
        self.runtime.clone().block_on(async {
            let current = self.locks.current_level().await?;
            match validate_lock(current, level)? {
                Some(next) => self.locks.set_level(next).await.map_err(VfsError::Io),
                None => Ok(()),
            }
        })
    }

    fn unlock(&mut self, level: LockLevel) -> Result<(), VfsError> {
        log::debug!("unlock file={} level={}", self.sectors.encoded_name(), level);
        self.runtime.clone().block_on(async {
            let current = self.locks.current_level().await?;
            match validate_unlock(current, level) {
                Some(next) => self.locks.set_level(next).await.map_err(VfsError::Io),
                None => Ok(()),
            }
        })
    }

    fn check_reserved_lock(&mut self) -> Result<bool, VfsError> {
        self.runtime.clone().block_on(async {
            let current = self.locks.current_level().await?;
            Ok(current > LockLevel::None)
        })
    }

    fn close(&mut self) -> Result<(), VfsError> {
        log::debug!("close file={}", self.sectors.encoded_name());
        self.runtime
            .clone()
            .block_on(self.locks.set_level(LockLevel::None))
            .map_err(VfsError::Io)
    }
}
