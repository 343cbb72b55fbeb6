//! The VFS the engine registers and calls.
//!
//! [`SectorVfs`] creates and destroys file handles. It holds the shared
//! object-store client, the namespace every object lands in, and the
//! retry budget for open and delete - the only two operations that
//! retry, because both race other clients creating or removing the same
//! objects.

use std::sync::Arc;

use tokio::runtime::Handle;

use sectormap_store::ObjectStore;

use crate::api::{AccessFlags, LockLevel, OpenFlags, Vfs, VfsFile};
use crate::error::VfsError;
use crate::file::SectorFile;
use crate::options::VfsOptions;
use crate::sector::Sector;

/// A VFS storing each file as labeled sector objects in one namespace.
pub struct SectorVfs {
    store: Arc<dyn ObjectStore>,
    options: VfsOptions,
    runtime: Handle,
}

impl SectorVfs {
    /// Create a VFS over `store`.
    ///
    /// Must be called within a tokio runtime; the runtime's handle is
    /// captured to serve the synchronous engine-facing calls.
    pub fn new(store: Arc<dyn ObjectStore>, options: VfsOptions) -> Result<Self, VfsError> {
        let runtime = Handle::try_current().map_err(|e| VfsError::Runtime {
            message: e.to_string(),
        })?;
        Ok(Self {
            store,
            options,
            runtime,
        })
    }

    fn file(&self, name: &str) -> SectorFile {
        SectorFile::new(
            self.store.clone(),
            &self.options.namespace,
            name,
            self.runtime.clone(),
        )
    }

    /// One attempt of the open sequence: make sure the lock object and
    /// sector zero exist, so every invariant holds before the handle is
    /// handed out.
    async fn try_open(&self, name: &str) -> Result<SectorFile, OpenAttempt> {
        let file = self.file(name);

        match file.locks().exists().await {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = file.locks().set_level(LockLevel::None).await {
                    log::warn!("creating lock object for {} failed: {}", name, e);
                    return Err(OpenAttempt::Retry);
                }
            }
            // The store answered but with a real failure; retrying the
            // whole sequence will not help.
            Err(e) => return Err(OpenAttempt::Fatal(VfsError::Io(e))),
        }

        let count = match file.sectors().sector_count().await {
            Ok(count) => count,
            Err(e) => {
                log::warn!("listing sectors for {} failed: {}", name, e);
                return Err(OpenAttempt::Retry);
            }
        };
        if count == 0 {
            if let Err(e) = file.sectors().write_sector(&Sector::empty(0)).await {
                log::error!("creating first sector for {} failed: {}", name, e);
                return Err(OpenAttempt::Fatal(VfsError::Io(e)));
            }
        }

        Ok(file)
    }

    /// One attempt of the delete sequence. True when every object of the
    /// file is confirmed gone.
    async fn try_delete(&self, name: &str) -> bool {
        let file = self.file(name);

        let items = match file.sectors().list_sectors().await {
            Ok(items) => items,
            Err(e) => {
                log::error!("listing sectors of {} for delete failed: {}", name, e);
                return false;
            }
        };

        let mut attempt_failed = false;
        for object in items {
            match self.store.delete(&self.options.namespace, &object.name).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    log::error!("deleting sector object {} failed: {}", object.name, e);
                    attempt_failed = true;
                }
            }
        }
        if attempt_failed {
            return false;
        }

        match self
            .store
            .delete(&self.options.namespace, file.locks().object_name())
            .await
        {
            Ok(()) => true,
            Err(e) if e.is_not_found() => true,
            Err(e) => {
                log::error!("deleting lock object of {} failed: {}", name, e);
                false
            }
        }
    }
}

enum OpenAttempt {
    /// Lost a race; worth another attempt.
    Retry,
    /// The store is answering with real errors; give up now.
    Fatal(VfsError),
}

impl Vfs for SectorVfs {
    fn open(
        &self,
        name: &str,
        flags: OpenFlags,
    ) -> Result<(Box<dyn VfsFile>, OpenFlags), VfsError> {
        log::debug!("open name={} flags={:#x}", name, flags.bits());
        let runtime = self.runtime.clone();
        runtime.block_on(async {
            // Fail fast when the store is unreachable.
            if let Err(e) = self.store.probe().await {
                log::error!("store probe failed: {}", e);
                return Err(VfsError::Io(e));
            }

            for _ in 0..self.options.retries {
                match self.try_open(name).await {
                    Ok(file) => return Ok((Box::new(file) as Box<dyn VfsFile>, flags)),
                    Err(OpenAttempt::Retry) => continue,
                    Err(OpenAttempt::Fatal(e)) => return Err(e),
                }
            }
            Err(VfsError::OpenRetriesExhausted {
                name: name.to_string(),
                attempts: self.options.retries,
            })
        })
    }

    fn delete(&self, name: &str, dir_sync: bool) -> Result<(), VfsError> {
        log::debug!("delete name={} dir_sync={}", name, dir_sync);
        let runtime = self.runtime.clone();
        runtime.block_on(async {
            for _ in 0..=self.options.retries {
                if self.try_delete(name).await {
                    return Ok(());
                }
            }
            log::error!("failed to delete {} within the retry budget", name);
            Err(VfsError::DeleteRetriesExhausted {
                name: name.to_string(),
                attempts: self.options.retries + 1,
            })
        })
    }

    fn access(&self, name: &str, _flags: AccessFlags) -> Result<bool, VfsError> {
        // Journal and WAL sidecars are reported absent so the engine
        // keeps its journaling in memory; storing them as sector files
        // only produces spurious end-of-file errors on their first read.
        if name.ends_with("-wal") || name.ends_with("-journal") {
            return Ok(false);
        }
        Ok(true)
    }

    fn full_pathname(&self, name: &str) -> String {
        name.to_string()
    }
}
