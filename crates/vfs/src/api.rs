//! The interface the SQL engine consumes.
//!
//! The engine talks to a registered VFS through a small capability set:
//! a [`Vfs`] that opens and deletes named files, and a [`VfsFile`] handle
//! for byte-range I/O and advisory locking. Any implementation of these
//! traits plugs in; [`SectorVfs`](crate::SectorVfs) is the config-map
//! backed one.

use std::fmt;
use std::str::FromStr;

use crate::error::VfsError;

/// Advisory lock levels, in escalation order.
///
/// The ordering is meaningful: `Lock` requests only ever move up,
/// `Unlock` requests only ever move down. The level is persisted as its
/// lowercase string form in the file's lock object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LockLevel {
    /// No lock held.
    None,
    /// Read lock, shared with other connections.
    Shared,
    /// Intent to write; still allows shared readers.
    Reserved,
    /// Transitional state on the way to exclusive. Never requested
    /// explicitly by the engine.
    Pending,
    /// Sole access.
    Exclusive,
}

impl fmt::Display for LockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LockLevel::None => "none",
            LockLevel::Shared => "shared",
            LockLevel::Reserved => "reserved",
            LockLevel::Pending => "pending",
            LockLevel::Exclusive => "exclusive",
        };
        f.write_str(s)
    }
}

impl FromStr for LockLevel {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(LockLevel::None),
            "shared" => Ok(LockLevel::Shared),
            "reserved" => Ok(LockLevel::Reserved),
            "pending" => Ok(LockLevel::Pending),
            "exclusive" => Ok(LockLevel::Exclusive),
            other => Err(VfsError::UnknownLockState {
                value: other.to_string(),
            }),
        }
    }
}

/// Flags the engine passes to [`Vfs::open`].
///
/// Opaque to this VFS: they are handed back unchanged from `open`, as the
/// storage layout does not distinguish read-only from read-write opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags(pub u32);

impl OpenFlags {
    /// Raw flag bits as passed by the engine.
    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Permission the engine is asking about in [`Vfs::access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessFlags {
    /// Does the file exist?
    Exists,
    /// Can the file be read and written?
    ReadWrite,
    /// Can the file be read?
    Read,
}

/// Device characteristic bits advertised to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceCharacteristics(u32);

impl DeviceCharacteristics {
    /// Aligned 64KB writes land atomically. Each sector is one object
    /// and every object write is a single store call, so this holds.
    pub const ATOMIC_64K: DeviceCharacteristics = DeviceCharacteristics(0x0000_0100);

    /// Raw characteristic bits.
    pub fn bits(self) -> u32 {
        self.0
    }
}

/// An open file handle.
///
/// The engine serializes calls per open connection, so implementations
/// may assume single-threaded access to one handle.
pub trait VfsFile: Send + std::fmt::Debug {
    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// # Returns
    /// Bytes read. Reads that start at or run past the current end of
    /// file fail with [`VfsError::EndOfFile`], which carries the number
    /// of bytes that were produced before the end was reached.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, VfsError>;

    /// Write `buf` starting at `offset`, extending the file as needed.
    ///
    /// # Returns
    /// Bytes written. A failure partway through reports the bytes
    /// persisted before it via [`VfsError::Write`].
    fn write_at(&mut self, buf: &[u8], offset: u64) -> Result<usize, VfsError>;

    /// Shrink the file to `size` bytes. Growing is a no-op.
    fn truncate(&mut self, size: u64) -> Result<(), VfsError>;

    /// Current file size in bytes.
    fn file_size(&mut self) -> Result<u64, VfsError>;

    /// Flush buffered writes. Every write here is already synchronous at
    /// the store layer, so this does nothing.
    fn sync(&mut self) -> Result<(), VfsError>;

    /// The natural write granularity of the underlying storage.
    fn sector_size(&self) -> u64;

    /// Storage guarantees advertised to the engine.
    fn device_characteristics(&self) -> DeviceCharacteristics;

    /// Escalate the advisory lock to `level`.
    fn lock(&mut self, level: LockLevel) -> Result<(), VfsError>;

    /// De-escalate the advisory lock to `level` (`Shared` or `None`).
    fn unlock(&mut self, level: LockLevel) -> Result<(), VfsError>;

    /// True when any connection holds a lock above [`LockLevel::None`].
    fn check_reserved_lock(&mut self) -> Result<bool, VfsError>;

    /// Release the handle, dropping the lock to [`LockLevel::None`].
    fn close(&mut self) -> Result<(), VfsError>;
}

/// A virtual file system the engine can be pointed at.
pub trait Vfs: Send + Sync {
    /// Open (creating if necessary) the file called `name`.
    ///
    /// # Returns
    /// The open handle plus the effective open flags.
    fn open(&self, name: &str, flags: OpenFlags)
        -> Result<(Box<dyn VfsFile>, OpenFlags), VfsError>;

    /// Remove `name` and all its storage.
    fn delete(&self, name: &str, dir_sync: bool) -> Result<(), VfsError>;

    /// Report whether `name` is present / usable for `flags`.
    fn access(&self, name: &str, flags: AccessFlags) -> Result<bool, VfsError>;

    /// Canonical form of `name`. This VFS has a single flat namespace,
    /// so the name comes back unchanged.
    fn full_pathname(&self, name: &str) -> String;
}
