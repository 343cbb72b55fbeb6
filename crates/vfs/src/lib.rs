//! Sector-mapped virtual file system over a namespaced object store.
//!
//! This crate lets an embedded SQL engine keep ordinary database files
//! in a config-map style key/value store: each 64KB sector of a file is
//! one labeled object, and an advisory lock object rides alongside.
//!
//! # Architecture
//!
//! ```text
//! engine -> SectorVfs (open/delete/access/full_pathname)
//!             -> SectorFile (read_at/write_at/truncate/locks)
//!                  -> SectorStore / LockStore (per-file object CRUD)
//!                       -> ObjectStore client (injected)
//! ```
//!
//! The engine-facing surface ([`Vfs`], [`VfsFile`]) is synchronous;
//! store I/O is async and runs on the tokio runtime the VFS was created
//! under. Journal and WAL sidecar files are reported absent from
//! `access`, which makes the engine keep its journaling in memory.

pub mod api;
pub mod error;
pub mod file;
pub mod lock;
pub mod options;
pub mod registry;
pub mod sector;
pub mod sectors;
pub mod vfs;

pub use api::{AccessFlags, DeviceCharacteristics, LockLevel, OpenFlags, Vfs, VfsFile};
pub use error::VfsError;
pub use file::SectorFile;
pub use options::VfsOptions;
pub use sector::Sector;
pub use vfs::SectorVfs;
