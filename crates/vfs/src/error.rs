//! Error types for the VFS crate.
//!
//! The engine only acts on the error code, so variants map one-to-one
//! onto the codes it understands (generic I/O, read, short read, end of
//! file). Extra context is logged at the failure site rather than
//! wrapped into the error.

use thiserror::Error;

use sectormap_store::StoreError;

use crate::api::LockLevel;

/// Errors that can occur during VFS operations.
#[derive(Debug, Error)]
pub enum VfsError {
    /// Store call failed; surfaced to the engine as its generic I/O code.
    #[error("I/O error: {0}")]
    Io(#[from] StoreError),

    /// A sector fetch failed while assembling a byte range.
    #[error("Read failed: {message}")]
    Read {
        /// Underlying store failure.
        message: String,
    },

    /// A single sector came back unreadable; the engine treats this as a
    /// short read.
    #[error("Short read of sector {name}: {message}")]
    ShortRead {
        /// Object name of the sector that failed.
        name: String,
        /// Underlying store failure.
        message: String,
    },

    /// A sector upsert failed partway through a write. `written` bytes
    /// were persisted before the failure.
    #[error("Write failed after {written} bytes: {message}")]
    Write {
        /// Bytes persisted before the failure.
        written: usize,
        /// Underlying store failure.
        message: String,
    },

    /// The request starts at or runs past the end of the file. `read`
    /// bytes were produced before the end was reached; the engine
    /// zero-fills the remainder of its buffer.
    #[error("End of file after {read} bytes")]
    EndOfFile {
        /// Bytes read before end of file.
        read: usize,
    },

    /// The file has no sectors at all. Never observed through a handle
    /// produced by open, which guarantees sector zero exists.
    #[error("File {name} has no sectors")]
    Empty {
        /// Raw filename.
        name: String,
    },

    /// The requested lock escalation is not a permitted transition.
    #[error("Invalid lock transition from {from} to {requested}")]
    InvalidLockTransition {
        /// Level currently held.
        from: LockLevel,
        /// Level that was requested.
        requested: LockLevel,
    },

    /// The persisted lock state is not one of the five level strings.
    #[error("Unknown lock state {value:?}")]
    UnknownLockState {
        /// The string found in the lock object.
        value: String,
    },

    /// Open kept losing races against another client and gave up.
    #[error("Failed to open {name} after {attempts} attempts")]
    OpenRetriesExhausted {
        /// Raw filename.
        name: String,
        /// Attempts made.
        attempts: u32,
    },

    /// Delete could not remove every object within its retry budget.
    #[error("Failed to delete {name} after {attempts} attempts")]
    DeleteRetriesExhausted {
        /// Raw filename.
        name: String,
        /// Attempts made.
        attempts: u32,
    },

    /// A VFS was constructed outside a tokio runtime.
    #[error("No tokio runtime: {message}")]
    Runtime {
        /// Error from the runtime handle lookup.
        message: String,
    },

    /// A VFS with this name is already registered.
    #[error("A VFS named {name} is already registered")]
    AlreadyRegistered {
        /// The contested registration name.
        name: String,
    },
}
