//! Configuration options for the VFS.

/// Configuration for a [`SectorVfs`](crate::SectorVfs).
///
/// # Example
///
/// ```ignore
/// let options = VfsOptions::default()
///     .with_namespace("databases")
///     .with_retries(3);
///
/// let vfs = SectorVfs::new(store, options)?;
/// ```
#[derive(Debug, Clone)]
pub struct VfsOptions {
    /// Target namespace for every object this VFS touches.
    pub namespace: String,
    /// Bound on the open/delete retry loops.
    pub retries: u32,
}

impl Default for VfsOptions {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            retries: 1,
        }
    }
}

impl VfsOptions {
    /// Set the target namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the retry budget for open and delete.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}
