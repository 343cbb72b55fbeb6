//! Process-wide VFS registry.
//!
//! The engine looks plugins up by the name given in the connection
//! string (`vfs=<name>`). Registrations live for the life of the
//! process; there is no teardown.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::api::Vfs;
use crate::error::VfsError;

static REGISTRY: OnceLock<RwLock<HashMap<String, Arc<dyn Vfs>>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, Arc<dyn Vfs>>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register `vfs` under `name`.
///
/// # Errors
/// When a VFS is already registered under that name.
pub fn register(name: &str, vfs: Arc<dyn Vfs>) -> Result<(), VfsError> {
    let mut map = registry().write().unwrap();
    if map.contains_key(name) {
        return Err(VfsError::AlreadyRegistered {
            name: name.to_string(),
        });
    }
    map.insert(name.to_string(), vfs);
    Ok(())
}

/// Look up a registered VFS by name.
pub fn find(name: &str) -> Option<Arc<dyn Vfs>> {
    registry().read().unwrap().get(name).cloned()
}
