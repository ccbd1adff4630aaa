//! Backend registry: name-to-constructor wiring.
//!
//! Pure plumbing with no semantic contract beyond "name opens this kind of
//! store". The built-in backends are pre-seeded; hosts can register their
//! own before opening stores by name.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use parking_lot::RwLock;

use super::{Database, StoreError, StoreResult};
use crate::backends;

/// Constructor signature backends register: a logical store name plus the
/// directory its files live under.
pub type DbCreator = fn(&str, &Path) -> StoreResult<Box<dyn Database>>;

/// Name of the built-in redb backend.
pub const REDB_BACKEND: &str = "redb";

/// Name of the built-in in-memory backend.
pub const MEMORY_BACKEND: &str = "memory";

static REGISTRY: LazyLock<RwLock<BTreeMap<&'static str, DbCreator>>> = LazyLock::new(|| {
    let mut builtin: BTreeMap<&'static str, DbCreator> = BTreeMap::new();
    builtin.insert(REDB_BACKEND, backends::redb::create);
    builtin.insert(MEMORY_BACKEND, backends::memory::create);
    RwLock::new(builtin)
});

/// Register a backend under `name`. Returns `false` if the name is already
/// taken, leaving the existing registration in place.
pub fn register_backend(name: &'static str, creator: DbCreator) -> bool {
    let mut registry = REGISTRY.write();
    if registry.contains_key(name) {
        return false;
    }
    registry.insert(name, creator);
    true
}

/// Open the store `name` under `dir` using the backend registered as
/// `backend`.
pub fn open_db(backend: &str, name: &str, dir: &Path) -> StoreResult<Box<dyn Database>> {
    let creator = REGISTRY
        .read()
        .get(backend)
        .copied()
        .ok_or_else(|| StoreError::UnknownBackend(backend.to_string()))?;
    creator(name, dir)
}
