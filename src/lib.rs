//! lodestore
//!
//! A backend-agnostic key-value storage contract and the backends that
//! implement it: synchronous get/set/delete, grouped batch writes, and
//! ordered forward/reverse range iteration over raw byte keys.
//!
//! # Modules
//!
//! - [`db`] - The storage contract: traits, errors, batch staging, and the
//!   backend registry
//! - [`backends`] - Concrete backend implementations
//!
//! # Example
//!
//! ```no_run
//! use lodestore::{open_db, REDB_BACKEND};
//!
//! # fn main() -> lodestore::StoreResult<()> {
//! let store = open_db(REDB_BACKEND, "blocks", std::path::Path::new("/var/data"))?;
//! store.set(b"height", b"42")?;
//!
//! let mut iter = store.iterator(Some(b"h"), None)?;
//! while iter.valid() {
//!     println!("{:?} = {:?}", iter.key()?, iter.value()?);
//!     iter.next()?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod db;

pub use db::registry::{open_db, register_backend, DbCreator, MEMORY_BACKEND, REDB_BACKEND};
pub use db::{Batch, Database, DbIterator, Direction, StoreError, StoreResult};
