//! Storage contract layer.
//!
//! This module defines the traits every backend implements, the error
//! taxonomy shared by all of them, the batch staging buffer, and the
//! name-to-constructor registry used to open stores by backend name.

mod batch;
mod error;
mod traits;

pub mod registry;

pub use batch::{PendingOp, StagingBuffer};
pub use error::{StoreError, StoreResult};
pub use traits::{Batch, Database, DbIterator, Direction};
