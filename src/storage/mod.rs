//! Storage backends for quorum
//!
//! Records are stored through the `RecordStore` trait. The shipped
//! implementation is `MemoryStore`, which is authoritative for the
//! lifetime of the process and not durable.

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::{RecordStore, StorageError, StorageResult};
