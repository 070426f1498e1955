pub mod memory;
pub mod schema;
pub mod sql;

pub use memory::MemorySnapshotStore;
pub use sql::SqlSnapshotStore;
