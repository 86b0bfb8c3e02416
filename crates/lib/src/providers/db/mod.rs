pub mod memory;
pub mod sqlite;
pub mod storage;

pub use memory::MemoryInsightStore;
pub use sqlite::SqliteInsightStore;
pub use storage::InsightStore;
