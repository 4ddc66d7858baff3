mod pool;

pub use pool::{create_pool, ensure_schema, memory_pool};
