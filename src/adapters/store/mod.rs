//! Key-value store adapters.

pub mod in_memory;
pub mod redis;

pub use in_memory::InMemoryStore;
pub use redis::RedisKeyValueStore;
