//! Cache module - Redis client and verification code stores

pub mod code_cache;
pub mod memory_code_cache;
pub mod redis_client;


pub use code_cache::RedisCodeCache;
pub use memory_code_cache::MemoryCodeCache;
pub use redis_client::RedisClient;
