//! Chart cache.

mod store;

pub use store::CacheStore;
