// Cache module for local filesystem caching.
// Persists the repository list between launcher invocations.

pub mod paths;
pub mod store;

pub use store::{CacheEntry, CacheStore};
