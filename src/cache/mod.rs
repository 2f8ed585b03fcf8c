// Cache module for local offline storage.
// A strict SQLite store plus the best-effort service the feed talks to.

pub mod paths;
pub mod schema;
pub mod service;
pub mod store;

pub use service::{CacheOutcome, CacheService};
pub use store::CacheDb;
