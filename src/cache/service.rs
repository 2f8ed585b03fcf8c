// Best-effort cache service over the SQLite store.
// Storage failures are logged and replaced by fallbacks instead of propagating.

use tracing::warn;

use crate::api::{Post, User};
use crate::error::Result;

use super::store::CacheDb;

/// Result of a best-effort cache operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheOutcome<T> {
    /// The store handled the request.
    Fresh(T),
    /// The store failed; `value` is the fallback handed back instead.
    Degraded { value: T, reason: String },
}

impl<T> CacheOutcome<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, CacheOutcome::Degraded { .. })
    }

    /// The value, whether fresh or fallback.
    pub fn into_inner(self) -> T {
        match self {
            CacheOutcome::Fresh(value) | CacheOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            CacheOutcome::Fresh(value) | CacheOutcome::Degraded { value, .. } => value,
        }
    }

    fn from_result(result: Result<T>, fallback: impl FnOnce() -> T, what: &str) -> Self {
        match result {
            Ok(value) => CacheOutcome::Fresh(value),
            Err(err) => {
                warn!(error = %err, "failed to {what}");
                CacheOutcome::Degraded {
                    value: fallback(),
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// Cache facade used by the feed.
#[derive(Clone)]
pub struct CacheService {
    db: CacheDb,
}

impl CacheService {
    pub fn new(db: CacheDb) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Initialize the underlying store. Unlike the other operations this
    /// reports failure; callers decide whether running without a cache is
    /// acceptable.
    pub fn warm(&self) -> Result<()> {
        self.db.initialize()
    }

    pub fn save_posts(&self, posts: &[Post]) -> CacheOutcome<()> {
        CacheOutcome::from_result(self.db.upsert_posts(posts), || (), "cache posts")
    }

    pub fn load_posts(&self) -> CacheOutcome<Vec<Post>> {
        CacheOutcome::from_result(self.db.fetch_cached_posts(), Vec::new, "read cached posts")
    }

    pub fn save_users(&self, users: &[User]) -> CacheOutcome<()> {
        CacheOutcome::from_result(self.db.upsert_users(users), || (), "cache users")
    }

    pub fn load_users(&self) -> CacheOutcome<Vec<User>> {
        CacheOutcome::from_result(self.db.fetch_cached_users(), Vec::new, "read cached users")
    }
}
