// Feed pagination state.
// Merges pages from a post source into one list for infinite scroll and pull-to-refresh.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, warn};

use crate::api::{Post, PostSource};
use crate::cache::CacheService;

/// Coarse state of the feed, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Idle,
    Loading,
    /// An empty page was seen; only a refresh loads more.
    Exhausted,
    /// The last load failed; already loaded posts are kept.
    Errored,
}

/// Read-only view of the feed for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub posts: Vec<Post>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub refreshing: bool,
    /// Last page applied to `posts`.
    pub page: u32,
    pub status: FeedStatus,
}

impl FeedStatus {
    fn from_flags(loading: bool, errored: bool, has_more: bool) -> Self {
        if loading {
            FeedStatus::Loading
        } else if errored {
            FeedStatus::Errored
        } else if !has_more {
            FeedStatus::Exhausted
        } else {
            FeedStatus::Idle
        }
    }
}

#[derive(Debug)]
struct FeedState {
    posts: Vec<Post>,
    page: u32,
    /// Whether any page has been applied since creation or the last refresh.
    loaded: bool,
    has_more: bool,
    loading: bool,
    refreshing: bool,
    error: Option<String>,
    /// Bumped for every issued fetch; only the newest fetch may apply its result.
    generation: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            page: 1,
            loaded: false,
            has_more: true,
            loading: false,
            refreshing: false,
            error: None,
            generation: 0,
        }
    }
}

/// Paginated feed owned by a single screen.
pub struct FeedController {
    source: Arc<dyn PostSource>,
    cache: Option<CacheService>,
    page_size: u32,
    state: Mutex<FeedState>,
}

impl FeedController {
    pub fn new(source: Arc<dyn PostSource>, page_size: u32) -> Self {
        Self {
            source,
            cache: None,
            page_size,
            state: Mutex::new(FeedState::default()),
        }
    }

    /// Save every fetched page into `cache` as well.
    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = Some(cache);
        self
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.lock();
        FeedSnapshot {
            posts: state.posts.clone(),
            loading: state.loading,
            error: state.error.clone(),
            has_more: state.has_more,
            refreshing: state.refreshing,
            page: state.page,
            status: FeedStatus::from_flags(state.loading, state.error.is_some(), state.has_more),
        }
    }

    pub fn status(&self) -> FeedStatus {
        let state = self.lock();
        FeedStatus::from_flags(state.loading, state.error.is_some(), state.has_more)
    }

    /// First load when the feed is shown.
    pub async fn load_initial(&self) {
        self.load_posts(1, false).await;
    }

    /// Fetch `page` and merge it into the list.
    ///
    /// Page 1 and refreshes replace the list; later pages are appended in
    /// arrival order without deduplication. An empty page marks the feed as
    /// exhausted and leaves the list alone, except that an empty refresh
    /// empties it. Failures are recorded in `error` and leave the list alone.
    /// Does nothing while another load is in flight, unless `is_refresh`.
    pub async fn load_posts(&self, page: u32, is_refresh: bool) {
        let generation = {
            let mut state = self.lock();
            if state.loading && !is_refresh {
                debug!(page, "load already in flight, skipping");
                return;
            }
            state.loading = true;
            state.error = None;
            state.generation += 1;
            state.generation
        };

        debug!(page, is_refresh, "loading posts");
        let result = self.source.fetch_posts(self.page_size, page).await;

        if let (Ok(posts), Some(cache)) = (&result, &self.cache)
            && !posts.is_empty()
        {
            // SQLite writes block; keep them off the runtime threads.
            let cache = cache.clone();
            let posts = posts.clone();
            if let Err(e) = tokio::task::spawn_blocking(move || cache.save_posts(&posts)).await {
                warn!(page, error = %e, "cache write task failed");
            }
        }

        let mut state = self.lock();
        if state.generation != generation {
            debug!(page, "discarding result of superseded load");
            return;
        }

        state.loading = false;
        state.refreshing = false;

        match result {
            Ok(posts) if posts.is_empty() => {
                debug!(page, "empty page, no more posts");
                state.has_more = false;
                if is_refresh {
                    state.posts.clear();
                }
            }
            Ok(posts) => {
                debug!(page, count = posts.len(), "loaded posts");
                if is_refresh || page == 1 {
                    state.posts = posts;
                } else {
                    state.posts.extend(posts);
                }
                state.page = page;
                state.loaded = true;
            }
            Err(err) => {
                error!(page, error = %err, "failed to load posts");
                state.error = Some(err.to_string());
            }
        }
    }

    /// Load the page after the last loaded one, if there is more and nothing
    /// is in flight.
    pub async fn load_more_posts(&self) {
        let next = {
            let state = self.lock();
            if !state.has_more || state.loading {
                return;
            }
            if state.loaded { state.page + 1 } else { state.page }
        };
        self.load_posts(next, false).await;
    }

    /// Pull-to-refresh: start over from page 1.
    pub async fn refresh_posts(&self) {
        {
            let mut state = self.lock();
            state.refreshing = true;
            state.page = 1;
            state.has_more = true;
            state.loaded = false;
        }
        self.load_posts(1, true).await;
    }
}
