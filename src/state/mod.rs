// State management module.
// Holds the paginated feed state the UI renders from.

pub mod feed;

pub use feed::{FeedController, FeedSnapshot, FeedStatus};
