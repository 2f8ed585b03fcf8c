// Bordado Social feed core.
// Local post/user cache, feed REST client, and the paginated feed state.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod state;

pub use error::{BordadoError, Result};
