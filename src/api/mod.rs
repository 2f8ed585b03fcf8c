// Feed API module.
// Provides the REST client and types for the posts and users resources.

pub mod client;
pub mod endpoints;
pub mod source;
pub mod types;

pub use client::ApiClient;
pub use source::PostSource;
pub use types::*;
