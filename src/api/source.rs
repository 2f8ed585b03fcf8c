// Paginated post source consumed by the feed controller.

use async_trait::async_trait;

use crate::error::Result;

use super::client::ApiClient;
use super::types::Post;

/// Anything that can serve pages of posts.
///
/// Pages are 1-based. An empty page means the source is exhausted.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self, page_size: u32, page: u32) -> Result<Vec<Post>>;
}

#[async_trait]
impl PostSource for ApiClient {
    async fn fetch_posts(&self, page_size: u32, page: u32) -> Result<Vec<Post>> {
        self.get_posts(page_size, page).await
    }
}
