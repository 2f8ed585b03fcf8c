// Feed API endpoint functions.
// Typed methods for the posts, users, and comments resources.

use crate::error::Result;

use super::client::ApiClient;
use super::types::{Comment, NewPost, Post, User};

impl ApiClient {
    /// Get one page of posts. A short or empty page means there are no more.
    pub async fn get_posts(&self, limit: u32, page: u32) -> Result<Vec<Post>> {
        let params = [("_limit", limit.to_string()), ("_page", page.to_string())];
        let response = self.get_with_params("/posts", &params).await?;
        let posts: Vec<Post> = response.json().await?;
        Ok(posts)
    }

    /// Get a single post.
    pub async fn get_post(&self, id: i64) -> Result<Post> {
        let response = self.get(&format!("/posts/{}", id)).await?;
        let post: Post = response.json().await?;
        Ok(post)
    }

    /// Create a post. The server echoes the created post back.
    pub async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let response = self.post_json("/posts", post).await?;
        let created: Post = response.json().await?;
        Ok(created)
    }

    /// Get all users.
    pub async fn get_users(&self) -> Result<Vec<User>> {
        let response = self.get("/users").await?;
        let users: Vec<User> = response.json().await?;
        Ok(users)
    }

    /// Get a single user.
    pub async fn get_user(&self, id: i64) -> Result<User> {
        let response = self.get(&format!("/users/{}", id)).await?;
        let user: User = response.json().await?;
        Ok(user)
    }

    /// Get the comments on a post.
    pub async fn get_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let response = self.get(&format!("/posts/{}/comments", post_id)).await?;
        let comments: Vec<Comment> = response.json().await?;
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::serve;
    use crate::error::BordadoError;
    use reqwest::header::HeaderMap;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(base_url, None, HeaderMap::new()).unwrap()
    }

    #[tokio::test]
    async fn test_get_posts_page_query() {
        let (base_url, seen) = serve(vec![(
            200,
            r#"[{"userId": 1, "id": 11, "title": "t", "body": "b"}]"#,
        )]);

        let posts = client(&base_url).get_posts(10, 2).await.unwrap();

        assert_eq!(posts, vec![Post::new(11, "t", "b", 1)]);
        assert_eq!(seen.recv().unwrap().url, "/posts?_limit=10&_page=2");
    }

    #[tokio::test]
    async fn test_get_post_and_user_by_id() {
        let (base_url, seen) = serve(vec![
            (200, r#"{"userId": 2, "id": 5, "title": "t", "body": "b"}"#),
            (
                200,
                r#"{"id": 2, "name": "Ana", "username": "ana", "email": "ana@example.com"}"#,
            ),
        ]);
        let client = client(&base_url);

        assert_eq!(client.get_post(5).await.unwrap().user_id, 2);
        assert_eq!(seen.recv().unwrap().url, "/posts/5");

        assert_eq!(client.get_user(2).await.unwrap().name, "Ana");
        assert_eq!(seen.recv().unwrap().url, "/users/2");
    }

    #[tokio::test]
    async fn test_create_post_sends_json_body() {
        let (base_url, seen) = serve(vec![(
            201,
            r#"{"userId": 1, "id": 101, "title": "novo", "body": "bordado"}"#,
        )]);
        let new_post = NewPost {
            title: "novo".to_string(),
            body: "bordado".to_string(),
            user_id: 1,
        };

        let created = client(&base_url).create_post(&new_post).await.unwrap();
        assert_eq!(created.id, 101);

        let seen = seen.recv().unwrap();
        assert_eq!(seen.method, "POST");
        assert_eq!(seen.url, "/posts");
        let sent: NewPost = serde_json::from_str(&seen.body).unwrap();
        assert_eq!(sent, new_post);
    }

    #[tokio::test]
    async fn test_get_users_and_comments() {
        let (base_url, seen) = serve(vec![
            (
                200,
                r#"[{"id": 1, "name": "Ana", "username": "ana", "email": "a@x"}]"#,
            ),
            (200, r#"[{"postId": 3, "id": 1, "body": "lindo!"}]"#),
        ]);
        let client = client(&base_url);

        assert_eq!(client.get_users().await.unwrap().len(), 1);
        assert_eq!(seen.recv().unwrap().url, "/users");

        let comments = client.get_comments(3).await.unwrap();
        assert_eq!(comments[0].0["body"], "lindo!");
        assert_eq!(seen.recv().unwrap().url, "/posts/3/comments");
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let (base_url, _seen) = serve(vec![(500, "{}")]);

        let err = client(&base_url).get_posts(10, 1).await.unwrap_err();
        assert!(matches!(err, BordadoError::Http { status: 500, .. }));
    }
}
