// Feed REST API HTTP client.
// Applies JSON headers and timeouts, and converts non-success statuses into errors.

use std::time::Duration;

use reqwest::{
    Client, Method, RequestBuilder, Response,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::{BordadoError, Result};

/// Feed API client.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// `extra_headers` are sent with every request and win over the default
    /// `Content-Type: application/json`.
    pub fn new(base_url: &str, timeout: Option<Duration>, extra_headers: HeaderMap) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(extra_headers);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from loaded settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.api_base_url,
            Some(settings.request_timeout()),
            HeaderMap::new(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Start a request against an endpoint path such as `/posts`.
    pub fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.client.request(method, self.url(endpoint))
    }

    /// Send a request, merging per-request headers over the defaults.
    pub async fn send(&self, request: RequestBuilder, headers: Option<HeaderMap>) -> Result<Response> {
        let request = match headers {
            Some(headers) => request.headers(headers),
            None => request,
        };

        let response = request.send().await.inspect_err(|e| {
            warn!(error = %e, "API request failed");
        })?;

        debug!(url = %response.url(), status = %response.status(), "API response");
        Self::check_response(response)
    }

    /// Make a GET request.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        self.send(self.request(Method::GET, endpoint), None).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        self.send(self.request(Method::GET, endpoint).query(params), None)
            .await
    }

    /// Make a POST request with a JSON body.
    pub async fn post_json<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<Response> {
        let body = serde_json::to_vec(body)?;
        self.send(self.request(Method::POST, endpoint).body(body), None)
            .await
    }

    /// Check response status and convert errors.
    fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        warn!(%url, status = status.as_u16(), "API request failed");
        Err(BordadoError::Http {
            status: status.as_u16(),
            url,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::mpsc;

    /// What the canned server saw for one request.
    #[derive(Debug)]
    pub(crate) struct Seen {
        pub method: String,
        pub url: String,
        pub content_type: Option<String>,
        pub trace: Option<String>,
        pub body: String,
    }

    fn header_value(request: &tiny_http::Request, name: &'static str) -> Option<String> {
        request
            .headers()
            .iter()
            .find(|h| h.field.equiv(name))
            .map(|h| h.value.as_str().to_string())
    }

    /// Serve one canned `(status, body)` response per incoming request.
    pub(crate) fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<Seen>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            for (status, body) in responses {
                let Ok(mut request) = server.recv() else {
                    return;
                };

                let content_type = header_value(&request, "Content-Type");
                let trace = header_value(&request, "X-Trace");
                let mut content = String::new();
                let _ = request.as_reader().read_to_string(&mut content);

                let _ = tx.send(Seen {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    content_type,
                    trace,
                    body: content,
                });

                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                            .unwrap(),
                    );
                let _ = request.respond(response);
            }
        });

        (format!("http://{addr}"), rx)
    }

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(base_url, Some(Duration::from_secs(5)), HeaderMap::new()).unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_json_content_type() {
        let (base_url, seen) = serve(vec![(200, "[]")]);
        let client = client(&base_url);

        client.get("/users").await.unwrap();

        let seen = seen.recv().unwrap();
        assert_eq!(seen.method, "GET");
        assert_eq!(seen.url, "/users");
        assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_extra_and_per_request_headers_are_merged() {
        let (base_url, seen) = serve(vec![(200, "[]"), (200, "[]")]);
        let mut extra = HeaderMap::new();
        extra.insert("x-trace", HeaderValue::from_static("default"));
        let client = ApiClient::new(&base_url, None, extra).unwrap();

        client.get("/posts").await.unwrap();
        let first = seen.recv().unwrap();
        assert_eq!(first.trace.as_deref(), Some("default"));
        assert_eq!(first.content_type.as_deref(), Some("application/json"));

        let mut per_request = HeaderMap::new();
        per_request.insert("x-trace", HeaderValue::from_static("override"));
        client
            .send(client.request(Method::GET, "/posts"), Some(per_request))
            .await
            .unwrap();
        let second = seen.recv().unwrap();
        assert_eq!(second.trace.as_deref(), Some("override"));
        assert_eq!(second.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let (base_url, _seen) = serve(vec![(404, "{}")]);
        let client = client(&base_url);

        match client.get("/posts/999").await {
            Err(BordadoError::Http { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/posts/999"));
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Bind then drop a listener so the port is closed.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let client = client(&format!("http://{addr}"));

        let err = client.get("/posts").await.unwrap_err();
        assert!(matches!(err, BordadoError::Network(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = client("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
    }
}
