use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use github_retriever::http::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
use github_retriever::{GithubRetriever, HttpRetriever, RetrieverError};
use mockito::{Matcher, Server};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use url::Url;

#[tokio::test]
async fn default_client_returns_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/owner/repo/main/flags.yaml")
        .with_status(200)
        .with_body("feature: true")
        .create_async()
        .await;

    let retriever = HttpRetriever::new(format!("{}/owner/repo/main/flags.yaml", server.url()));
    let body = retriever
        .retrieve(&CancellationToken::new())
        .await
        .expect("request should succeed");

    mock.assert_async().await;
    assert_eq!(body, b"feature: true");
}

#[tokio::test]
async fn default_client_sends_headers_and_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/search")
        .match_header("authorization", "token abc123")
        .match_body(Matcher::Exact("query".to_string()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let mut retriever = HttpRetriever::new(format!("{}/search", server.url()));
    retriever.method = Method::POST;
    retriever.body = Some("query".to_string());
    retriever
        .headers
        .insert(AUTHORIZATION, HeaderValue::from_static("token abc123"));

    let body = retriever.retrieve(&CancellationToken::new()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(body, b"[]");
}

#[tokio::test]
async fn default_client_reports_error_status() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/owner/repo/main/missing.yaml")
        .with_status(404)
        .with_header("x-github-request-id", "F00D:1234")
        .with_header("x-ratelimit-remaining", "59")
        .with_body("404: Not Found")
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/owner/repo/main/missing.yaml", server.url());
    let retriever = HttpRetriever::new(url.clone());
    let err = retriever
        .retrieve(&CancellationToken::new())
        .await
        .unwrap_err();

    mock.assert_async().await;
    match err {
        RetrieverError::Status {
            url: failed_url,
            status,
            github_headers,
        } => {
            assert_eq!(failed_url, url);
            assert_eq!(status, 404);
            assert_eq!(github_headers["x-github-request-id"], "F00D:1234");
            assert_eq!(github_headers["x-ratelimit-remaining"], "59");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    // nothing listens on port 9 of localhost in the test environment
    let mut retriever = HttpRetriever::new("http://127.0.0.1:9/file");
    retriever.timeout = Duration::from_secs(2);

    let err = retriever
        .retrieve(&CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RetrieverError::Transport(_) | RetrieverError::Timeout { .. }
    ));
}

/// Routes every request to a local server, keeping path and headers.
struct RedirectingClient {
    base: Url,
    inner: ReqwestClient,
}

#[async_trait]
impl HttpClient for RedirectingClient {
    async fn execute(&self, mut request: HttpRequest) -> github_retriever::Result<HttpResponse> {
        let path = request.url.path().to_string();
        request.url = self.base.join(&path).expect("valid path");
        self.inner.execute(request).await
    }
}

#[tokio::test]
async fn github_retriever_through_custom_client() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/owner/repo/dev/config/flags.yaml")
        .match_header("authorization", "token abc123")
        .with_status(200)
        .with_body("feature: true")
        .expect(1)
        .create_async()
        .await;

    let client = RedirectingClient {
        base: Url::parse(&server.url()).unwrap(),
        inner: ReqwestClient::with_timeout(Duration::from_secs(5)).unwrap(),
    };

    let mut retriever = GithubRetriever::new("owner/repo", "config/flags.yaml")
        .with_branch("dev")
        .with_token("abc123");
    retriever.set_http_client(Arc::new(client));

    let body = retriever
        .retrieve(&CancellationToken::new())
        .await
        .expect("request should succeed");

    mock.assert_async().await;
    assert_eq!(body, b"feature: true");
}

#[tokio::test]
async fn github_retriever_without_token_sends_no_authorization() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/owner/repo/main/flags.yaml")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("feature: false")
        .create_async()
        .await;

    let client = RedirectingClient {
        base: Url::parse(&server.url()).unwrap(),
        inner: ReqwestClient::with_timeout(Duration::from_secs(5)).unwrap(),
    };

    let mut retriever = GithubRetriever::new("owner/repo", "flags.yaml");
    retriever.set_http_client(Arc::new(client));

    let body = retriever.retrieve(&CancellationToken::new()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(body, b"feature: false");
}

#[tokio::test]
async fn prebuilt_reqwest_client_is_used() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/flags.yaml")
        .match_header("user-agent", "flag-sync/1.0")
        .with_status(200)
        .with_body("feature: true")
        .expect(1)
        .create_async()
        .await;

    let inner = reqwest::Client::builder()
        .user_agent("flag-sync/1.0")
        .build()
        .unwrap();
    let mut retriever = HttpRetriever::new(format!("{}/flags.yaml", server.url()));
    retriever.set_http_client(Arc::new(ReqwestClient::from_client(inner)));

    let body = retriever.retrieve(&CancellationToken::new()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(body, b"feature: true");
}
