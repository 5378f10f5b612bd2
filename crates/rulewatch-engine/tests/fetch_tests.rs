//! Integration tests for the HTTP fetcher.
//!
//! Each test stands up a wiremock server and checks how the response is
//! classified.

use rulewatch_core::model::FetchStatus;
use rulewatch_engine::config::FetchConfig;
use rulewatch_engine::fetch::{ContentFetcher, FetchOutcome, HttpFetcher, TransportErrorKind};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> FetchConfig {
    FetchConfig {
        timeout_secs: 1,
        user_agent: "rulewatch-test/1.0".to_string(),
        max_redirects: 3,
    }
}

fn url(server: &MockServer, p: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
}

#[tokio::test]
async fn test_success_returns_body_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/easylist.txt"))
        .and(header("user-agent", "rulewatch-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("||ads.example^\n##.banner\n"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&test_config()).unwrap();
    let outcome = fetcher.fetch(&url(&server, "/easylist.txt")).await;

    assert_eq!(
        outcome,
        FetchOutcome::Success {
            status: 200,
            body: "||ads.example^\n##.banner\n".to_string(),
        }
    );
}

#[tokio::test]
async fn test_not_found_is_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.txt"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&test_config()).unwrap();
    let outcome = fetcher.fetch(&url(&server, "/gone.txt")).await;

    assert_eq!(outcome, FetchOutcome::HttpFailure { status: 404 });
    assert_eq!(outcome.status(), FetchStatus::Http(404));
}

#[tokio::test]
async fn test_server_error_is_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&test_config()).unwrap();
    let outcome = fetcher.fetch(&url(&server, "/list.txt")).await;

    assert_eq!(outcome, FetchOutcome::HttpFailure { status: 503 });
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old.txt"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new.txt"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("rule"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&test_config()).unwrap();
    let outcome = fetcher.fetch(&url(&server, "/old.txt")).await;

    assert_eq!(
        outcome,
        FetchOutcome::Success {
            status: 200,
            body: "rule".to_string(),
        }
    );
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&test_config()).unwrap();
    let outcome = fetcher.fetch(&url(&server, "/slow.txt")).await;

    match outcome {
        FetchOutcome::TransportFailure { kind, .. } => assert_eq!(kind, TransportErrorKind::Timeout),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_refused_connection_is_transport_failure() {
    // Reserve a port, then free it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let fetcher = HttpFetcher::new(&test_config()).unwrap();
    let target = Url::parse(&format!("http://127.0.0.1:{}/list.txt", port)).unwrap();
    let outcome = fetcher.fetch(&target).await;

    match &outcome {
        FetchOutcome::TransportFailure { kind, .. } => {
            assert_eq!(*kind, TransportErrorKind::Connect)
        }
        other => panic!("expected transport failure, got {:?}", other),
    }
    assert_eq!(outcome.status(), FetchStatus::Unknown);
}
