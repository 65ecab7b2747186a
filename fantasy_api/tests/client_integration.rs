use std::time::Duration;

use fantasy_api::{Client, Error, RetryPolicy};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn fast_client(uri: &str, retries: u32) -> Client {
    Client::with_base_url(uri)
        .unwrap()
        .with_retry_policy(RetryPolicy::new(retries, Duration::from_millis(1)))
}

#[tokio::test]
async fn get_bootstrap_static_success() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("bootstrap_static.json");

    Mock::given(method("GET"))
        .and(path("/bootstrap-static/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server.uri(), 3);
    let resp = client.get_bootstrap_static().await.unwrap();
    assert_eq!(resp.elements.len(), 3);
    assert_eq!(resp.teams[1].short_name, "MCI");
}

#[tokio::test]
async fn get_element_summary_uses_player_path() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("element_summary.json");

    Mock::given(method("GET"))
        .and(path("/element-summary/328/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server.uri(), 0);
    let resp = client.get_element_summary(328).await.unwrap();
    assert_eq!(resp.history.len(), 2);
}

#[tokio::test]
async fn get_manager_picks_uses_manager_and_event_path() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("picks.json");

    Mock::given(method("GET"))
        .and(path("/entry/1234/event/2/picks/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server.uri(), 0);
    let resp = client.get_manager_picks(1234, 2).await.unwrap();
    assert_eq!(resp.picks[0].element, 328);
}

#[tokio::test]
async fn retries_until_success() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("fixtures.json");

    Mock::given(method("GET"))
        .and(path("/fixtures/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .expect(3)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fixtures/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server.uri(), 10);
    let fixtures = client.get_fixtures().await.unwrap();
    assert_eq!(fixtures.len(), 1);
}

#[tokio::test]
async fn gives_up_after_retry_budget() {
    let mock_server = MockServer::start().await;

    // One initial attempt plus three retries.
    Mock::given(method("GET"))
        .and(path("/fixtures/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(4)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server.uri(), 3);
    let err = client.get_fixtures().await.unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn not_found_is_retried_too() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/element-summary/1/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server.uri(), 2);
    let err = client.get_element_summary(1).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn malformed_json_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fixtures/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server.uri(), 5);
    let err = client.get_fixtures().await.unwrap_err();
    match err {
        Error::Decode { endpoint, .. } => assert_eq!(endpoint, "/fixtures/"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn get_bytes_returns_raw_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/raw/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&mock_server)
        .await;

    let client = fast_client(&mock_server.uri(), 0);
    let body = client.get_bytes("/raw/").await.unwrap();
    assert_eq!(body, b"hello".to_vec());
}

#[tokio::test]
async fn unreachable_host_is_request_failed() {
    // Port 9 (discard) is closed on test hosts; the connect error is retried then surfaced.
    let client = fast_client("http://127.0.0.1:9", 1);
    let err = client.get_fixtures().await.unwrap_err();
    assert!(matches!(err, Error::RequestFailed(_)));
}

#[tokio::test]
async fn retries_sleep_the_fibonacci_schedule() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fixtures/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&mock_server)
        .await;

    // Waits of 0, 1 and 1 times the base; nothing after the last attempt.
    let base = Duration::from_millis(150);
    let client = Client::with_base_url(&mock_server.uri())
        .unwrap()
        .with_retry_policy(RetryPolicy::new(3, base));

    let started = std::time::Instant::now();
    let err = client.get_fixtures().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert!(elapsed >= base * 2, "slept only {:?}", elapsed);
    assert!(elapsed < base * 4, "slept {:?}, expected about {:?}", elapsed, base * 2);
}
