//! Integration tests for `InsightClient::execute` and
//! `InsightClient::execute_with_retries` using wiremock HTTP mocks.

use insightdl_api::types::NoVariables;
use insightdl_api::{ApiError, ClientConfig, GraphqlRequest, InsightClient, QueryOutcome};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY: &str = "query Ping { ping }";

/// Client pointed at the mock server with zero max wait so retries never sleep.
fn test_client(server: &MockServer, max_retries: u32) -> InsightClient {
    InsightClient::new(
        ClientConfig::new("test-token")
            .with_endpoint(format!("{}/graphql", server.uri()))
            .with_timeout_secs(5)
            .with_retry_policy(max_retries, 0),
    )
    .expect("client construction should not fail")
}

fn ok_body() -> serde_json::Value {
    json!({"data": {"ping": "pong"}})
}

#[tokio::test]
async fn execute_posts_query_with_fixed_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "api-key test-token"))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({"query": QUERY, "variables": {}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 0);
    let request = GraphqlRequest::new(QUERY, NoVariables::default());
    let outcome = client
        .execute::<_, serde_json::Value>(&request)
        .await
        .expect("should parse response");

    match outcome {
        QueryOutcome::Data(data) => assert_eq!(data["ping"], "pong"),
        other => panic!("expected Data, got: {other:?}"),
    }
}

#[tokio::test]
async fn execute_surfaces_graphql_errors_as_outcome() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"message": "Invalid insight"}, {"message": "Unknown taxonomy"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 3);
    let request = GraphqlRequest::new(QUERY, NoVariables::default());
    let outcome = client
        .execute_with_retries::<_, serde_json::Value>(&request)
        .await
        .expect("GraphQL errors are not transport errors");

    let err = outcome.into_data().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Invalid insight"), "got: {msg}");
    assert!(msg.contains("Unknown taxonomy"), "got: {msg}");
}

#[tokio::test]
async fn execute_does_not_retry_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 3);
    let request = GraphqlRequest::new(QUERY, NoVariables::default());
    let result = client.execute::<_, serde_json::Value>(&request).await;

    match result {
        Err(ApiError::RateLimited { retry_after_secs }) => {
            assert_eq!(retry_after_secs, Some(30));
        }
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn execute_with_retries_succeeds_after_rate_limits() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 2);
    let request = GraphqlRequest::new(QUERY, NoVariables::default());
    let outcome = client
        .execute_with_retries::<_, serde_json::Value>(&request)
        .await
        .expect("should succeed after two rate-limited attempts");

    assert!(matches!(outcome, QueryOutcome::Data(_)));
}

#[tokio::test]
async fn execute_with_retries_clamps_server_wait_to_max() {
    let server = MockServer::start().await;

    // An hour-long Retry-After must be clamped to the configured max (0 s),
    // otherwise this test would hang.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3600"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&server)
        .await;

    let client = test_client(&server, 1);
    let request = GraphqlRequest::new(QUERY, NoVariables::default());
    let started = std::time::Instant::now();
    let result = client
        .execute_with_retries::<_, serde_json::Value>(&request)
        .await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}

#[tokio::test]
async fn execute_with_retries_gives_up_after_max_retries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server, 2);
    let request = GraphqlRequest::new(QUERY, NoVariables::default());
    let result = client
        .execute_with_retries::<_, serde_json::Value>(&request)
        .await;

    match result {
        Err(ApiError::MaxRetriesExceeded {
            attempts, status, ..
        }) => {
            assert_eq!(attempts, 3);
            assert_eq!(status, 429);
        }
        other => panic!("expected MaxRetriesExceeded, got: {other:?}"),
    }
    // `.expect(3)` is verified when `server` drops: no fourth request.
}

#[tokio::test]
async fn execute_with_retries_does_not_retry_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 3);
    let request = GraphqlRequest::new(QUERY, NoVariables::default());
    let result = client
        .execute_with_retries::<_, serde_json::Value>(&request)
        .await;

    match result {
        Err(ApiError::UnexpectedStatus { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn execute_reports_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server, 0);
    let request = GraphqlRequest::new(QUERY, NoVariables::default());
    let result = client.execute::<_, serde_json::Value>(&request).await;

    assert!(matches!(result, Err(ApiError::Deserialize { .. })));
}

#[tokio::test]
async fn connection_failure_is_http_error() {
    let client = InsightClient::new(
        ClientConfig::new("test-token")
            .with_endpoint("http://127.0.0.1:1/graphql")
            .with_timeout_secs(5),
    )
    .expect("client construction should not fail");
    let request = GraphqlRequest::new(QUERY, NoVariables::default());
    let result = client
        .execute_with_retries::<_, serde_json::Value>(&request)
        .await;

    match result {
        Err(err @ ApiError::Http(_)) => assert!(err.is_transport()),
        other => panic!("expected Http error, got: {other:?}"),
    }
}
