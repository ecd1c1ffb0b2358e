//! Route-level integration tests against a mock gateway

use futures::future::join_all;
use negotiation_api_client::config::EndpointConfig;
use negotiation_api_client::{
    ApiRequest, ClientError, Empty, HttpMethod, NegotiationClient, Operation,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> NegotiationClient {
    let endpoint = EndpointConfig::new(server.uri()).with_stage("prod");
    NegotiationClient::new(endpoint).unwrap()
}

async fn mount_route(server: &MockServer, op: Operation, status: u16) {
    let route = op.route();
    Mock::given(method(route.method.as_str()))
        .and(path(format!("/prod{}", route.path)))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_every_operation_hits_its_route_once() {
    let server = MockServer::start().await;
    for op in Operation::ALL {
        mount_route(&server, op, 200).await;
    }

    let client = client_for(&server);
    for op in Operation::ALL {
        assert_eq!(assert_ok!(client.invoke(op).await), Empty::default());
    }

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 10);
    assert!(received.iter().all(|r| r.body.is_empty()));
    assert!(received.iter().all(|r| r.url.query().is_none()));
    server.verify().await;
}

#[tokio::test]
async fn test_start_conversation_post_success_and_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prod/start-conversation"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/prod/start-conversation"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string(r#""Error starting conversation: 'Item'""#),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_ok!(client.start_conversation_post().await);

    let err = assert_err!(client.start_conversation_post().await);
    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Error starting conversation: 'Item'");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_options_preflight_routes() {
    let server = MockServer::start().await;
    Mock::given(method("OPTIONS"))
        .and(path("/prod/check-progress"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("access-control-allow-origin", "*")
                .insert_header("access-control-allow-methods", "OPTIONS,POST"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_ok!(client.check_progress_options().await);
}

#[tokio::test]
async fn test_unmapped_route_is_a_failure() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = assert_err!(client.reset_progress_post().await);
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_execute_forwards_descriptor_and_returns_any_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/prod/custom/thing"))
        .and(query_param("dry_run", "true"))
        .and(header("x-custom", "yes"))
        .respond_with(
            ResponseTemplate::new(409)
                .insert_header("x-request-id", "req-1")
                .set_body_string("conflict"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = ApiRequest::new(HttpMethod::Put, "/custom/thing")
        .with_query("dry_run", "true")
        .with_header("X-Custom", "yes")
        .with_body(b"payload".to_vec());

    let response = assert_ok!(client.execute(request).await);
    assert_eq!(response.status, 409);
    assert_eq!(response.header("X-Request-Id"), Some("req-1"));
    assert_eq!(response.text(), "conflict");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, b"payload".to_vec());
}

#[tokio::test]
async fn test_api_key_and_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/start-or-continue"))
        .and(header("x-api-key", "test-key"))
        .and(header("x-client", "sales-app"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = EndpointConfig {
        api_key: Some("test-key".to_string()),
        default_headers: BTreeMap::from([("x-client".to_string(), "sales-app".to_string())]),
        ..EndpointConfig::new(server.uri())
    };
    let client = NegotiationClient::new(endpoint).unwrap();
    assert_ok!(client.start_or_continue_post().await);
}

#[tokio::test]
async fn test_request_headers_override_configured_ones() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check-progress"))
        .and(header("x-client", "override"))
        .and(header("user-agent", "custom/1.0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = EndpointConfig {
        default_headers: BTreeMap::from([("x-client".to_string(), "sales-app".to_string())]),
        user_agent: "sales-trainer/2.0".to_string(),
        ..EndpointConfig::new(server.uri())
    };
    let client = NegotiationClient::new(endpoint).unwrap();

    let request = ApiRequest::new(HttpMethod::Post, "/check-progress")
        .with_header("x-client", "override")
        .with_header("user-agent", "custom/1.0");
    let response = client.execute(request).await.unwrap();
    assert_eq!(response.status, 204);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn test_timeout_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/continue-conversation"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let endpoint = EndpointConfig {
        timeout_ms: 50,
        ..EndpointConfig::new(server.uri())
    };
    let client = NegotiationClient::new(endpoint).unwrap();

    let err = assert_err!(client.continue_conversation_post().await);
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}

#[tokio::test]
async fn test_connection_failure_is_an_error() {
    let endpoint = EndpointConfig {
        connect_timeout_ms: 200,
        ..EndpointConfig::new("http://127.0.0.1:9")
    };
    let client = NegotiationClient::new(endpoint).unwrap();

    let err = assert_err!(client.check_progress_post().await);
    assert!(matches!(err, ClientError::Http(_)));
}

#[tokio::test]
async fn test_parallel_calls_from_clones() {
    let server = MockServer::start().await;
    for op in Operation::ALL {
        mount_route(&server, op, 204).await;
    }

    let client = client_for(&server);
    let calls = Operation::ALL.into_iter().map(|op| {
        let client = client.clone();
        tokio::spawn(async move { client.invoke(op).await })
    });

    for result in join_all(calls).await {
        assert_ok!(result.unwrap());
    }
    server.verify().await;
}
