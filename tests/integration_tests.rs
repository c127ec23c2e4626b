//! Integration tests using mock HTTP servers
//!
//! Drives the full flow through the HTTP endpoint: Fivetran request →
//! token exchange → page fetches → Fivetran response.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use fivetran_opentable::cli::router;
use fivetran_opentable::{ConnectorConfig, SyncEngine};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{
    basic_auth, bearer_token, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn app(mock_server: &MockServer) -> axum::Router {
    let config = ConnectorConfig {
        token_url: format!("{}/api/v2/oauth/token", mock_server.uri()),
        api_base_url: format!("{}/sync/v2", mock_server.uri()),
        ..ConnectorConfig::default()
    };
    router(Arc::new(SyncEngine::new(config).unwrap()))
}

fn secrets() -> Value {
    json!({ "clientId": "client", "clientSecret": "secret", "rid": "4242" })
}

async fn post(app: axum::Router, body: Value) -> (StatusCode, Value) {
    post_raw(app, body.to_string()).await
}

async fn post_raw(app: axum::Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn mount_token(mock_server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v2/oauth/token"))
        .and(basic_auth("client", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "expires_in": 3600
        })))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

fn page(items: Value, has_next_page: bool) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "items": items,
        "hasNextPage": has_next_page
    }))
}

/// A token expiration far enough ahead that the test never refreshes it
fn future_expiration() -> String {
    (chrono::Utc::now() + chrono::Duration::hours(1))
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let mock_server = MockServer::start().await;

    let response = app(&mock_server)
        .oneshot(
            Request::builder()
                .uri("/_health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

// ============================================================================
// Sync scenarios
// ============================================================================

#[tokio::test]
async fn test_first_sync_from_empty_state() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path("/sync/v2/guests"))
        .and(bearer_token("fresh-token"))
        .and(query_param("rid", "4242"))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "0"))
        .and(query_param_is_missing("updated_after"))
        .respond_with(page(
            json!([
                {"id": "g1", "updated_at_utc": "2024-05-01T00:00:00Z"},
                {"id": "g2", "updated_at_utc": "2024-05-02T00:00:00Z"}
            ]),
            false,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sync/v2/reservations"))
        .and(bearer_token("fresh-token"))
        .and(query_param("offset", "0"))
        .and(query_param_is_missing("updated_after"))
        .respond_with(page(
            json!([{"id": "r1", "updated_at_utc": "2024-05-04T09:15:00Z"}]),
            false,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = post(
        app(&mock_server),
        json!({ "state": {}, "secrets": secrets(), "customPayload": {} }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasMore"], false);
    assert_eq!(body["state"]["offset"], 0);
    assert_eq!(body["state"]["lastSyncTimestamp"], "2024-05-04T09:15:00Z");
    assert_eq!(body["state"]["accessToken"], "fresh-token");
    assert!(body["state"]["tokenExpiration"].is_string());
    assert_eq!(body["insert"]["guests"].as_array().unwrap().len(), 2);
    assert_eq!(body["insert"]["reservations"][0]["id"], "r1");
    assert_eq!(
        body["schema"],
        json!({
            "guests": { "primary_key": ["id"] },
            "reservations": { "primary_key": ["id"] }
        })
    );
}

#[tokio::test]
async fn test_continuation_page() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 0).await;

    for resource in ["guests", "reservations"] {
        Mock::given(method("GET"))
            .and(path(format!("/sync/v2/{resource}")))
            .and(bearer_token("cached-token"))
            .and(query_param("offset", "100"))
            .and(query_param("updated_after", "2024-05-08T00:00:00.000Z"))
            .respond_with(page(
                json!([{"id": "x", "updated_at_utc": "2024-05-11T00:00:00Z"}]),
                resource == "guests",
            ))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let (status, body) = post(
        app(&mock_server),
        json!({
            "state": {
                "lastSyncTimestamp": "2024-05-10T00:00:00.000Z",
                "offset": 100,
                "accessToken": "cached-token",
                "tokenExpiration": future_expiration()
            },
            "secrets": secrets()
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hasMore"], true);
    assert_eq!(body["state"]["offset"], 200);
    assert_eq!(body["state"]["lastSyncTimestamp"], "2024-05-10T00:00:00.000Z");
    assert_eq!(body["state"]["accessToken"], "cached-token");
}

#[tokio::test]
async fn test_expired_token_refreshed() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    for resource in ["guests", "reservations"] {
        Mock::given(method("GET"))
            .and(path(format!("/sync/v2/{resource}")))
            .and(bearer_token("fresh-token"))
            .respond_with(page(json!([]), false))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let (status, body) = post(
        app(&mock_server),
        json!({
            "state": {
                "accessToken": "stale-token",
                "tokenExpiration": "2020-01-01T00:00:00.000Z"
            },
            "secrets": secrets()
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["accessToken"], "fresh-token");
    assert_ne!(body["state"]["tokenExpiration"], "2020-01-01T00:00:00.000Z");
    assert_eq!(body["hasMore"], false);
    assert!(body["state"].get("lastSyncTimestamp").is_none());
}

#[tokio::test]
async fn test_upstream_503_returns_error_shape() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path("/sync/v2/guests"))
        .respond_with(page(json!([]), false))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sync/v2/reservations"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let (status, body) = post(app(&mock_server), json!({ "secrets": secrets() })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorType"], "FetchError");
    assert_eq!(
        body["errorMessage"],
        "Failed to fetch reservations data: HTTP 503: Service Unavailable"
    );
    assert!(body["stackTrace"].as_str().unwrap().contains("HTTP 503"));
    assert!(body.get("state").is_none());
    assert!(body.get("insert").is_none());
}

#[tokio::test]
async fn test_token_failure_returns_error_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
        .mount(&mock_server)
        .await;

    let (status, body) = post(app(&mock_server), json!({ "secrets": secrets() })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorType"], "CredentialError");
    assert_eq!(
        body["errorMessage"],
        "Failed to get access token: HTTP 400: invalid_client"
    );
}

#[tokio::test]
async fn test_malformed_requests_return_error_shape() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 0).await;

    let (status, body) = post_raw(app(&mock_server), "{not json".to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorType"], "MalformedRequestError");

    let (status, body) = post(app(&mock_server), json!({ "state": {} })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorMessage"], "Missing required field: secrets");

    let (status, body) = post(
        app(&mock_server),
        json!({ "state": { "offset": "ten" }, "secrets": secrets() }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorType"], "MalformedStateError");
}

// ============================================================================
// Multi-invocation
// ============================================================================

#[tokio::test]
async fn test_window_drains_across_invocations() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server, 1).await;

    // guests: two pages, reservations: one page then empty
    Mock::given(method("GET"))
        .and(path("/sync/v2/guests"))
        .and(query_param("offset", "0"))
        .respond_with(page(
            json!([{"id": "g1", "updated_at_utc": "2024-05-01T00:00:00Z"}]),
            true,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sync/v2/guests"))
        .and(query_param("offset", "100"))
        .respond_with(page(
            json!([{"id": "g2", "updated_at_utc": "2024-05-06T00:00:00Z"}]),
            false,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sync/v2/reservations"))
        .and(query_param("offset", "0"))
        .respond_with(page(
            json!([{"id": "r1", "updated_at_utc": "2024-05-03T00:00:00Z"}]),
            false,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sync/v2/reservations"))
        .and(query_param("offset", "100"))
        .respond_with(page(json!([]), false))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = app(&mock_server);

    let (status, first) = post(app.clone(), json!({ "state": {}, "secrets": secrets() })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["hasMore"], true);
    assert_eq!(first["state"]["offset"], 100);
    assert!(first["state"].get("lastSyncTimestamp").is_none());

    let (status, second) = post(
        app,
        json!({ "state": first["state"].clone(), "secrets": secrets() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["hasMore"], false);
    assert_eq!(second["state"]["offset"], 0);
    assert_eq!(second["state"]["lastSyncTimestamp"], "2024-05-06T00:00:00Z");
    assert_eq!(second["state"]["accessToken"], "fresh-token");
}
