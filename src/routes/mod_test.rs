use super::*;
use crate::events::{Action, Entity, Event, StreamSession};
use crate::ordering::ItemKind;
use crate::state::test_helpers::test_app_state;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, header};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

async fn status_of(method: Method, uri: &str) -> StatusCode {
    let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
    app(test_app_state(), true).oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn healthz_is_ok() {
    assert_eq!(status_of(Method::GET, "/healthz").await, StatusCode::OK);
}

#[tokio::test]
async fn api_requires_session() {
    assert_eq!(status_of(Method::GET, "/api/boards").await, StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(Method::GET, "/api/boards/1/full").await, StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(Method::GET, "/api/boards/1/events").await, StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(Method::POST, "/api/cards/3/move").await, StatusCode::UNAUTHORIZED);
    assert_eq!(status_of(Method::DELETE, "/api/lists/2").await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    assert_eq!(status_of(Method::GET, "/api/nope").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/boards")
        .header(header::ORIGIN, "https://example.test")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app(test_app_state(), true).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[test]
fn service_errors_map_to_status() {
    assert_eq!(service_error_to_status(ServiceError::NotFound("list", 1)), StatusCode::NOT_FOUND);
    assert_eq!(service_error_to_status(ServiceError::Forbidden(1)), StatusCode::FORBIDDEN);
    assert_eq!(service_error_to_status(ServiceError::Invalid("title cannot be empty")), StatusCode::BAD_REQUEST);
    assert_eq!(
        service_error_to_status(ServiceError::Database(sqlx::Error::PoolTimedOut)),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn move_errors_map_to_status() {
    assert_eq!(
        move_error_to_status(MoveError::NotFound { kind: ItemKind::Card, id: 4 }),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        move_error_to_status(MoveError::RenumberExhausted { kind: ItemKind::List, id: 4 }),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        move_error_to_status(MoveError::Database(sqlx::Error::PoolTimedOut)),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn move_response_reports_outcome() {
    let outcome = MoveOutcome { from_parent: Some(1), parent: Some(2), position: 1500, renumbered: true };
    let json = serde_json::to_value(MoveResponse::new(9, &outcome)).unwrap();
    assert_eq!(json, serde_json::json!({ "id": 9, "parent_id": 2, "pos": 1500, "renumbered": true }));
}

#[tokio::test]
async fn stream_response_sets_event_stream_headers() {
    let (tx, rx) = mpsc::channel::<Bytes>(4);
    tx.send(Bytes::from_static(b": connected\n\n")).await.unwrap();
    drop(tx);

    let response = events::stream_response(rx);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b": connected\n\n");
}

#[tokio::test]
async fn session_output_flows_through_response_body() {
    let state = test_app_state();
    let (tx, rx) = mpsc::channel::<Bytes>(8);
    let subscription = state.bus.subscribe(11);
    let handle = subscription.handle();
    let task = tokio::spawn(StreamSession::new(subscription, Duration::from_secs(25), CancellationToken::new()).serve(tx));

    let response = events::stream_response(rx);
    assert_eq!(state.bus.publish(&Event::new(Entity::Card, Action::Moved, 11)), 1);
    handle.cancel();
    task.await.unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.starts_with(": connected\n\n"));
    assert!(text.contains("data: {\"type\":\"card.moved\""));
}
