//! `GET /api/boards/{id}/events`: the live change stream for one board.
//!
//! LIFECYCLE
//! =========
//! 1. Authenticate and check board access.
//! 2. Subscribe to the board on the event bus.
//! 3. Spawn a [`StreamSession`] that writes frames into a bounded channel.
//! 4. Return a streaming body that drains that channel.
//!
//! When the client disconnects the body is dropped, the channel closes, and
//! the session exits and unsubscribes.

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use tokio::sync::mpsc;

use super::service_error_to_status;
use crate::events::StreamSession;
use crate::routes::auth::AuthUser;
use crate::services::access::{self, Access};
use crate::state::AppState;

pub async fn board_events(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<i64>,
) -> Result<Response, StatusCode> {
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;

    let subscription = state.bus.subscribe(board_id);
    let (tx, rx) = mpsc::channel::<Bytes>(state.stream.transport_buffer);
    let session = StreamSession::new(subscription, state.stream.heartbeat, state.shutdown.clone());
    tokio::spawn(session.serve(tx));

    tracing::debug!(%board_id, user_id = auth.user.id, "event stream attached");
    Ok(stream_response(rx))
}

/// Wrap the session's output channel as an event-stream response.
pub(crate) fn stream_response(rx: mpsc::Receiver<Bytes>) -> Response {
    let frames = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|frame| (Ok::<_, Infallible>(frame), rx))
    });
    (
        [(CONTENT_TYPE, "text/event-stream"), (CACHE_CONTROL, "no-cache")],
        Body::from_stream(frames),
    )
        .into_response()
}
