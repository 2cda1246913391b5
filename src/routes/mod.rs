//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API and the per-board event stream under one
//! Axum router. Handlers authenticate with [`auth::AuthUser`], check board
//! access, call into services or the ordering engine, and publish a change
//! event only after the mutation has committed.

pub mod auth;
pub mod boards;
pub mod cards;
pub mod comments;
pub mod events;
pub mod lists;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::ordering::{MoveError, MoveOutcome};
use crate::services::ServiceError;
use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState, cors_allow_any: bool) -> Router {
    let router = Router::new()
        .route("/api/boards", get(boards::list_boards).post(boards::create_board))
        .route(
            "/api/boards/{id}",
            get(boards::get_board)
                .patch(boards::update_board)
                .delete(boards::delete_board),
        )
        .route("/api/boards/{id}/move", post(boards::move_board))
        .route("/api/boards/{id}/full", get(boards::board_full))
        .route("/api/boards/{id}/events", get(events::board_events))
        .route("/api/boards/{id}/lists", get(lists::lists_by_board).post(lists::create_list))
        .route("/api/lists/{id}", patch(lists::update_list).delete(lists::delete_list))
        .route("/api/lists/{id}/move", post(lists::move_list))
        .route("/api/lists/{id}/cards", get(cards::cards_by_list).post(cards::create_card))
        .route("/api/cards/{id}", patch(cards::update_card).delete(cards::delete_card))
        .route("/api/cards/{id}/move", post(cards::move_card))
        .route("/api/cards/{id}/comments", get(comments::list_comments).post(comments::add_comment))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http());

    let router = if cors_allow_any {
        router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
    } else {
        router
    };

    router.with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// SHARED RESPONSES
// =============================================================================

/// Body returned by every `/move` endpoint.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MoveResponse {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub pos: i64,
    pub renumbered: bool,
}

impl MoveResponse {
    #[must_use]
    pub fn new(id: i64, outcome: &MoveOutcome) -> Self {
        Self { id, parent_id: outcome.parent, pos: outcome.position, renumbered: outcome.renumbered }
    }
}

pub(crate) fn service_error_to_status(err: ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound(..) => StatusCode::NOT_FOUND,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::Invalid(_) => StatusCode::BAD_REQUEST,
        ServiceError::Database(e) => {
            tracing::error!(error = %e, "service database error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn move_error_to_status(err: MoveError) -> StatusCode {
    match err {
        MoveError::NotFound { .. } => StatusCode::NOT_FOUND,
        MoveError::RenumberExhausted { .. } => {
            tracing::error!(error = %err, "move failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        MoveError::Database(e) => {
            tracing::error!(error = %e, "move database error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
