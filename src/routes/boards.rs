//! Board routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use super::{MoveResponse, move_error_to_status, service_error_to_status};
use crate::events::{Action, Entity, Event};
use crate::routes::auth::AuthUser;
use crate::services::access::{self, Access};
use crate::services::board::{self, BoardFull, BoardPatch, BoardRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateBoardBody {
    pub title: String,
}

#[derive(Deserialize)]
pub struct UpdateBoardBody {
    pub title: Option<String>,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct MoveBoardBody {
    pub new_index: i64,
}

/// `GET /api/boards`: boards visible to the caller, in board order.
pub async fn list_boards(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<BoardRow>>, StatusCode> {
    let rows = board::list_boards(&state.pool, auth.user.id)
        .await
        .map_err(service_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/boards`: create a board at the end of the caller's order.
pub async fn create_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateBoardBody>,
) -> Result<(StatusCode, Json<BoardRow>), StatusCode> {
    let row = board::create_board(&state.pool, auth.user.id, &body.title)
        .await
        .map_err(service_error_to_status)?;
    tracing::info!(board_id = row.id, user_id = auth.user.id, "board created");
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/boards/{id}`
pub async fn get_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<i64>,
) -> Result<Json<BoardRow>, StatusCode> {
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    let row = board::get_board(&state.pool, board_id).await.map_err(service_error_to_status)?;
    Ok(Json(row))
}

/// `PATCH /api/boards/{id}`: rename or recolor; creator only.
pub async fn update_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<i64>,
    Json(body): Json<UpdateBoardBody>,
) -> Result<Json<BoardRow>, StatusCode> {
    access::require_board(&state.pool, auth.user.id, board_id, Access::Owner)
        .await
        .map_err(service_error_to_status)?;
    let patch = BoardPatch { title: body.title, color: body.color };
    let row = board::update_board(&state.pool, board_id, &patch)
        .await
        .map_err(service_error_to_status)?;

    state.bus.publish(
        &Event::new(Entity::Board, Action::Updated, board_id).with_payload(&serde_json::json!({ "id": board_id })),
    );
    Ok(Json(row))
}

/// `DELETE /api/boards/{id}`: creator only; cascades to lists and cards.
pub async fn delete_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<i64>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    access::require_board(&state.pool, auth.user.id, board_id, Access::Owner)
        .await
        .map_err(service_error_to_status)?;
    board::delete_board(&state.pool, board_id).await.map_err(service_error_to_status)?;

    state.bus.publish(
        &Event::new(Entity::Board, Action::Deleted, board_id).with_payload(&serde_json::json!({ "id": board_id })),
    );
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/boards/{id}/move`: reorder among all boards; creator only.
pub async fn move_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<i64>,
    Json(body): Json<MoveBoardBody>,
) -> Result<Json<MoveResponse>, StatusCode> {
    access::require_board(&state.pool, auth.user.id, board_id, Access::Owner)
        .await
        .map_err(service_error_to_status)?;
    let outcome = state
        .ordering
        .move_board(board_id, body.new_index)
        .await
        .map_err(move_error_to_status)?;

    state.bus.publish(&Event::new(Entity::Board, Action::Moved, board_id).with_payload(&serde_json::json!({
        "id": board_id,
        "new_index": body.new_index,
        "pos": outcome.position,
    })));
    Ok(Json(MoveResponse::new(board_id, &outcome)))
}

/// `GET /api/boards/{id}/full`: board, lists, and cards grouped by list.
pub async fn board_full(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<i64>,
) -> Result<Json<BoardFull>, StatusCode> {
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    let full = board::full_board(&state.pool, board_id).await.map_err(service_error_to_status)?;
    Ok(Json(full))
}
