//! List routes.
//!
//! A list moved to another board is announced as `list.moved` on the
//! destination board and `list.deleted` on the source board, so viewers of
//! either board converge without refetching.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use super::{MoveResponse, move_error_to_status, service_error_to_status};
use crate::events::{Action, Entity, Event};
use crate::routes::auth::AuthUser;
use crate::services::access::{self, Access};
use crate::services::list::{self, ListPatch, ListRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateListBody {
    pub title: String,
}

#[derive(Deserialize)]
pub struct UpdateListBody {
    pub title: Option<String>,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct MoveListBody {
    pub new_index: i64,
    pub target_board_id: Option<i64>,
}

/// `GET /api/boards/{id}/lists`
pub async fn lists_by_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<i64>,
) -> Result<Json<Vec<ListRow>>, StatusCode> {
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    let rows = list::lists_by_board(&state.pool, board_id).await.map_err(service_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/boards/{id}/lists`: append a list.
pub async fn create_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<i64>,
    Json(body): Json<CreateListBody>,
) -> Result<(StatusCode, Json<ListRow>), StatusCode> {
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    let row = list::create_list(&state.pool, board_id, &body.title)
        .await
        .map_err(service_error_to_status)?;

    state
        .bus
        .publish(&Event::new(Entity::List, Action::Created, board_id).with_list_id(row.id).with_payload(&row));
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/lists/{id}`
pub async fn update_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<i64>,
    Json(body): Json<UpdateListBody>,
) -> Result<Json<ListRow>, StatusCode> {
    let board_id = access::board_of_list(&state.pool, list_id).await.map_err(service_error_to_status)?;
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    let patch = ListPatch { title: body.title, color: body.color };
    let row = list::update_list(&state.pool, list_id, &patch).await.map_err(service_error_to_status)?;

    state.bus.publish(
        &Event::new(Entity::List, Action::Updated, board_id)
            .with_list_id(list_id)
            .with_payload(&serde_json::json!({ "id": list_id })),
    );
    Ok(Json(row))
}

/// `DELETE /api/lists/{id}`: removes the list and its cards.
pub async fn delete_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<i64>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let board_id = access::board_of_list(&state.pool, list_id).await.map_err(service_error_to_status)?;
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    list::delete_list(&state.pool, list_id).await.map_err(service_error_to_status)?;

    state.bus.publish(
        &Event::new(Entity::List, Action::Deleted, board_id)
            .with_list_id(list_id)
            .with_payload(&serde_json::json!({ "id": list_id })),
    );
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/lists/{id}/move`: reorder within a board or move to another.
pub async fn move_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<i64>,
    Json(body): Json<MoveListBody>,
) -> Result<Json<MoveResponse>, StatusCode> {
    let source_board = access::board_of_list(&state.pool, list_id).await.map_err(service_error_to_status)?;
    access::require_board(&state.pool, auth.user.id, source_board, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    if let Some(target) = body.target_board_id.filter(|&t| t != source_board) {
        access::require_board(&state.pool, auth.user.id, target, Access::Member)
            .await
            .map_err(service_error_to_status)?;
    }

    let outcome = state
        .ordering
        .move_list(list_id, body.target_board_id, body.new_index)
        .await
        .map_err(move_error_to_status)?;

    let dest_board = outcome.parent.unwrap_or(source_board);
    let from_board = outcome.from_parent.unwrap_or(source_board);
    state.bus.publish(&Event::new(Entity::List, Action::Moved, dest_board).with_list_id(list_id).with_payload(
        &serde_json::json!({ "id": list_id, "new_index": body.new_index, "pos": outcome.position }),
    ));
    if from_board != dest_board {
        state.bus.publish(
            &Event::new(Entity::List, Action::Deleted, from_board)
                .with_list_id(list_id)
                .with_payload(&serde_json::json!({ "id": list_id })),
        );
    }
    Ok(Json(MoveResponse::new(list_id, &outcome)))
}
