//! Card routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use super::{MoveResponse, move_error_to_status, service_error_to_status};
use crate::events::{Action, Entity, Event};
use crate::routes::auth::AuthUser;
use crate::services::access::{self, Access};
use crate::services::card::{self, CardPatch, CardRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateCardBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateCardBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub due_at: Option<i64>,
    pub assignee_user_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct MoveCardBody {
    pub new_index: i64,
    pub target_list_id: Option<i64>,
}

/// `GET /api/lists/{id}/cards`
pub async fn cards_by_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<i64>,
) -> Result<Json<Vec<CardRow>>, StatusCode> {
    let board_id = access::board_of_list(&state.pool, list_id).await.map_err(service_error_to_status)?;
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    let rows = card::cards_by_list(&state.pool, list_id).await.map_err(service_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/lists/{id}/cards`: append a card.
pub async fn create_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<i64>,
    Json(body): Json<CreateCardBody>,
) -> Result<(StatusCode, Json<CardRow>), StatusCode> {
    let board_id = access::board_of_list(&state.pool, list_id).await.map_err(service_error_to_status)?;
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    let row = card::create_card(&state.pool, list_id, &body.title, &body.description)
        .await
        .map_err(service_error_to_status)?;

    state
        .bus
        .publish(&Event::new(Entity::Card, Action::Created, board_id).with_list_id(list_id).with_payload(&row));
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /api/cards/{id}`
pub async fn update_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<i64>,
    Json(body): Json<UpdateCardBody>,
) -> Result<Json<CardRow>, StatusCode> {
    let (board_id, list_id) = access::board_and_list_of_card(&state.pool, card_id)
        .await
        .map_err(service_error_to_status)?;
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    let patch = CardPatch {
        title: body.title,
        description: body.description,
        color: body.color,
        due_at: body.due_at,
        assignee_user_id: body.assignee_user_id,
    };
    let row = card::update_card(&state.pool, card_id, &patch).await.map_err(service_error_to_status)?;

    state.bus.publish(
        &Event::new(Entity::Card, Action::Updated, board_id)
            .with_list_id(list_id)
            .with_payload(&serde_json::json!({ "id": card_id })),
    );
    Ok(Json(row))
}

/// `DELETE /api/cards/{id}`
pub async fn delete_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<i64>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let (board_id, list_id) = access::board_and_list_of_card(&state.pool, card_id)
        .await
        .map_err(service_error_to_status)?;
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    card::delete_card(&state.pool, card_id).await.map_err(service_error_to_status)?;

    state.bus.publish(
        &Event::new(Entity::Card, Action::Deleted, board_id)
            .with_list_id(list_id)
            .with_payload(&serde_json::json!({ "id": card_id })),
    );
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/cards/{id}/move`: reorder within a list or move to another
/// list, possibly on another board.
pub async fn move_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<i64>,
    Json(body): Json<MoveCardBody>,
) -> Result<Json<MoveResponse>, StatusCode> {
    let (source_board, source_list) = access::board_and_list_of_card(&state.pool, card_id)
        .await
        .map_err(service_error_to_status)?;
    access::require_board(&state.pool, auth.user.id, source_board, Access::Member)
        .await
        .map_err(service_error_to_status)?;

    let dest_board = match body.target_list_id.filter(|&t| t != source_list) {
        Some(target_list) => {
            let board_id = access::board_of_list(&state.pool, target_list)
                .await
                .map_err(service_error_to_status)?;
            if board_id != source_board {
                access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
                    .await
                    .map_err(service_error_to_status)?;
            }
            board_id
        }
        None => source_board,
    };

    let outcome = state
        .ordering
        .move_card(card_id, body.target_list_id, body.new_index)
        .await
        .map_err(move_error_to_status)?;

    let dest_list = outcome.parent.unwrap_or(source_list);
    state.bus.publish(&Event::new(Entity::Card, Action::Moved, dest_board).with_list_id(dest_list).with_payload(
        &serde_json::json!({
            "id": card_id,
            "from_list_id": outcome.from_parent,
            "target_list_id": dest_list,
            "new_index": body.new_index,
            "pos": outcome.position,
        }),
    ));
    if dest_board != source_board {
        state.bus.publish(
            &Event::new(Entity::Card, Action::Deleted, source_board)
                .with_list_id(source_list)
                .with_payload(&serde_json::json!({ "id": card_id })),
        );
    }
    Ok(Json(MoveResponse::new(card_id, &outcome)))
}
