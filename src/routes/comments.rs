//! Comment routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use super::service_error_to_status;
use crate::events::{Action, Entity, Event};
use crate::routes::auth::AuthUser;
use crate::services::access::{self, Access};
use crate::services::comment::{self, CommentRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddCommentBody {
    pub body: String,
}

/// `GET /api/cards/{id}/comments`: oldest first.
pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<i64>,
) -> Result<Json<Vec<CommentRow>>, StatusCode> {
    let (board_id, _) = access::board_and_list_of_card(&state.pool, card_id)
        .await
        .map_err(service_error_to_status)?;
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    let rows = comment::comments_by_card(&state.pool, card_id).await.map_err(service_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/cards/{id}/comments`
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<i64>,
    Json(body): Json<AddCommentBody>,
) -> Result<(StatusCode, Json<CommentRow>), StatusCode> {
    let (board_id, list_id) = access::board_and_list_of_card(&state.pool, card_id)
        .await
        .map_err(service_error_to_status)?;
    access::require_board(&state.pool, auth.user.id, board_id, Access::Member)
        .await
        .map_err(service_error_to_status)?;
    let row = comment::add_comment(&state.pool, card_id, auth.user.id, &body.body)
        .await
        .map_err(service_error_to_status)?;

    state
        .bus
        .publish(&Event::new(Entity::Comment, Action::Created, board_id).with_list_id(list_id).with_payload(&row));
    Ok((StatusCode::CREATED, Json(row)))
}
