//! Board access checks and parent lookups.
//!
//! A user may read and edit a board they created or are a member of. Only the
//! creator may rename, delete, or reorder the board itself.

use sqlx::PgPool;

use super::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Member,
    Owner,
}

/// Decide access from a board's creator and the caller's membership.
#[must_use]
pub fn decide(user_id: i64, created_by: Option<i64>, is_member: bool, required: Access) -> bool {
    let is_owner = created_by == Some(user_id);
    match required {
        Access::Owner => is_owner,
        Access::Member => is_owner || is_member,
    }
}

/// Ensure `board_id` exists and `user_id` holds `required` access to it.
///
/// # Errors
///
/// `NotFound` for a missing board, `Forbidden` when access is denied.
pub async fn require_board(pool: &PgPool, user_id: i64, board_id: i64, required: Access) -> Result<(), ServiceError> {
    let row = sqlx::query_as::<_, (Option<i64>, bool)>(
        "SELECT b.created_by,
                EXISTS (SELECT 1 FROM board_members m WHERE m.board_id = b.id AND m.user_id = $2)
         FROM boards b
         WHERE b.id = $1",
    )
    .bind(board_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some((created_by, is_member)) = row else {
        return Err(ServiceError::NotFound("board", board_id));
    };
    if !decide(user_id, created_by, is_member, required) {
        return Err(ServiceError::Forbidden(board_id));
    }
    Ok(())
}

/// Board that owns `list_id`.
///
/// # Errors
///
/// `NotFound` when the list does not exist.
pub async fn board_of_list(pool: &PgPool, list_id: i64) -> Result<i64, ServiceError> {
    sqlx::query_scalar::<_, i64>("SELECT board_id FROM lists WHERE id = $1")
        .bind(list_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("list", list_id))
}

/// `(board_id, list_id)` that own `card_id`.
///
/// # Errors
///
/// `NotFound` when the card does not exist.
pub async fn board_and_list_of_card(pool: &PgPool, card_id: i64) -> Result<(i64, i64), ServiceError> {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT l.board_id, c.list_id FROM cards c JOIN lists l ON l.id = c.list_id WHERE c.id = $1",
    )
    .bind(card_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ServiceError::NotFound("card", card_id))
}

#[cfg(test)]
#[path = "access_test.rs"]
mod tests;
