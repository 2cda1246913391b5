//! Board service: CRUD and the full-state snapshot.
//!
//! DESIGN
//! ======
//! New boards take the tail position of the global board order. The full
//! snapshot is what a stream subscriber fetches to reconcile after
//! connecting or missing events.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;

use super::card::{self, CardRow};
use super::list::{self, ListRow};
use super::ServiceError;
use crate::ordering::append_position;

// =============================================================================
// TYPES
// =============================================================================

/// Row returned from board queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct BoardRow {
    pub id: i64,
    pub title: String,
    pub color: Option<String>,
    pub pos: i64,
    pub created_by: Option<i64>,
    pub created_at: i64,
}

/// Board with every list and every list's cards, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct BoardFull {
    pub board: BoardRow,
    pub lists: Vec<ListRow>,
    /// Keyed by list id; every list has an entry, possibly empty.
    pub cards: BTreeMap<i64, Vec<CardRow>>,
}

#[derive(Debug, Clone, Default)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub color: Option<String>,
}

const BOARD_COLUMNS: &str = "id, title, color, pos, created_by, created_at";

// =============================================================================
// CRUD
// =============================================================================

/// Boards the user created or is a member of, in board order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_boards(pool: &PgPool, user_id: i64) -> Result<Vec<BoardRow>, ServiceError> {
    let rows = sqlx::query_as::<_, BoardRow>(&format!(
        "SELECT {BOARD_COLUMNS}
         FROM boards b
         WHERE b.created_by = $1
            OR EXISTS (SELECT 1 FROM board_members m WHERE m.board_id = b.id AND m.user_id = $1)
         ORDER BY pos, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// `NotFound` when the board does not exist.
pub async fn get_board(pool: &PgPool, board_id: i64) -> Result<BoardRow, ServiceError> {
    sqlx::query_as::<_, BoardRow>(&format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = $1"))
        .bind(board_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("board", board_id))
}

/// Create a board owned by `user_id` at the tail of the board order.
///
/// # Errors
///
/// `Invalid` for a blank title, otherwise database errors.
pub async fn create_board(pool: &PgPool, user_id: i64, title: &str) -> Result<BoardRow, ServiceError> {
    let title = super::clean_title(title)?;
    let mut tx = pool.begin().await?;
    let max: Option<i64> = sqlx::query_scalar("SELECT MAX(pos) FROM boards").fetch_one(&mut *tx).await?;
    let row = sqlx::query_as::<_, BoardRow>(&format!(
        "INSERT INTO boards (title, pos, created_by) VALUES ($1, $2, $3) RETURNING {BOARD_COLUMNS}"
    ))
    .bind(title)
    .bind(append_position(max))
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(row)
}

/// Apply a partial update. Absent fields are left unchanged.
///
/// # Errors
///
/// `Invalid` for a blank title, `NotFound` when the board does not exist.
pub async fn update_board(pool: &PgPool, board_id: i64, patch: &BoardPatch) -> Result<BoardRow, ServiceError> {
    let title = patch.title.as_deref().map(super::clean_title).transpose()?;
    sqlx::query_as::<_, BoardRow>(&format!(
        "UPDATE boards SET title = COALESCE($2, title), color = COALESCE($3, color)
         WHERE id = $1
         RETURNING {BOARD_COLUMNS}"
    ))
    .bind(board_id)
    .bind(title)
    .bind(patch.color.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or(ServiceError::NotFound("board", board_id))
}

/// Delete a board; lists, cards, and comments cascade.
///
/// # Errors
///
/// `NotFound` when the board does not exist.
pub async fn delete_board(pool: &PgPool, board_id: i64) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM boards WHERE id = $1").bind(board_id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("board", board_id));
    }
    Ok(())
}

/// Board, lists, and cards grouped by list.
///
/// # Errors
///
/// `NotFound` when the board does not exist.
pub async fn full_board(pool: &PgPool, board_id: i64) -> Result<BoardFull, ServiceError> {
    let board = get_board(pool, board_id).await?;
    let lists = list::lists_by_board(pool, board_id).await?;
    let cards = card::cards_by_board(pool, board_id).await?;
    Ok(BoardFull { cards: group_cards(&lists, cards), board, lists })
}

/// Group cards under their list. Input order is preserved within each list.
#[must_use]
pub fn group_cards(lists: &[ListRow], cards: Vec<CardRow>) -> BTreeMap<i64, Vec<CardRow>> {
    let mut grouped: BTreeMap<i64, Vec<CardRow>> = lists.iter().map(|l| (l.id, Vec::new())).collect();
    for card in cards {
        grouped.entry(card.list_id).or_default().push(card);
    }
    grouped
}

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;
