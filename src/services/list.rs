//! List service.

use serde::Serialize;
use sqlx::PgPool;

use super::ServiceError;
use crate::ordering::append_position;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ListRow {
    pub id: i64,
    pub board_id: i64,
    pub title: String,
    pub color: Option<String>,
    pub pos: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ListPatch {
    pub title: Option<String>,
    pub color: Option<String>,
}

const LIST_COLUMNS: &str = "id, board_id, title, color, pos, created_at";

/// Lists of a board in display order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn lists_by_board(pool: &PgPool, board_id: i64) -> Result<Vec<ListRow>, ServiceError> {
    let rows = sqlx::query_as::<_, ListRow>(&format!(
        "SELECT {LIST_COLUMNS} FROM lists WHERE board_id = $1 ORDER BY pos, id"
    ))
    .bind(board_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Append a list to the end of a board.
///
/// # Errors
///
/// `Invalid` for a blank title, otherwise database errors.
pub async fn create_list(pool: &PgPool, board_id: i64, title: &str) -> Result<ListRow, ServiceError> {
    let title = super::clean_title(title)?;
    let mut tx = pool.begin().await?;
    let max: Option<i64> = sqlx::query_scalar("SELECT MAX(pos) FROM lists WHERE board_id = $1")
        .bind(board_id)
        .fetch_one(&mut *tx)
        .await?;
    let row = sqlx::query_as::<_, ListRow>(&format!(
        "INSERT INTO lists (board_id, title, pos) VALUES ($1, $2, $3) RETURNING {LIST_COLUMNS}"
    ))
    .bind(board_id)
    .bind(title)
    .bind(append_position(max))
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(row)
}

/// # Errors
///
/// `Invalid` for a blank title, `NotFound` when the list does not exist.
pub async fn update_list(pool: &PgPool, list_id: i64, patch: &ListPatch) -> Result<ListRow, ServiceError> {
    let title = patch.title.as_deref().map(super::clean_title).transpose()?;
    sqlx::query_as::<_, ListRow>(&format!(
        "UPDATE lists SET title = COALESCE($2, title), color = COALESCE($3, color)
         WHERE id = $1
         RETURNING {LIST_COLUMNS}"
    ))
    .bind(list_id)
    .bind(title)
    .bind(patch.color.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or(ServiceError::NotFound("list", list_id))
}

/// Delete a list and, by cascade, its cards.
///
/// # Errors
///
/// `NotFound` when the list does not exist.
pub async fn delete_list(pool: &PgPool, list_id: i64) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM lists WHERE id = $1").bind(list_id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("list", list_id));
    }
    Ok(())
}
