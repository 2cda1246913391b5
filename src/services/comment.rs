//! Card comments. Append-only; listed oldest first.

use serde::Serialize;
use sqlx::PgPool;

use super::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub card_id: i64,
    pub user_id: Option<i64>,
    pub body: String,
    pub created_at: i64,
}

const COMMENT_COLUMNS: &str = "id, card_id, user_id, body, created_at";

/// # Errors
///
/// Returns a database error if the query fails.
pub async fn comments_by_card(pool: &PgPool, card_id: i64) -> Result<Vec<CommentRow>, ServiceError> {
    let rows = sqlx::query_as::<_, CommentRow>(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments WHERE card_id = $1 ORDER BY id"
    ))
    .bind(card_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// `Invalid` for a blank body, otherwise database errors.
pub async fn add_comment(pool: &PgPool, card_id: i64, user_id: i64, body: &str) -> Result<CommentRow, ServiceError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ServiceError::Invalid("comment body cannot be empty"));
    }
    let row = sqlx::query_as::<_, CommentRow>(&format!(
        "INSERT INTO comments (card_id, user_id, body) VALUES ($1, $2, $3) RETURNING {COMMENT_COLUMNS}"
    ))
    .bind(card_id)
    .bind(user_id)
    .bind(body)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
