//! Card service.
//!
//! Partial updates are assembled with `QueryBuilder` so only the provided
//! columns are written.

use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::ServiceError;
use crate::ordering::append_position;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CardRow {
    pub id: i64,
    pub list_id: i64,
    pub title: String,
    pub description: String,
    pub color: Option<String>,
    pub pos: i64,
    pub due_at: Option<i64>,
    pub assignee_user_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub due_at: Option<i64>,
    pub assignee_user_id: Option<i64>,
}

impl CardPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.due_at.is_none()
            && self.assignee_user_id.is_none()
    }
}

const CARD_COLUMNS: &str = "id, list_id, title, description, color, pos, due_at, assignee_user_id, created_at";

/// Cards of one list in display order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn cards_by_list(pool: &PgPool, list_id: i64) -> Result<Vec<CardRow>, ServiceError> {
    let rows = sqlx::query_as::<_, CardRow>(&format!(
        "SELECT {CARD_COLUMNS} FROM cards WHERE list_id = $1 ORDER BY pos, id"
    ))
    .bind(list_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every card on a board, ordered by list then card order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn cards_by_board(pool: &PgPool, board_id: i64) -> Result<Vec<CardRow>, ServiceError> {
    let rows = sqlx::query_as::<_, CardRow>(
        "SELECT c.id, c.list_id, c.title, c.description, c.color, c.pos, c.due_at, c.assignee_user_id, c.created_at
         FROM cards c
         JOIN lists l ON l.id = c.list_id
         WHERE l.board_id = $1
         ORDER BY l.pos, l.id, c.pos, c.id",
    )
    .bind(board_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// `NotFound` when the card does not exist.
pub async fn get_card(pool: &PgPool, card_id: i64) -> Result<CardRow, ServiceError> {
    sqlx::query_as::<_, CardRow>(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1"))
        .bind(card_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("card", card_id))
}

/// Append a card to the end of a list.
///
/// # Errors
///
/// `Invalid` for a blank title, otherwise database errors.
pub async fn create_card(pool: &PgPool, list_id: i64, title: &str, description: &str) -> Result<CardRow, ServiceError> {
    let title = super::clean_title(title)?;
    let mut tx = pool.begin().await?;
    let max: Option<i64> = sqlx::query_scalar("SELECT MAX(pos) FROM cards WHERE list_id = $1")
        .bind(list_id)
        .fetch_one(&mut *tx)
        .await?;
    let row = sqlx::query_as::<_, CardRow>(&format!(
        "INSERT INTO cards (list_id, title, description, pos) VALUES ($1, $2, $3, $4) RETURNING {CARD_COLUMNS}"
    ))
    .bind(list_id)
    .bind(title)
    .bind(description)
    .bind(append_position(max))
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(row)
}

/// Apply a partial update. An empty patch returns the card unchanged.
///
/// # Errors
///
/// `Invalid` for a blank title, `NotFound` when the card does not exist.
pub async fn update_card(pool: &PgPool, card_id: i64, patch: &CardPatch) -> Result<CardRow, ServiceError> {
    if patch.is_empty() {
        return get_card(pool, card_id).await;
    }
    let title = patch.title.as_deref().map(super::clean_title).transpose()?;
    build_update(card_id, title, patch)
        .build_query_as::<CardRow>()
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("card", card_id))
}

fn build_update<'a>(card_id: i64, title: Option<&'a str>, patch: &'a CardPatch) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE cards SET ");
    {
        let mut set = builder.separated(", ");
        if let Some(title) = title {
            set.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = patch.description.as_deref() {
            set.push("description = ").push_bind_unseparated(description);
        }
        if let Some(color) = patch.color.as_deref() {
            set.push("color = ").push_bind_unseparated(color);
        }
        if let Some(due_at) = patch.due_at {
            set.push("due_at = ").push_bind_unseparated(due_at);
        }
        if let Some(assignee) = patch.assignee_user_id {
            set.push("assignee_user_id = ").push_bind_unseparated(assignee);
        }
    }
    builder.push(" WHERE id = ").push_bind(card_id);
    builder.push(format!(" RETURNING {CARD_COLUMNS}"));
    builder
}

/// # Errors
///
/// `NotFound` when the card does not exist.
pub async fn delete_card(pool: &PgPool, card_id: i64) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM cards WHERE id = $1").bind(card_id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("card", card_id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "card_test.rs"]
mod tests;
