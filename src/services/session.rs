//! Session validation.
//!
//! Sessions are issued elsewhere; this service only resolves a bearer or
//! cookie token to the user it belongs to.

use sqlx::{PgPool, Row};

use crate::db::now_ms;

/// User row returned from session validation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// Validate a session token and return the associated user.
///
/// Expired and unknown tokens both yield `Ok(None)`.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT u.id, u.email, u.name
          FROM sessions s
          JOIN users u ON u.id = s.user_id
          WHERE s.token = $1 AND s.expires_at > $2",
    )
    .bind(token)
    .bind(now_ms())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| SessionUser { id: r.get("id"), email: r.get("email"), name: r.get("name") }))
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
