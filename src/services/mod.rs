//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own persistence concerns for boards, lists, cards, and
//! comments so route handlers can stay focused on protocol translation, auth
//! plumbing, and publishing change events. Reordering lives in
//! [`crate::ordering`]; services only assign the initial tail position.

pub mod access;
pub mod board;
pub mod card;
pub mod comment;
pub mod list;
pub mod session;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found: {1}")]
    NotFound(&'static str, i64),
    #[error("access denied to board {0}")]
    Forbidden(i64),
    #[error("invalid input: {0}")]
    Invalid(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Trimmed, non-empty title.
///
/// # Errors
///
/// Returns [`ServiceError::Invalid`] when the title is blank.
pub fn clean_title(raw: &str) -> Result<&str, ServiceError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ServiceError::Invalid("title cannot be empty"));
    }
    Ok(title)
}
