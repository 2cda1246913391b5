//! Live change notifications for board viewers.
//!
//! ARCHITECTURE
//! ============
//! Handlers publish an [`Event`] after a mutation commits. The [`EventBus`]
//! serializes it once and fans it out to every subscription registered for
//! the event's board. Each open stream owns one subscription and relays
//! what it receives through a [`StreamSession`].
//!
//! Events are transient: nothing is persisted or replayed. A viewer that
//! connects late, or whose buffer overflowed, reconciles by fetching the
//! full board again.

pub mod bus;
pub mod stream;

pub use bus::{EventBus, Subscription};
pub use stream::{SessionEnd, StreamSession};

use serde::Serialize;

use crate::ordering::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Board,
    List,
    Card,
    Comment,
}

impl Entity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::List => "list",
            Self::Card => "card",
            Self::Comment => "comment",
        }
    }
}

impl From<ItemKind> for Entity {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Board => Self::Board,
            ItemKind::List => Self::List,
            ItemKind::Card => Self::Card,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
    Deleted,
    Moved,
}

impl Action {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Moved => "moved",
        }
    }
}

/// One notification, scoped to the board whose viewers should see it.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// `"<entity>.<action>"`, e.g. `"card.moved"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub entity: Entity,
    pub board_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<i64>,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl Event {
    #[must_use]
    pub fn new(entity: Entity, action: Action, board_id: i64) -> Self {
        Self {
            kind: format!("{}.{}", entity.as_str(), action.as_str()),
            entity,
            board_id,
            list_id: None,
            payload: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_list_id(mut self, list_id: i64) -> Self {
        self.list_id = Some(list_id);
        self
    }

    /// Attach a payload. Values that cannot be represented as JSON are dropped.
    #[must_use]
    pub fn with_payload(mut self, payload: &impl Serialize) -> Self {
        self.payload = serde_json::to_value(payload).unwrap_or(serde_json::Value::Null);
        self
    }
}
