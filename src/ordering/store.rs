//! Persistence seam for the ordering engine.
//!
//! The engine only needs a handful of reads and writes against one
//! transaction per attempt. Keeping them behind a trait lets the same move
//! algorithm run against Postgres in production and an in-memory table in
//! tests.

use async_trait::async_trait;

/// Entity kinds that participate in a sibling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Board,
    List,
    Card,
}

impl ItemKind {
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Board => "boards",
            Self::List => "lists",
            Self::Card => "cards",
        }
    }

    /// Column referencing the parent scope. Boards share one global scope.
    #[must_use]
    pub fn parent_column(self) -> Option<&'static str> {
        match self {
            Self::Board => None,
            Self::List => Some("board_id"),
            Self::Card => Some("list_id"),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::List => "list",
            Self::Card => "card",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an item currently sits: its parent scope (if any) and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub parent: Option<i64>,
    pub position: i64,
}

/// Opens one transaction per move attempt.
#[async_trait]
pub trait PositionStore: Send + Sync {
    type Tx: PositionTx;

    async fn begin(&self) -> Result<Self::Tx, sqlx::Error>;
}

/// Reads and writes available inside a single move attempt.
///
/// Dropping a transaction without calling [`PositionTx::commit`] must
/// discard every write made through it.
#[async_trait]
pub trait PositionTx: Send + Sized {
    /// Current scope and position of `id`, or `None` if it does not exist.
    async fn placement(&mut self, kind: ItemKind, id: i64) -> Result<Option<Placement>, sqlx::Error>;

    /// Point `id` at a new parent scope.
    async fn reparent(&mut self, kind: ItemKind, id: i64, parent: i64) -> Result<(), sqlx::Error>;

    /// Positions of every item in `scope` except `exclude`, ascending by `(pos, id)`.
    async fn sibling_positions(
        &mut self,
        kind: ItemKind,
        scope: Option<i64>,
        exclude: i64,
    ) -> Result<Vec<i64>, sqlx::Error>;

    /// Ids of every item in `scope`, ascending by `(pos, id)`.
    async fn scope_order(&mut self, kind: ItemKind, scope: Option<i64>) -> Result<Vec<i64>, sqlx::Error>;

    async fn write_position(&mut self, kind: ItemKind, id: i64, position: i64) -> Result<(), sqlx::Error>;

    /// Bulk write of `(id, position)` pairs.
    async fn write_positions(&mut self, kind: ItemKind, positions: &[(i64, i64)]) -> Result<(), sqlx::Error>;

    async fn commit(self) -> Result<(), sqlx::Error>;
}
