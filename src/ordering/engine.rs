//! Ordering engine: one move algorithm for boards, lists, and cards.
//!
//! DESIGN
//! ======
//! Each attempt is a single transaction: locate the item, reparent it if a
//! new scope was requested, read the sibling positions (item excluded),
//! allocate, and write. When the allocator finds no room the attempt
//! renumbers the scope instead, commits that, and the move runs again.
//!
//! TRADE-OFFS
//! ==========
//! Concurrent moves in one scope are not serialized here. Two writers may
//! allocate from the same snapshot; the `(pos, id)` ordering keeps the result
//! total, but one of the intended relative orders can be lost. Stronger
//! guarantees would need a per-scope version or serializable isolation.

use tracing::{debug, warn};

use super::allocator::{Allocation, allocate, clamp_index};
use super::renumber::renumber;
use super::store::{ItemKind, PositionStore, PositionTx};

/// A move may renumber once and then must place the item.
pub const MAX_ATTEMPTS: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: ItemKind, id: i64 },
    #[error("move {kind} {id} failed after renumber")]
    RenumberExhausted { kind: ItemKind, id: i64 },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub kind: ItemKind,
    pub id: i64,
    /// New parent scope. `None` keeps the current one; ignored for boards.
    pub target_parent: Option<i64>,
    /// Zero-based index in the destination, counted without the moving item.
    pub index: i64,
}

/// What a successful move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from_parent: Option<i64>,
    pub parent: Option<i64>,
    pub position: i64,
    pub renumbered: bool,
}

enum Attempt {
    Placed { parent: Option<i64>, position: i64 },
    Renumbered,
}

#[derive(Debug, Clone)]
pub struct OrderingEngine<S> {
    store: S,
}

impl<S: PositionStore> OrderingEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Move a board among all boards.
    ///
    /// # Errors
    ///
    /// See [`OrderingEngine::move_item`].
    pub async fn move_board(&self, board_id: i64, index: i64) -> Result<MoveOutcome, MoveError> {
        self.move_item(MoveRequest { kind: ItemKind::Board, id: board_id, target_parent: None, index })
            .await
    }

    /// Move a list within its board, or onto another board.
    ///
    /// # Errors
    ///
    /// See [`OrderingEngine::move_item`].
    pub async fn move_list(&self, list_id: i64, target_board: Option<i64>, index: i64) -> Result<MoveOutcome, MoveError> {
        self.move_item(MoveRequest { kind: ItemKind::List, id: list_id, target_parent: target_board, index })
            .await
    }

    /// Move a card within its list, or into another list.
    ///
    /// # Errors
    ///
    /// See [`OrderingEngine::move_item`].
    pub async fn move_card(&self, card_id: i64, target_list: Option<i64>, index: i64) -> Result<MoveOutcome, MoveError> {
        self.move_item(MoveRequest { kind: ItemKind::Card, id: card_id, target_parent: target_list, index })
            .await
    }

    /// Run a move to completion, renumbering the destination scope at most once.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the item does not exist.
    /// - `RenumberExhausted` if there is still no room after a renumber.
    /// - `Database` for any store failure; the failed attempt is rolled back.
    pub async fn move_item(&self, req: MoveRequest) -> Result<MoveOutcome, MoveError> {
        let mut from_parent = None;
        let mut renumbered = false;

        for attempt in 0..MAX_ATTEMPTS {
            let mut tx = self.store.begin().await?;
            let placement = tx
                .placement(req.kind, req.id)
                .await?
                .ok_or(MoveError::NotFound { kind: req.kind, id: req.id })?;
            if attempt == 0 {
                from_parent = placement.parent;
            }

            match place(&mut tx, &req, placement.parent).await? {
                Attempt::Placed { parent, position } => {
                    tx.commit().await?;
                    debug!(kind = %req.kind, id = req.id, from = placement.position, to = position, "moved");
                    return Ok(MoveOutcome { from_parent, parent, position, renumbered });
                }
                Attempt::Renumbered => {
                    tx.commit().await?;
                    renumbered = true;
                    debug!(kind = %req.kind, id = req.id, attempt, "scope renumbered; retrying move");
                }
            }
        }

        warn!(kind = %req.kind, id = req.id, "no room after renumber");
        Err(MoveError::RenumberExhausted { kind: req.kind, id: req.id })
    }
}

async fn place<T: PositionTx>(tx: &mut T, req: &MoveRequest, current: Option<i64>) -> Result<Attempt, MoveError> {
    let mut scope = current;
    if req.kind.parent_column().is_some() {
        if let Some(target) = req.target_parent.filter(|target| Some(*target) != current) {
            tx.reparent(req.kind, req.id, target).await?;
            scope = Some(target);
        }
    }

    let siblings = tx.sibling_positions(req.kind, scope, req.id).await?;
    let index = clamp_index(req.index, siblings.len());

    match allocate(&siblings, index) {
        Allocation::Position(position) => {
            tx.write_position(req.kind, req.id, position).await?;
            Ok(Attempt::Placed { parent: scope, position })
        }
        Allocation::NeedsRenumber => {
            renumber(tx, req.kind, scope).await?;
            Ok(Attempt::Renumbered)
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
