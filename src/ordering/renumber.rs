//! Scope renumbering.
//!
//! Rewrites every position in a scope to `1000, 2000, 3000, ...` while
//! keeping the current `(pos, id)` order. Runs inside the caller's
//! transaction; nothing is visible until that transaction commits.

use super::allocator::canonical_positions;
use super::store::{ItemKind, PositionTx};

/// Renumber `scope` in place. Returns how many rows were rewritten.
///
/// # Errors
///
/// Propagates any store error; the caller's transaction is then dropped
/// and the scope keeps its previous positions.
pub async fn renumber<T: PositionTx>(tx: &mut T, kind: ItemKind, scope: Option<i64>) -> Result<usize, sqlx::Error> {
    let ids = tx.scope_order(kind, scope).await?;
    if ids.is_empty() {
        return Ok(0);
    }
    let positions = canonical_positions(&ids);
    tx.write_positions(kind, &positions).await?;
    Ok(positions.len())
}
