//! Position allocator: sparse integer keys for sibling ordering.
//!
//! DESIGN
//! ======
//! Siblings sort by `(pos, id)`. Positions are spaced `POSITION_STEP` apart
//! so most inserts land in an existing gap and touch a single row. When two
//! neighbors are adjacent integers there is nothing between them and the
//! caller must renumber the scope before retrying.

/// Spacing between freshly assigned positions.
pub const POSITION_STEP: i64 = 1000;

/// Distance stepped back from the current head when inserting at index 0.
pub const HEAD_STEP: i64 = 500;

/// Lowest position the allocator ever hands out.
pub const MIN_POSITION: i64 = 1;

/// Result of asking for a slot between two neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// A position that sorts strictly between the requested neighbors.
    Position(i64),
    /// No integer fits; the scope must be renumbered first.
    NeedsRenumber,
}

/// Compute a position for an item inserted at `target_index` among
/// `neighbors` (sibling positions, ascending, moving item excluded).
///
/// `target_index` past the end is treated as an append.
#[must_use]
pub fn allocate(neighbors: &[i64], target_index: usize) -> Allocation {
    let index = target_index.min(neighbors.len());
    let before = index.checked_sub(1).map(|i| neighbors[i]);
    let after = neighbors.get(index).copied();

    match (before, after) {
        (None, None) => Allocation::Position(POSITION_STEP),
        (Some(before), None) => before
            .checked_add(POSITION_STEP)
            .map_or(Allocation::NeedsRenumber, Allocation::Position),
        (None, Some(after)) => {
            let pos = after.saturating_sub(HEAD_STEP).max(MIN_POSITION);
            // Head already sits at the floor: a duplicate would tie and
            // fall back to id order, which may put us second.
            if pos < after { Allocation::Position(pos) } else { Allocation::NeedsRenumber }
        }
        (Some(before), Some(after)) => {
            let gap = after.saturating_sub(before);
            if gap <= 1 {
                Allocation::NeedsRenumber
            } else {
                Allocation::Position(before + gap / 2)
            }
        }
    }
}

/// Clamp a client-supplied index into `[0, len]`.
#[must_use]
pub fn clamp_index(requested: i64, len: usize) -> usize {
    usize::try_from(requested.max(0)).map_or(len, |index| index.min(len))
}

/// Default position for a newly created item: one step past the current tail.
#[must_use]
pub fn append_position(max_existing: Option<i64>) -> i64 {
    max_existing.map_or(POSITION_STEP, |max| max.saturating_add(POSITION_STEP))
}

/// Canonical evenly spaced positions for `ids` in their current order.
#[must_use]
pub fn canonical_positions(ids: &[i64]) -> Vec<(i64, i64)> {
    ids.iter()
        .zip((1_i64..).map(|n| n * POSITION_STEP))
        .map(|(&id, pos)| (id, pos))
        .collect()
}

#[cfg(test)]
#[path = "allocator_test.rs"]
mod tests;
