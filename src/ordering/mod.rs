//! Sibling ordering for boards, lists, and cards.
//!
//! ARCHITECTURE
//! ============
//! - `allocator`: pure position math over sorted neighbor positions.
//! - `renumber`: order-preserving rewrite of a whole scope.
//! - `store`: the transactional seam the engine talks to.
//! - `postgres`: the production store.
//! - `engine`: the move state machine shared by all three entity kinds.

pub mod allocator;
pub mod engine;
#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod renumber;
pub mod store;

pub use allocator::append_position;
pub use engine::{MoveError, MoveOutcome, OrderingEngine};
pub use postgres::PgPositionStore;
pub use store::ItemKind;
