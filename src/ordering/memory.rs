//! In-memory position store with snapshot/commit semantics.
//!
//! Each transaction works on a private copy of the table and publishes it
//! wholesale on commit, so a dropped transaction leaves nothing behind.
//! Failure switches let tests drive the error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::store::{ItemKind, Placement, PositionStore, PositionTx};

#[derive(Debug, Clone, Copy)]
struct Row {
    parent: Option<i64>,
    position: i64,
}

type Table = HashMap<(ItemKind, i64), Row>;

#[derive(Default)]
struct Shared {
    rows: Mutex<Table>,
    commits: AtomicUsize,
    bulk_writes: AtomicUsize,
    fail_position_write: AtomicBool,
    ignore_bulk_writes: AtomicBool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, kind: ItemKind, id: i64, parent: Option<i64>, position: i64) {
        self.table().insert((kind, id), Row { parent, position });
    }

    /// Ids in `scope`, sorted the way readers see them.
    pub fn order(&self, kind: ItemKind, scope: Option<i64>) -> Vec<i64> {
        sorted_scope(&self.table(), kind, scope)
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    pub fn positions(&self, kind: ItemKind, scope: Option<i64>) -> Vec<i64> {
        sorted_scope(&self.table(), kind, scope)
            .into_iter()
            .map(|(_, pos)| pos)
            .collect()
    }

    pub fn placement(&self, kind: ItemKind, id: i64) -> Option<Placement> {
        self.table()
            .get(&(kind, id))
            .map(|row| Placement { parent: row.parent, position: row.position })
    }

    pub fn commits(&self) -> usize {
        self.shared.commits.load(Ordering::SeqCst)
    }

    pub fn bulk_writes(&self) -> usize {
        self.shared.bulk_writes.load(Ordering::SeqCst)
    }

    /// Make the next single-row position write fail.
    pub fn fail_next_position_write(&self) {
        self.shared.fail_position_write.store(true, Ordering::SeqCst);
    }

    /// Accept bulk writes without applying them (a renumber that frees no room).
    pub fn ignore_bulk_writes(&self) {
        self.shared.ignore_bulk_writes.store(true, Ordering::SeqCst);
    }

    fn table(&self) -> std::sync::MutexGuard<'_, Table> {
        self.shared.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sorted_scope(table: &Table, kind: ItemKind, scope: Option<i64>) -> Vec<(i64, i64)> {
    let mut items: Vec<(i64, i64)> = table
        .iter()
        .filter(|((k, _), row)| *k == kind && row.parent == scope)
        .map(|((_, id), row)| (*id, row.position))
        .collect();
    items.sort_by_key(|&(id, pos)| (pos, id));
    items
}

pub struct MemoryTx {
    shared: Arc<Shared>,
    rows: Table,
}

#[async_trait]
impl PositionStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, sqlx::Error> {
        let rows = self.table().clone();
        Ok(MemoryTx { shared: Arc::clone(&self.shared), rows })
    }
}

#[async_trait]
impl PositionTx for MemoryTx {
    async fn placement(&mut self, kind: ItemKind, id: i64) -> Result<Option<Placement>, sqlx::Error> {
        Ok(self
            .rows
            .get(&(kind, id))
            .map(|row| Placement { parent: row.parent, position: row.position }))
    }

    async fn reparent(&mut self, kind: ItemKind, id: i64, parent: i64) -> Result<(), sqlx::Error> {
        let row = self.rows.get_mut(&(kind, id)).ok_or(sqlx::Error::RowNotFound)?;
        row.parent = Some(parent);
        Ok(())
    }

    async fn sibling_positions(
        &mut self,
        kind: ItemKind,
        scope: Option<i64>,
        exclude: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        Ok(sorted_scope(&self.rows, kind, scope)
            .into_iter()
            .filter(|&(id, _)| id != exclude)
            .map(|(_, pos)| pos)
            .collect())
    }

    async fn scope_order(&mut self, kind: ItemKind, scope: Option<i64>) -> Result<Vec<i64>, sqlx::Error> {
        Ok(sorted_scope(&self.rows, kind, scope)
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    async fn write_position(&mut self, kind: ItemKind, id: i64, position: i64) -> Result<(), sqlx::Error> {
        if self.shared.fail_position_write.swap(false, Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("injected write failure".into()));
        }
        let row = self.rows.get_mut(&(kind, id)).ok_or(sqlx::Error::RowNotFound)?;
        row.position = position;
        Ok(())
    }

    async fn write_positions(&mut self, kind: ItemKind, positions: &[(i64, i64)]) -> Result<(), sqlx::Error> {
        self.shared.bulk_writes.fetch_add(1, Ordering::SeqCst);
        if self.shared.ignore_bulk_writes.load(Ordering::SeqCst) {
            return Ok(());
        }
        for &(id, position) in positions {
            if let Some(row) = self.rows.get_mut(&(kind, id)) {
                row.position = position;
            }
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        *self.shared.rows.lock().unwrap_or_else(PoisonError::into_inner) = self.rows;
        self.shared.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
