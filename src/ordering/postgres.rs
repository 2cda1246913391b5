//! Postgres implementation of the ordering store.
//!
//! Table and column names come from [`ItemKind`] and are static strings, so
//! formatting them into SQL is safe; every value is bound.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::store::{ItemKind, Placement, PositionStore, PositionTx};

#[derive(Debug, Clone)]
pub struct PgPositionStore {
    pool: PgPool,
}

impl PgPositionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub struct PgPositionTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PositionStore for PgPositionStore {
    type Tx = PgPositionTx;

    async fn begin(&self) -> Result<PgPositionTx, sqlx::Error> {
        Ok(PgPositionTx { tx: self.pool.begin().await? })
    }
}

#[async_trait]
impl PositionTx for PgPositionTx {
    async fn placement(&mut self, kind: ItemKind, id: i64) -> Result<Option<Placement>, sqlx::Error> {
        let sql = match kind.parent_column() {
            Some(parent) => format!("SELECT {parent}, pos FROM {} WHERE id = $1", kind.table()),
            None => format!("SELECT NULL::BIGINT, pos FROM {} WHERE id = $1", kind.table()),
        };
        let row = sqlx::query_as::<_, (Option<i64>, i64)>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(|(parent, position)| Placement { parent, position }))
    }

    async fn reparent(&mut self, kind: ItemKind, id: i64, parent: i64) -> Result<(), sqlx::Error> {
        let Some(column) = kind.parent_column() else {
            return Ok(());
        };
        let sql = format!("UPDATE {} SET {column} = $1 WHERE id = $2", kind.table());
        let result = sqlx::query(&sql)
            .bind(parent)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn sibling_positions(
        &mut self,
        kind: ItemKind,
        scope: Option<i64>,
        exclude: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        let (filter, scope_value) = scope_filter(kind, scope, 2);
        let sql = format!(
            "SELECT pos FROM {} WHERE id <> $1{filter} ORDER BY pos, id",
            kind.table()
        );
        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(exclude);
        if let Some(value) = scope_value {
            query = query.bind(value);
        }
        query.fetch_all(&mut *self.tx).await
    }

    async fn scope_order(&mut self, kind: ItemKind, scope: Option<i64>) -> Result<Vec<i64>, sqlx::Error> {
        let (filter, scope_value) = scope_filter(kind, scope, 1);
        let sql = format!("SELECT id FROM {} WHERE TRUE{filter} ORDER BY pos, id", kind.table());
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(value) = scope_value {
            query = query.bind(value);
        }
        query.fetch_all(&mut *self.tx).await
    }

    async fn write_position(&mut self, kind: ItemKind, id: i64, position: i64) -> Result<(), sqlx::Error> {
        let sql = format!("UPDATE {} SET pos = $1 WHERE id = $2", kind.table());
        sqlx::query(&sql)
            .bind(position)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn write_positions(&mut self, kind: ItemKind, positions: &[(i64, i64)]) -> Result<(), sqlx::Error> {
        let (ids, values): (Vec<i64>, Vec<i64>) = positions.iter().copied().unzip();
        let sql = format!(
            "UPDATE {} AS t SET pos = v.pos \
             FROM UNNEST($1::BIGINT[], $2::BIGINT[]) AS v(id, pos) \
             WHERE t.id = v.id",
            kind.table()
        );
        sqlx::query(&sql)
            .bind(ids)
            .bind(values)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

/// `AND parent = $n` for parented kinds, nothing for the global board scope.
fn scope_filter(kind: ItemKind, scope: Option<i64>, placeholder: usize) -> (String, Option<i64>) {
    match (kind.parent_column(), scope) {
        (Some(column), Some(value)) => (format!(" AND {column} = ${placeholder}"), Some(value)),
        (Some(column), None) => (format!(" AND {column} IS NULL"), None),
        (None, _) => (String::new(), None),
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
