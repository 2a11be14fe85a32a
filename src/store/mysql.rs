//! MySQL catalog store on a pooled sqlx connection.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlPoolOptions};
use sqlx::query::{Query, QueryScalar};
use sqlx::{MySql, Transaction};
use tracing::{debug, info};

use super::{CatalogStore, StoreError, StoreResult, StoreTransaction};
use crate::config::StoreSettings;
use crate::geo::{BoundingBox, Polygon};
use crate::model::{Located, Record, Stocked};
use crate::query::{where_clause, where_params, Param, Predicate, SortOrder};

type RowQuery<'q> = Query<'q, MySql, MySqlArguments>;

fn bind_row<'q>(mut query: RowQuery<'q>, params: Vec<Param>) -> RowQuery<'q> {
    for param in params {
        query = match param {
            Param::Int(v) => query.bind(v),
            Param::Float(v) => query.bind(v),
            Param::Text(v) => query.bind(v),
        };
    }
    query
}

fn bind_scalar<'q, O>(
    mut query: QueryScalar<'q, MySql, O, MySqlArguments>,
    params: Vec<Param>,
) -> QueryScalar<'q, MySql, O, MySqlArguments> {
    for param in params {
        query = match param {
            Param::Int(v) => query.bind(v),
            Param::Float(v) => query.bind(v),
            Param::Text(v) => query.bind(v),
        };
    }
    query
}

/// ` WHERE a AND b`, or nothing for an empty filter.
fn where_sql(filter: &[Predicate]) -> String {
    if filter.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_clause(filter))
    }
}

fn decode_all<R: Record>(rows: &[sqlx::mysql::MySqlRow]) -> StoreResult<Vec<R>> {
    rows.iter()
        .map(R::decode)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)
}

/// Catalog store backed by one MySQL database.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    reset_scripts: Vec<PathBuf>,
}

impl MySqlStore {
    pub async fn connect(settings: &StoreSettings, reset_scripts: Vec<PathBuf>) -> StoreResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect(&settings.url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!(max_connections = settings.max_connections, "connected to MySQL store");

        Ok(Self {
            pool,
            reset_scripts,
        })
    }
}

#[async_trait]
impl CatalogStore for MySqlStore {
    type Tx = MySqlTransaction;

    async fn begin(&self) -> StoreResult<MySqlTransaction> {
        Ok(MySqlTransaction {
            tx: self.pool.begin().await?,
        })
    }

    async fn find_by_id<R: Record>(&self, id: i64) -> StoreResult<Option<R>> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", R::TABLE.name());
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(R::decode).transpose().map_err(StoreError::from)
    }

    async fn count<R: Record>(&self, filter: &[Predicate]) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}{}", R::TABLE.name(), where_sql(filter));
        debug!(%sql, "count");
        let query = bind_scalar(sqlx::query_scalar::<_, i64>(&sql), where_params(filter));
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn select<R: Record>(
        &self,
        filter: &[Predicate],
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<R>> {
        let sql = format!(
            "SELECT * FROM {}{} ORDER BY {} LIMIT ? OFFSET ?",
            R::TABLE.name(),
            where_sql(filter),
            order.to_sql()
        );
        debug!(%sql, "select");
        let query = bind_row(sqlx::query(&sql), where_params(filter))
            .bind(limit)
            .bind(offset);
        let rows = query.fetch_all(&self.pool).await?;
        decode_all(&rows)
    }

    async fn within_box<R: Located>(&self, bbox: &BoundingBox) -> StoreResult<Vec<R>> {
        let sql = format!(
            "SELECT * FROM {} WHERE latitude BETWEEN ? AND ? AND longitude BETWEEN ? AND ? ORDER BY {}",
            R::TABLE.name(),
            SortOrder::Popular.to_sql()
        );
        let rows = sqlx::query(&sql)
            .bind(bbox.min.latitude)
            .bind(bbox.max.latitude)
            .bind(bbox.min.longitude)
            .bind(bbox.max.longitude)
            .fetch_all(&self.pool)
            .await?;
        decode_all(&rows)
    }

    async fn find_contained<R: Located>(
        &self,
        id: i64,
        polygon: &Polygon,
    ) -> StoreResult<Option<R>> {
        let sql = format!(
            "SELECT * FROM {} WHERE id = ? AND ST_Contains(ST_PolygonFromText(?), POINT(latitude, longitude))",
            R::TABLE.name()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(polygon.to_wkt())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(R::decode).transpose().map_err(StoreError::from)
    }

    async fn reset(&self) -> StoreResult<()> {
        for path in &self.reset_scripts {
            let script = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| StoreError::Script {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            sqlx::raw_sql(&script).execute(&self.pool).await?;
            info!(script = %path.display(), "reset script applied");
        }
        Ok(())
    }
}

/// An open MySQL transaction. Rolled back by sqlx when dropped uncommitted.
pub struct MySqlTransaction {
    tx: Transaction<'static, MySql>,
}

#[async_trait]
impl StoreTransaction for MySqlTransaction {
    async fn insert<R: Record>(&mut self, record: &R) -> StoreResult<()> {
        let placeholders = vec!["?"; R::COLUMNS.len()].join(",");
        let sql = format!(
            "INSERT INTO {}({}) VALUES({})",
            R::TABLE.name(),
            R::COLUMNS.join(","),
            placeholders
        );
        let params = R::COLUMNS
            .iter()
            .filter_map(|column| record.cell(column))
            .map(Param::from)
            .collect();
        bind_row(sqlx::query(&sql), params)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete<R: Record>(&mut self, ids: &[i64]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!("DELETE FROM {} WHERE id IN ({})", R::TABLE.name(), placeholders);
        let params = ids.iter().copied().map(Param::Int).collect();
        let result = bind_row(sqlx::query(&sql), params)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_for_update<R: Record>(
        &mut self,
        id: i64,
        filter: &[Predicate],
    ) -> StoreResult<Option<R>> {
        let sql = format!(
            "SELECT * FROM {} WHERE id = ?{} FOR UPDATE",
            R::TABLE.name(),
            filter
                .iter()
                .map(|p| format!(" AND {}", p.to_sql()))
                .collect::<String>()
        );
        let mut params = vec![Param::Int(id)];
        params.extend(where_params(filter));
        let row = bind_row(sqlx::query(&sql), params)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(R::decode).transpose().map_err(StoreError::from)
    }

    async fn decrement_stock<R: Stocked>(&mut self, id: i64) -> StoreResult<()> {
        let sql = format!("UPDATE {} SET stock = stock - 1 WHERE id = ?", R::TABLE.name());
        sqlx::query(&sql).bind(id).execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
