//! SQL Server repository.

use async_trait::async_trait;
use log::debug;
use tiberius::Query;

use super::pool::SqlServerConnector;
use super::rows::append_rows;
use crate::db::config::DbConfig;
use crate::db::pool::ConnectionProvider;
use crate::db::queries::TableQuery;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, TableRepository};
use crate::models::{DateRange, Table};

/// Reads the dashboard tables from SQL Server through a shared pool.
pub struct SqlServerRepository {
    provider: ConnectionProvider<SqlServerConnector>,
}

impl SqlServerRepository {
    /// Create a repository; no connection is opened until first use.
    pub fn new(config: DbConfig) -> Self {
        let settings = config.pool.clone();
        Self {
            provider: ConnectionProvider::new(SqlServerConnector::new(config), settings),
        }
    }

    pub fn provider(&self) -> &ConnectionProvider<SqlServerConnector> {
        &self.provider
    }
}

#[async_trait]
impl TableRepository for SqlServerRepository {
    async fn connect(&self) -> RepositoryResult<()> {
        self.provider.get_connection().await.map(|_| ())
    }

    async fn fetch_table(&self, query: &TableQuery, range: &DateRange) -> RepositoryResult<Table> {
        let context = || ErrorContext::new("fetch_table").with_entity(query.name.as_str());

        let pool = self.provider.get_connection().await?;
        let mut conn = pool
            .get()
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("fetch_table"))?;

        let mut sql = Query::new(query.sql);
        if query.dated {
            sql.bind(range.start);
            sql.bind(range.end);
        }

        let mut stream = sql.query(&mut *conn).await.map_err(|e| {
            RepositoryError::query_with_context(e.to_string(), context())
        })?;

        // Read column metadata first so an empty result keeps its columns.
        let columns: Vec<String> = stream
            .columns()
            .await
            .map_err(|e| RepositoryError::query_with_context(e.to_string(), context()))?
            .map(|cols| cols.iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows = stream
            .into_first_result()
            .await
            .map_err(|e| RepositoryError::query_with_context(e.to_string(), context()))?;

        debug!(
            "Query for '{}' returned {} rows over {} columns",
            query.name,
            rows.len(),
            columns.len()
        );

        let mut table = Table::new(columns);
        append_rows(&mut table, rows)
            .map_err(|e| e.with_operation("fetch_table").with_entity(query.name.as_str()))?;
        Ok(table)
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        let pool = self.provider.get_connection().await?;
        let mut conn = pool
            .get()
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("health_check"))?;

        let row = Query::new("SELECT 1 as test")
            .query(&mut *conn)
            .await
            .map_err(|e| RepositoryError::query(format!("Health check query failed: {}", e)))?
            .into_row()
            .await
            .map_err(|e| RepositoryError::query(format!("Health check query failed: {}", e)))?;

        Ok(row.and_then(|r| r.get::<i32, _>(0)) == Some(1))
    }
}
