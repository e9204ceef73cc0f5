//! In-memory local repository implementation.
//!
//! This module provides a local implementation of [`TableRepository`]
//! suitable for unit testing and local development. Tables are plain
//! fixtures held in memory; dated fixtures are filtered the way the SQL
//! queries filter them, so range behaviour can be exercised without a server.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::db::queries::TableQuery;
use crate::db::repository::*;
use crate::models::{DateRange, Table, TableName, Value};

/// How a fixture is narrowed to a date range.
#[derive(Debug, Clone)]
enum RowFilter {
    /// Keep rows whose `column` timestamp lies in the range.
    CreatedWithin { column: String },
    /// Keep rows whose `column` matches `parent_column` of an in-range row of
    /// the `parent` fixture.
    LinkedTo {
        column: String,
        parent: TableName,
        parent_column: String,
    },
}

#[derive(Debug, Clone)]
struct Fixture {
    table: Table,
    filter: Option<RowFilter>,
}

/// In-memory local repository.
///
/// # Example
/// ```
/// use trsm_data::db::repositories::LocalRepository;
/// use trsm_data::models::{Table, TableName};
///
/// let repo = LocalRepository::new();
/// repo.set_table(
///     TableName::Regions,
///     Table::new(["RegionId", "RegionName"])
///         .with_row(vec![1.into(), "North".into()])
///         .unwrap(),
/// );
/// repo.fail_table(TableName::Packs, "Invalid object name 'dbo.Packs'");
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    connects: Arc<AtomicUsize>,
    queries: Arc<AtomicUsize>,
}

struct LocalData {
    fixtures: HashMap<TableName, Fixture>,
    failing: HashMap<TableName, String>,
    /// Tables whose query has run at least once.
    queried: HashSet<TableName>,
    // Connection health
    is_reachable: bool,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            fixtures: HashMap::new(),
            failing: HashMap::new(),
            queried: HashSet::new(),
            is_reachable: true,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, LocalData> {
        // fixture state stays consistent even if a writer panicked
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, LocalData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }

    fn insert(&self, name: TableName, table: Table, filter: Option<RowFilter>) {
        self.write().fixtures.insert(name, Fixture { table, filter });
    }

    /// Register a fixture returned as-is for every range.
    pub fn set_table(&self, name: TableName, table: Table) {
        self.insert(name, table, None);
    }

    /// Register a fixture filtered on the timestamp in `column`.
    pub fn set_dated_table(&self, name: TableName, table: Table, column: impl Into<String>) {
        let filter = RowFilter::CreatedWithin {
            column: column.into(),
        };
        self.insert(name, table, Some(filter));
    }

    /// Register a fixture joined to the in-range rows of `parent`
    /// (`column = parent.parent_column`).
    pub fn set_linked_table(
        &self,
        name: TableName,
        table: Table,
        column: impl Into<String>,
        parent: TableName,
        parent_column: impl Into<String>,
    ) {
        let filter = RowFilter::LinkedTo {
            column: column.into(),
            parent,
            parent_column: parent_column.into(),
        };
        self.insert(name, table, Some(filter));
    }

    /// Make every query for `name` fail with `reason`.
    pub fn fail_table(&self, name: TableName, reason: impl Into<String>) {
        self.write().failing.insert(name, reason.into());
    }

    pub fn clear_failure(&self, name: TableName) {
        self.write().failing.remove(&name);
    }

    /// Simulate the server being unreachable for new connections.
    pub fn set_reachable(&self, reachable: bool) {
        self.write().is_reachable = reachable;
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.write().is_healthy = healthy;
    }

    /// Number of `connect` calls so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Number of `fetch_table` calls so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Check if the query for `name` has run.
    pub fn was_queried(&self, name: TableName) -> bool {
        self.read().queried.contains(&name)
    }

    /// Clear fixtures, failures and counters.
    pub fn clear(&self) {
        *self.write() = LocalData::default();
        self.connects.store(0, Ordering::SeqCst);
        self.queries.store(0, Ordering::SeqCst);
    }

    /// Helper to check reachability and return error if down.
    fn check_reachable(&self, data: &LocalData) -> RepositoryResult<()> {
        if !data.is_reachable {
            return Err(RepositoryError::connection_with_context(
                "Database is not reachable",
                ErrorContext::new("get_connection").with_entity("local"),
            ));
        }
        Ok(())
    }

    fn select(data: &LocalData, name: TableName, range: &DateRange) -> RepositoryResult<Option<Table>> {
        let Some(fixture) = data.fixtures.get(&name) else {
            return Ok(None);
        };
        let mut table = fixture.table.clone();

        match &fixture.filter {
            None => {}
            Some(RowFilter::CreatedWithin { column }) => {
                let idx = column_index(&table, name, column)?;
                table.retain_rows(|row| {
                    row[idx]
                        .as_datetime()
                        .map(|ts| range.contains_datetime(ts))
                        .unwrap_or(false)
                });
            }
            Some(RowFilter::LinkedTo {
                column,
                parent,
                parent_column,
            }) => {
                let idx = column_index(&table, name, column)?;
                let keys: Vec<Value> = match Self::select(data, *parent, range)? {
                    Some(parent_table) => {
                        let parent_idx = column_index(&parent_table, *parent, parent_column)?;
                        parent_table
                            .rows()
                            .iter()
                            .map(|row| row[parent_idx].clone())
                            .filter(|v| !v.is_null())
                            .collect()
                    }
                    None => Vec::new(),
                };
                table.retain_rows(|row| keys.contains(&row[idx]));
            }
        }
        Ok(Some(table))
    }
}

fn column_index(table: &Table, name: TableName, column: &str) -> RepositoryResult<usize> {
    table.column_index(column).ok_or_else(|| {
        RepositoryError::query_with_context(
            format!("Invalid column name '{}'", column),
            ErrorContext::new("fetch_table").with_entity(name.as_str()),
        )
    })
}

#[async_trait]
impl TableRepository for LocalRepository {
    async fn connect(&self) -> RepositoryResult<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let data = self.read();
        self.check_reachable(&data)
    }

    async fn fetch_table(&self, query: &TableQuery, range: &DateRange) -> RepositoryResult<Table> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let mut data = self.write();
        data.queried.insert(query.name);
        self.check_reachable(&data)?;

        if let Some(reason) = data.failing.get(&query.name) {
            return Err(RepositoryError::query_with_context(
                reason.clone(),
                ErrorContext::new("fetch_table").with_entity(query.name.as_str()),
            ));
        }

        // An unregistered table behaves like an empty one: columns, no rows.
        Ok(Self::select(&data, query.name, range)?
            .unwrap_or_else(|| Table::new(query.columns.iter().copied())))
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.read();
        Ok(data.is_reachable && data.is_healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::query_for;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
        )
        .unwrap()
    }

    fn ts(d: u32, h: u32) -> Value {
        NaiveDate::from_ymd_opt(2023, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
            .into()
    }

    fn order_lines() -> Table {
        let mut table = Table::new(["OrderLineId", "CreatedAt"]);
        table.push_row(vec![10.into(), ts(5, 9)]).unwrap();
        table.push_row(vec![11.into(), ts(31, 12)]).unwrap();
        table.push_row(vec![12.into(), Value::Null]).unwrap();
        table
    }

    #[tokio::test]
    async fn test_unregistered_table_keeps_catalog_columns() {
        let repo = LocalRepository::new();
        let table = repo
            .fetch_table(query_for(TableName::Shippers), &range())
            .await
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), &["ShipperId".to_string(), "Carrier".to_string()]);
    }

    #[tokio::test]
    async fn test_dated_fixture_is_filtered() {
        let repo = LocalRepository::new();
        repo.set_dated_table(TableName::OrderLines, order_lines(), "CreatedAt");

        let table = repo
            .fetch_table(query_for(TableName::OrderLines), &range())
            .await
            .unwrap();
        // 31st at noon is past the end-date midnight; NULL never matches
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_linked_fixture_follows_parent_range() {
        let repo = LocalRepository::new();
        repo.set_dated_table(TableName::OrderLines, order_lines(), "CreatedAt");
        let mut packs = Table::new(["PickedForOrderLine", "WeightLb"]);
        packs.push_row(vec![10.into(), 2.5.into()]).unwrap();
        packs.push_row(vec![11.into(), 1.0.into()]).unwrap();
        repo.set_linked_table(
            TableName::Packs,
            packs,
            "PickedForOrderLine",
            TableName::OrderLines,
            "OrderLineId",
        );

        let table = repo.fetch_table(query_for(TableName::Packs), &range()).await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0][0], Value::Int(10));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let repo = LocalRepository::new();
        repo.fail_table(TableName::Customers, "permission denied");
        let err = repo
            .fetch_table(query_for(TableName::Customers), &range())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("permission denied"));

        repo.clear_failure(TableName::Customers);
        assert!(repo
            .fetch_table(query_for(TableName::Customers), &range())
            .await
            .is_ok());
        assert_eq!(repo.query_count(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_fails_connect_and_health() {
        let repo = LocalRepository::new();
        repo.set_reachable(false);
        assert!(matches!(
            repo.connect().await,
            Err(RepositoryError::ConnectionError { .. })
        ));
        assert!(!repo.health_check().await.unwrap());
        assert_eq!(repo.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_filter_column_is_a_query_error() {
        let repo = LocalRepository::new();
        repo.set_dated_table(TableName::Orders, Table::new(["OrderId"]), "CreatedAt_order");
        let err = repo
            .fetch_table(query_for(TableName::Orders), &range())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::QueryError { .. }));
    }
}
