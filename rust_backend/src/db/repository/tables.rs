//! Table repository trait for the batch loader.
//!
//! The trait splits connection acquisition from query execution so the batch
//! loader can treat them differently: a failed [`TableRepository::connect`]
//! aborts the batch, a failed [`TableRepository::fetch_table`] only loses
//! that table.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::db::queries::TableQuery;
use crate::models::{DateRange, Table};

/// Read access to the dashboard's source tables.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; the concurrent fetch mode calls
/// `fetch_table` from several tasks at once.
#[async_trait]
pub trait TableRepository: Send + Sync {
    /// Establish (or reuse) the shared connection.
    ///
    /// Called once per batch before any query. Implementations cache the
    /// underlying handle, so repeated calls are cheap.
    async fn connect(&self) -> RepositoryResult<()>;

    /// Run one catalog query for `range` and return every row it produced.
    ///
    /// # Arguments
    /// * `query` - The catalog entry to execute
    /// * `range` - Bound to the query's start/end parameters when it is dated
    ///
    /// # Returns
    /// * `Ok(Table)` - Columns in select-list order, rows in server order
    /// * `Err(RepositoryError)` - Network, SQL, permission or decode failure
    async fn fetch_table(&self, query: &TableQuery, range: &DateRange) -> RepositoryResult<Table>;

    /// Check if the database connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;
}
